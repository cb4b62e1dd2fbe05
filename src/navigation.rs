//! Seams between the authorization flow and the user agent.
//!
//! [`Location`] reads (and rewrites) the return-redirect URL the authorization
//! endpoint sent the user back to. [`Navigator`] hands control to the external
//! authorization step. In the CLI the location is filled in by the local
//! callback server and navigation opens the system browser.

use std::sync::{Mutex, PoisonError};

use url::Url;

use crate::{error::Result, warning};

pub trait Location: Send + Sync {
    /// The URL the user agent currently sits on, if any.
    fn current(&self) -> Option<Url>;

    /// Replaces the current URL without navigating.
    fn replace(&self, url: Url);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &Url) -> Result<()>;
}

/// The most recent return redirect captured by the callback server.
#[derive(Default)]
pub struct CallbackLocation {
    url: Mutex<Option<Url>>,
}

impl CallbackLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, url: Url) {
        *self.url.lock().unwrap_or_else(PoisonError::into_inner) = Some(url);
    }
}

impl Location for CallbackLocation {
    fn current(&self) -> Option<Url> {
        self.url
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, url: Url) {
        self.record(url);
    }
}

/// Opens the authorization URL in the default browser.
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &Url) -> Result<()> {
        if webbrowser::open(url.as_str()).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                url
            );
        }
        Ok(())
    }
}
