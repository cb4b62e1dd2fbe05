//! # CLI Module
//!
//! The command-line layer of jammcli. Every command builds on a shared
//! [`Context`] that wires the session store, the token store, the
//! authorization flow and the API client together.
//!
//! ## Commands
//!
//! - [`auth`] - Resolves a credential, running the browser authorization when needed
//! - [`logout`] - Drops the credential and any pending authorization
//! - [`search`] - Searches the catalog and prints a table of tracks
//! - [`playlist`] - Assembles tracks into a draft and saves it as a private playlist
//!
//! ## Authorization
//!
//! Commands that need a token call [`authorize`] first. When the flow hands
//! control to the browser, the local callback server is started and the
//! command waits until the return redirect has been exchanged for a token.
//! An operation that ends in a fresh redirect (a rejected token after the
//! single retry) is authorized again and retried once.
//!
//! ## Usage Patterns
//!
//! ```bash
//! jammcli auth
//! jammcli search "daft punk"
//! jammcli playlist --name "Robots" --search "daft punk" --take 5
//! jammcli playlist --name "Two" --track spotify:track:abc --track spotify:track:def
//! jammcli logout
//! ```

mod auth;
mod playlist;
mod search;

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    api::CallbackState,
    config::Config,
    error::{Error, Result},
    management::{FileSession, SessionStore, TokenStore},
    navigation::{BrowserNavigator, CallbackLocation, Location, Navigator},
    server::start_api_server,
    spotify::{ApiClient, AuthFlow, AuthState},
    types::Credential,
    warning,
};

pub use auth::auth;
pub use auth::logout;
pub use playlist::playlist;
pub use search::search;

/// How long to wait for the browser to come back with a code.
const AUTH_TIMEOUT: Duration = Duration::from_secs(120);

pub struct Context {
    pub config: Config,
    pub location: Arc<CallbackLocation>,
    pub flow: Arc<AuthFlow>,
    pub client: ApiClient,
}

impl Context {
    pub async fn new(config: Config) -> Result<Self> {
        let session: Arc<dyn SessionStore> = Arc::new(FileSession::new());
        let tokens = Arc::new(TokenStore::init(session).await);
        let location = Arc::new(CallbackLocation::new());
        let location_seam: Arc<dyn Location> = location.clone();
        let navigator: Arc<dyn Navigator> = Arc::new(BrowserNavigator);

        let flow = Arc::new(AuthFlow::new(
            config.clone(),
            tokens,
            location_seam,
            navigator,
        )?);
        let client = ApiClient::new(Arc::clone(&flow));

        Ok(Self {
            config,
            location,
            flow,
            client,
        })
    }
}

/// Resolves a credential, running the browser authorization if needed.
///
/// The callback server is started before the flow may redirect, so the return
/// redirect always has somewhere to land. It is shut down once a credential
/// exists or the wait gives up.
pub async fn authorize(ctx: &Context) -> Result<Credential> {
    let state = Arc::new(CallbackState {
        flow: Arc::clone(&ctx.flow),
        location: Arc::clone(&ctx.location),
    });
    let server_addr = ctx.config.server_addr.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = start_api_server(state, &server_addr).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    let outcome = match ctx.flow.resolve_token().await {
        Err(Error::RedirectIssued) => wait_for_token(&ctx.flow).await,
        other => other,
    };

    server.abort();
    outcome
}

/// Polls the token store until the callback has produced a credential.
///
/// Gives up after [`AUTH_TIMEOUT`], or as soon as the flow falls back to
/// `NoToken` (consent denied at the callback).
async fn wait_for_token(flow: &AuthFlow) -> Result<Credential> {
    let pb = spinner("Waiting for Spotify authorization in the browser...");
    let start = tokio::time::Instant::now();

    let outcome = loop {
        if let Some(credential) = flow.tokens().get().await {
            break Ok(credential);
        }
        if flow.state().await == AuthState::NoToken {
            break Err(Error::AuthorizationDenied {
                reason: "authorization was not completed".to_string(),
                description: None,
            });
        }
        if start.elapsed() >= AUTH_TIMEOUT {
            break Err(Error::AuthorizationDenied {
                reason: "timed out waiting for the authorization callback".to_string(),
                description: None,
            });
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    };

    pb.finish_and_clear();
    outcome
}

pub(crate) fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
