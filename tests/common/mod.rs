#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use jammcli::{
    config::Config,
    error::Result,
    management::{MemorySession, SessionStore, TokenStore},
    navigation::{CallbackLocation, Location, Navigator},
    spotify::{ApiClient, AuthFlow},
    types::Credential,
};
use url::Url;
use wiremock::MockServer;

pub const RETURN_URL: &str = "http://127.0.0.1:8888/callback";

/// Records every URL the flow navigates to instead of opening a browser.
#[derive(Default)]
pub struct RecordingNavigator {
    urls: Mutex<Vec<Url>>,
}

impl RecordingNavigator {
    pub fn urls(&self) -> Vec<Url> {
        self.urls.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &Url) -> Result<()> {
        self.urls.lock().unwrap().push(url.clone());
        Ok(())
    }
}

pub struct Harness {
    pub session: Arc<MemorySession>,
    pub tokens: Arc<TokenStore>,
    pub location: Arc<CallbackLocation>,
    pub navigator: Arc<RecordingNavigator>,
    pub flow: Arc<AuthFlow>,
    pub client: ApiClient,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        let session = Arc::new(MemorySession::new());
        let session_seam: Arc<dyn SessionStore> = session.clone();
        let tokens = Arc::new(TokenStore::new(session_seam));
        let location = Arc::new(CallbackLocation::new());
        let location_seam: Arc<dyn Location> = location.clone();
        let navigator = Arc::new(RecordingNavigator::default());
        let navigator_seam: Arc<dyn Navigator> = navigator.clone();

        let flow = Arc::new(
            AuthFlow::new(config, tokens.clone(), location_seam, navigator_seam).unwrap(),
        );
        let client = ApiClient::new(flow.clone());

        Self {
            session,
            tokens,
            location,
            navigator,
            flow,
            client,
        }
    }

    pub async fn with_token(self, token: &str) -> Self {
        self.tokens
            .set(Credential::new(token, 3600, "playlist-modify-private"))
            .await
            .unwrap();
        self
    }

    /// Simulates the provider sending the user back with `code` for the
    /// attempt identified by `state`.
    pub async fn with_return_redirect(self, code: &str, state: &str, verifier: &str) -> Self {
        self.tokens.store_verifier(state, verifier).await.unwrap();
        self.location.record(
            Url::parse_with_params(RETURN_URL, &[("code", code), ("state", state)]).unwrap(),
        );
        self
    }
}

pub fn config_for(api: &MockServer, accounts: &MockServer) -> Config {
    let mut config = Config::new("test-client-id");
    config.redirect_uri = RETURN_URL.to_string();
    config.api_url = api.uri();
    config.auth_url = format!("{}/authorize", accounts.uri());
    config.token_url = format!("{}/api/token", accounts.uri());
    config
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}
