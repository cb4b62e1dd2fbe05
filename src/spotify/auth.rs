use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Mutex;
use url::Url;

use crate::{
    config::{CLIENT_ID_VAR, Config},
    error::{Error, Result},
    info,
    management::TokenStore,
    navigation::{Location, Navigator},
    types::{Credential, TokenErrorResponse, TokenResponse},
    utils, warning,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    NoToken,
    AwaitingRedirect,
    ExchangingCode,
    Authorized,
}

/// Orchestrates the OAuth 2.0 PKCE authorization flow with Spotify.
///
/// [`AuthFlow::resolve_token`] walks the following steps and stops at the
/// first one that produces an outcome:
///
/// 1. **Cached credential**: a usable credential in the [`TokenStore`] is
///    returned as is. No network, no redirect.
/// 2. **Return redirect**: if the current [`Location`] carries an `error`
///    parameter the flow fails with [`Error::AuthorizationDenied`]. If it
///    carries a `code`, the verifier stored under the echoed `state` is taken
///    (one-shot) and exchanged at the token endpoint. The response parameters
///    are stripped from the location afterwards so the code is never replayed.
/// 3. **Redirect**: if an earlier redirect is still outstanding the call
///    yields [`Error::RedirectIssued`] right away. Otherwise a fresh verifier,
///    challenge and `state` are generated, the verifier is persisted and the
///    [`Navigator`] is sent to the authorization endpoint. This is a terminal transition and yields
///    [`Error::RedirectIssued`]; the follow-up happens through a new call once
///    the return redirect has been recorded.
///
/// A code without a matching verifier, or a failed exchange, is never retried
/// silently: the discarded state is reported through `warning!` and the flow
/// restarts at step 3.
///
/// Calls are single-flight: concurrent callers queue behind one another, so
/// only one of them can start a redirect or consume a code. While a redirect
/// is outstanding (state `AwaitingRedirect` with its verifier still pending),
/// further callers get [`Error::RedirectIssued`] without navigating again.
pub struct AuthFlow {
    config: Config,
    http: Client,
    tokens: Arc<TokenStore>,
    location: Arc<dyn Location>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<AuthState>,
    single_flight: Mutex<()>,
}

impl AuthFlow {
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMissing`] when no client ID is configured.
    pub fn new(
        config: Config,
        tokens: Arc<TokenStore>,
        location: Arc<dyn Location>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        if config.client_id.trim().is_empty() {
            return Err(Error::ConfigurationMissing(CLIENT_ID_VAR));
        }

        Ok(Self {
            config,
            http: Client::new(),
            tokens,
            location,
            navigator,
            state: Mutex::new(AuthState::NoToken),
            single_flight: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub async fn state(&self) -> AuthState {
        *self.state.lock().await
    }

    async fn transition(&self, next: AuthState) {
        *self.state.lock().await = next;
    }

    pub async fn resolve_token(&self) -> Result<Credential> {
        let _flight = self.single_flight.lock().await;

        if let Some(credential) = self.tokens.get().await {
            self.transition(AuthState::Authorized).await;
            return Ok(credential);
        }

        if let Some(url) = self.location.current() {
            if let Some(reason) = utils::query_param(&url, "error") {
                let description = utils::query_param(&url, "error_description");
                self.location.replace(utils::strip_auth_params(&url));
                self.transition(AuthState::NoToken).await;
                warning!(
                    "Spotify authorization was denied: {} ({})",
                    reason,
                    description.as_deref().unwrap_or("no description")
                );
                return Err(Error::AuthorizationDenied {
                    reason,
                    description,
                });
            }

            if let Some(code) = utils::query_param(&url, "code") {
                self.transition(AuthState::ExchangingCode).await;
                let state = utils::query_param(&url, "state");
                let outcome = self.exchange(&code, state.as_deref()).await;
                self.location.replace(utils::strip_auth_params(&url));

                match outcome {
                    Ok(credential) => {
                        self.transition(AuthState::Authorized).await;
                        return Ok(credential);
                    }
                    Err(e) => {
                        self.transition(AuthState::NoToken).await;
                        warning!(
                            "Discarding authorization response (state: {}): {}. Restarting authorization.",
                            state.as_deref().unwrap_or("<none>"),
                            e
                        );
                    }
                }
            }
        }

        if self.state().await == AuthState::AwaitingRedirect
            && self.tokens.pending_count().await > 0
        {
            return Err(Error::RedirectIssued);
        }

        self.begin_authorization().await
    }

    async fn exchange(&self, code: &str, state: Option<&str>) -> Result<Credential> {
        let verifier = match state {
            Some(state) => self.tokens.take_verifier(state).await,
            None => None,
        };
        let Some(verifier) = verifier else {
            return Err(Error::MissingVerifier);
        };

        match exchange_code_pkce(&self.http, &self.config, code, &verifier).await {
            Ok(credential) => {
                self.tokens.set(credential.clone()).await?;
                self.tokens.clear_verifiers().await;
                Ok(credential)
            }
            Err(e) => {
                self.tokens.clear_verifiers().await;
                Err(e)
            }
        }
    }

    async fn begin_authorization(&self) -> Result<Credential> {
        let verifier = utils::generate_code_verifier();
        let challenge = utils::generate_code_challenge(&verifier);
        let state = utils::generate_state();

        self.tokens.store_verifier(&state, &verifier).await?;
        let url = self.authorize_url(&challenge, &state)?;

        info!("Redirecting to Spotify for authorization...");
        self.navigator.navigate(&url)?;
        self.transition(AuthState::AwaitingRedirect).await;
        Err(Error::RedirectIssued)
    }

    /// Builds the authorization endpoint URL for the given challenge and state.
    pub fn authorize_url(&self, challenge: &str, state: &str) -> Result<Url> {
        let mut params = vec![
            ("client_id", self.config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_challenge_method", "S256"),
            ("code_challenge", challenge),
            ("scope", self.config.scope.as_str()),
            ("state", state),
        ];
        if self.config.show_dialog {
            params.push(("show_dialog", "true"));
        }

        Url::parse_with_params(&self.config.auth_url, &params)
            .map_err(|e| Error::ValidationError(format!("invalid authorization URL: {e}")))
    }

    /// Drops the credential and any pending verifier.
    pub async fn logout(&self) {
        let _flight = self.single_flight.lock().await;
        self.tokens.clear_all().await;
        self.transition(AuthState::NoToken).await;
    }
}

/// Exchanges an authorization code for an access token using PKCE.
///
/// Posts the code, the code verifier, the redirect URI and the client ID as a
/// form-encoded body to the token endpoint. The verifier proves that the
/// client completing the flow is the one that started it, so no client secret
/// is involved.
///
/// # Errors
///
/// - [`Error::TokenExchangeFailed`] for a non-2xx answer, carrying the
///   provider's `error_description` (or `error`) when present
/// - [`Error::NetworkUnavailable`] when no response arrives
/// - [`Error::InvalidResponse`] when a 2xx body cannot be decoded
pub async fn exchange_code_pkce(
    client: &Client,
    config: &Config,
    code: &str,
    verifier: &str,
) -> Result<Credential> {
    let res = client
        .post(&config.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("client_id", config.client_id.as_str()),
            ("code_verifier", verifier),
        ])
        .send()
        .await
        .map_err(|e| Error::NetworkUnavailable(e.to_string()))?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        let parsed: TokenErrorResponse = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed
            .error_description
            .or(parsed.error)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
        return Err(Error::TokenExchangeFailed {
            status: status.as_u16(),
            message,
        });
    }

    let token: TokenResponse = res.json().await?;
    Ok(token.into())
}
