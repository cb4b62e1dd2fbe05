use std::sync::Arc;

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{Error, Result},
    spotify::auth::AuthFlow,
    types::{ApiErrorResponse, Credential},
    warning,
};

/// Token-aware wrapper around the Spotify Web API.
///
/// Every request resolves a credential first (a cache hit in the common case)
/// and is sent with `Authorization: Bearer <token>`. A 401 clears the token
/// store, resolves once more and retries exactly once; a second 401 surfaces
/// as [`Error::AuthenticationExpired`]. Other failures are never retried here.
pub struct ApiClient {
    http: Client,
    auth: Arc<AuthFlow>,
}

impl ApiClient {
    pub fn new(auth: Arc<AuthFlow>) -> Self {
        Self {
            http: Client::new(),
            auth,
        }
    }

    pub fn auth(&self) -> &Arc<AuthFlow> {
        &self.auth
    }

    /// Issues `method path` against the API base URL. `path` starts with `/`
    /// and may carry an already-encoded query string. Returns `Value::Null` for
    /// an empty success body.
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{}", self.auth.config().api_base(), path);

        let credential = self.auth.resolve_token().await?;
        let response = self.send(&method, &url, body, &credential).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::read(response).await;
        }

        warning!("Spotify rejected the access token, re-authenticating once...");
        self.auth.tokens().clear().await;
        let credential = self.auth.resolve_token().await?;
        let response = self.send(&method, &url, body, &credential).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.auth.tokens().clear().await;
            return Err(Error::AuthenticationExpired);
        }
        Self::read(response).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.request(Method::GET, path, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let value = self.request(Method::POST, path, Some(body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        credential: &Credential,
    ) -> Result<Response> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(&credential.access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| Error::NetworkUnavailable(e.to_string()))
    }

    async fn read(response: Response) -> Result<Value> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::NetworkUnavailable(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(Error::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
