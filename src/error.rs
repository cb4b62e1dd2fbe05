//! Failure taxonomy shared by the authorization flow, the API client and the
//! playlist transaction.
//!
//! Callers match on the variant to decide whether to retry, prompt for
//! re-authentication or explain the problem to the user. "No results" is never
//! an error and has no variant here.

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No client identifier is configured. Fatal, raised before any flow starts.
    #[error("missing configuration: {0} must be set")]
    ConfigurationMissing(&'static str),

    /// The user or the provider rejected consent.
    #[error("authorization denied: {reason} ({})", .description.as_deref().unwrap_or("no description"))]
    AuthorizationDenied {
        reason: String,
        description: Option<String>,
    },

    /// An authorization code arrived without a matching stored verifier.
    #[error("authorization code received without a matching code verifier")]
    MissingVerifier,

    /// The token endpoint answered with a non-2xx status.
    #[error("token exchange failed ({status}): {message}")]
    TokenExchangeFailed { status: u16, message: String },

    /// The API rejected the credential twice in a row.
    #[error("authentication expired, please re-authenticate")]
    AuthenticationExpired,

    /// Any non-auth HTTP error.
    #[error("request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    /// The request never produced a response.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Caller-side input problem, reported before any network call.
    #[error("invalid input: {0}")]
    ValidationError(String),

    /// The playlist exists remotely but its tracks could not all be attached.
    /// `attached` counts the URIs that made it in before the failing batch.
    #[error("playlist {playlist_id} was created but only {attached} tracks could be attached: {source}")]
    PartiallyCreated {
        playlist_id: String,
        attached: usize,
        #[source]
        source: Box<Error>,
    },

    /// Control was handed to the external authorization step. Nothing after
    /// the redirect should be assumed to have happened.
    #[error("redirected to the authorization endpoint")]
    RedirectIssued,

    /// A successful response whose body could not be decoded.
    #[error("unexpected response body: {0}")]
    InvalidResponse(String),

    /// Session-scoped persistence could not be written.
    #[error("session storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Whether retrying the same call later may succeed without user action.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::NetworkUnavailable(_) => true,
            Error::RequestFailed { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::InvalidResponse(err.to_string())
        } else {
            Error::NetworkUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidResponse(err.to_string())
    }
}
