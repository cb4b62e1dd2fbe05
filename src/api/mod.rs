//! # API Module
//!
//! HTTP endpoints served by the local callback server while an authorization
//! is in flight.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the return redirect from Spotify's authorization
//!   endpoint. The full URL is recorded as the current location and the
//!   [`crate::spotify::AuthFlow`] is asked to resolve a token, which consumes
//!   the one-shot code and strips it from the recorded URL again.
//! - [`health`] - Returns the application status and version.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use jammcli::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::CallbackState;
pub use callback::callback;
pub use health::health;
