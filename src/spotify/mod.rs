//! # Spotify Integration Module
//!
//! This module is the integration layer between jammcli and Spotify. It owns
//! the credential lifecycle and every Web API call the application makes.
//!
//! ## Architecture
//!
//! ```text
//! CLI / callback server
//!          ↓
//! playlist::save, search::search
//!          ↓
//! ApiClient (bearer token, one retry on 401)
//!          ↓
//! AuthFlow (cache → return redirect → code exchange → redirect)
//!          ↓
//! TokenStore (memory + session persistence)
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - PKCE authorization state machine and the code exchange
//! - [`client`] - HTTP wrapper that attaches credentials and classifies failures
//! - [`search`] - catalog track search
//! - [`playlist`] - the user → create → attach transaction
//!
//! ## Failure Handling
//!
//! A single 401 is retried transparently after re-resolving the credential.
//! Everything else surfaces as a typed [`crate::Error`]; a playlist that was
//! created but could not be filled is reported as
//! [`crate::Error::PartiallyCreated`] so the orphan is never hidden.
//!
//! ## Usage
//!
//! ```rust
//! let tracks = spotify::search::search(&client, "massive attack").await?;
//! let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();
//! let playlist_id = spotify::playlist::save(&client, "Trip", &uris).await?;
//! ```

pub mod auth;
pub mod client;
pub mod playlist;
pub mod search;

pub use auth::{AuthFlow, AuthState};
pub use client::ApiClient;
