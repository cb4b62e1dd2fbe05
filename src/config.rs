//! Configuration management for jammcli.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including Spotify API credentials, endpoint URLs, server settings
//! and search parameters.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (everything except the client ID)

use std::{env, path::PathBuf};

use crate::error::{Error, Result};

pub const CLIENT_ID_VAR: &str = "SPOTIFY_API_AUTH_CLIENT_ID";

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SCOPE: &str = "playlist-modify-public playlist-modify-private";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_MARKET: &str = "US";
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Returns the jammcli directory inside the platform local data directory.
///
/// - Linux: `~/.local/share/jammcli`
/// - macOS: `~/Library/Application Support/jammcli`
/// - Windows: `%LOCALAPPDATA%/jammcli`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("jammcli");
    path
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory if it doesn't exist. A missing `.env` file is not an
/// error: every value can also come from the process environment.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or if an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<()> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| Error::Storage(e.to_string()))?;

    let path = dir.join(".env");
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| Error::Storage(e.to_string()))?;
    }
    Ok(())
}

/// Runtime settings for the authorization flow and the Web API client.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub server_addr: String,
    pub market: String,
    pub search_limit: u32,
    pub show_dialog: bool,
}

impl Config {
    /// Builds a configuration with every optional value at its default.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
            market: DEFAULT_MARKET.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            show_dialog: true,
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMissing`] when `SPOTIFY_API_AUTH_CLIENT_ID`
    /// is unset or blank.
    pub fn from_env() -> Result<Self> {
        let client_id = env::var(CLIENT_ID_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(Error::ConfigurationMissing(CLIENT_ID_VAR))?;

        let mut config = Self::new(client_id.trim());
        if let Some(v) = var("SPOTIFY_API_REDIRECT_URI") {
            config.redirect_uri = v;
        }
        if let Some(v) = var("SPOTIFY_API_AUTH_SCOPE") {
            config.scope = v;
        }
        if let Some(v) = var("SPOTIFY_API_AUTH_URL") {
            config.auth_url = v;
        }
        if let Some(v) = var("SPOTIFY_API_TOKEN_URL") {
            config.token_url = v;
        }
        if let Some(v) = var("SPOTIFY_API_URL") {
            config.api_url = v;
        }
        if let Some(v) = var("SERVER_ADDRESS") {
            config.server_addr = v;
        }
        if let Some(v) = var("SPOTIFY_MARKET") {
            config.market = v;
        }
        if let Some(v) = var("SPOTIFY_SEARCH_LIMIT").and_then(|v| v.parse().ok()) {
            config.search_limit = v;
        }
        if let Some(v) = var("SPOTIFY_SHOW_DIALOG") {
            config.show_dialog = !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no");
        }
        Ok(config)
    }

    /// Web API base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
