use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    error::{Error, Result},
    management::SessionStore,
    types::{Credential, parse_scope},
    warning,
};

pub const ACCESS_TOKEN_KEY: &str = "spotify_access_token";
pub const TOKEN_EXPIRY_KEY: &str = "spotify_token_expiry";
pub const TOKEN_SCOPE_KEY: &str = "spotify_token_scope";
pub const CODE_VERIFIERS_KEY: &str = "code_verifiers";

/// Pending verifiers older than this belong to abandoned attempts.
pub const VERIFIER_TTL_MILLIS: i64 = 10 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingVerifier {
    verifier: String,
    created_at: i64,
}

/// Single source of truth for "do we have a usable credential".
///
/// Keeps the credential in memory and mirrors it into the session store so it
/// survives a restart within the same session. Pending PKCE verifiers live in
/// the session store only, keyed by the `state` value of their authorization
/// attempt. They expire after [`VERIFIER_TTL_MILLIS`] and are pruned whenever
/// the map is touched.
///
/// Lifecycle: [`TokenStore::init`] hydrates from persistence, [`TokenStore::clear`]
/// drops the credential (on 401 and logout). No teardown is needed.
pub struct TokenStore {
    session: Arc<dyn SessionStore>,
    credential: Mutex<Option<Credential>>,
    verifiers: Mutex<()>,
}

impl TokenStore {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self {
            session,
            credential: Mutex::new(None),
            verifiers: Mutex::new(()),
        }
    }

    /// Creates the store and hydrates it from persistence.
    pub async fn init(session: Arc<dyn SessionStore>) -> Self {
        let store = Self::new(session);
        let _ = store.get().await;
        store
    }

    /// Returns a usable credential, hydrating from persistence when the
    /// in-memory copy is absent. Expired state is cleared on the way.
    pub async fn get(&self) -> Option<Credential> {
        let mut credential = self.credential.lock().await;
        if let Some(current) = credential.as_ref() {
            if current.is_usable() {
                return Some(current.clone());
            }
            *credential = None;
        }

        let token = self.session.get(ACCESS_TOKEN_KEY).await;
        let expiry = self.session.get(TOKEN_EXPIRY_KEY).await;
        let (Some(token), Some(expiry)) = (token, expiry) else {
            return None;
        };

        let expires_at = expiry
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis);

        match expires_at {
            Some(expires_at) if Utc::now() < expires_at => {
                let scope = self.session.get(TOKEN_SCOPE_KEY).await.unwrap_or_default();
                let hydrated = Credential {
                    access_token: token,
                    expires_at,
                    scope: parse_scope(&scope),
                };
                *credential = Some(hydrated.clone());
                Some(hydrated)
            }
            _ => {
                drop(credential);
                self.clear_persisted().await;
                None
            }
        }
    }

    /// Stores a freshly issued credential in memory and in the session.
    pub async fn set(&self, credential: Credential) -> Result<()> {
        let mut current = self.credential.lock().await;
        self.session
            .set(ACCESS_TOKEN_KEY, credential.access_token.clone())
            .await?;
        self.session
            .set(
                TOKEN_EXPIRY_KEY,
                credential.expires_at.timestamp_millis().to_string(),
            )
            .await?;
        let scope: Vec<&str> = credential.scope.iter().map(String::as_str).collect();
        self.session.set(TOKEN_SCOPE_KEY, scope.join(" ")).await?;
        *current = Some(credential);
        Ok(())
    }

    pub async fn clear(&self) {
        *self.credential.lock().await = None;
        self.clear_persisted().await;
    }

    /// Drops the credential and every pending verifier.
    pub async fn clear_all(&self) {
        self.clear().await;
        self.clear_verifiers().await;
    }

    async fn clear_persisted(&self) {
        for key in [ACCESS_TOKEN_KEY, TOKEN_EXPIRY_KEY, TOKEN_SCOPE_KEY] {
            if let Err(e) = self.session.remove(key).await {
                warning!("Failed to remove {} from session: {}", key, e);
            }
        }
    }

    pub async fn store_verifier(&self, state: &str, verifier: &str) -> Result<()> {
        let _guard = self.verifiers.lock().await;
        let mut pending = self.pending_verifiers().await;
        pending.insert(
            state.to_string(),
            PendingVerifier {
                verifier: verifier.to_string(),
                created_at: Utc::now().timestamp_millis(),
            },
        );
        self.write_verifiers(&pending).await
    }

    /// Removes and returns the verifier stored for `state`. One-shot: a second
    /// call for the same state yields `None`, and so does an expired entry.
    pub async fn take_verifier(&self, state: &str) -> Option<String> {
        let _guard = self.verifiers.lock().await;
        let mut pending = self.pending_verifiers().await;
        let taken = pending.remove(state);
        if let Err(e) = self.write_verifiers(&pending).await {
            warning!("Failed to persist consumed code verifier: {}", e);
        }
        taken.map(|entry| entry.verifier)
    }

    /// Number of unexpired verifiers waiting for a return redirect.
    pub async fn pending_count(&self) -> usize {
        let _guard = self.verifiers.lock().await;
        self.pending_verifiers().await.len()
    }

    pub async fn clear_verifiers(&self) {
        let _guard = self.verifiers.lock().await;
        if let Err(e) = self.session.remove(CODE_VERIFIERS_KEY).await {
            warning!("Failed to remove pending code verifiers: {}", e);
        }
    }

    /// Reads the pending map with expired entries already dropped. An
    /// unreadable map counts as empty.
    async fn pending_verifiers(&self) -> HashMap<String, PendingVerifier> {
        let mut pending: HashMap<String, PendingVerifier> = self
            .session
            .get(CODE_VERIFIERS_KEY)
            .await
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();
        let cutoff = Utc::now().timestamp_millis() - VERIFIER_TTL_MILLIS;
        pending.retain(|_, entry| entry.created_at > cutoff);
        pending
    }

    async fn write_verifiers(&self, pending: &HashMap<String, PendingVerifier>) -> Result<()> {
        if pending.is_empty() {
            return self.session.remove(CODE_VERIFIERS_KEY).await;
        }
        self.session
            .set(
                CODE_VERIFIERS_KEY,
                serde_json::to_string(pending).map_err(|e| Error::Storage(e.to_string()))?,
            )
            .await
    }
}
