use std::sync::Arc;

use crate::{
    cli::Context,
    error, info,
    management::{FileSession, TokenStore},
    success,
};

pub async fn auth(ctx: &Context) {
    match super::authorize(ctx).await {
        Ok(credential) => success!(
            "Authenticated. Token valid until {}.",
            credential.expires_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        ),
        Err(e) => error!("Authentication failed: {}", e),
    }
}

/// Works on the session file alone, so no client configuration is needed.
pub async fn logout() {
    TokenStore::new(Arc::new(FileSession::new())).clear_all().await;
    info!("Stored Spotify credentials removed.");
}
