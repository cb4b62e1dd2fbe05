mod auth;
mod draft;
mod session;

pub use auth::TokenStore;
pub use auth::{
    ACCESS_TOKEN_KEY, CODE_VERIFIERS_KEY, TOKEN_EXPIRY_KEY, TOKEN_SCOPE_KEY, VERIFIER_TTL_MILLIS,
};
pub use draft::DEFAULT_PLAYLIST_NAME;
pub use draft::PlaylistDraft;
pub use session::FileSession;
pub use session::MemorySession;
pub use session::SessionStore;
