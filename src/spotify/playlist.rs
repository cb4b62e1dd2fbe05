use chrono::Local;
use url::form_urlencoded;

use crate::{
    error::{Error, Result},
    spotify::ApiClient,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, CurrentUser,
    },
};

/// Spotify accepts at most this many URIs per add-tracks call.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

pub async fn current_user(client: &ApiClient) -> Result<CurrentUser> {
    client.get("/me").await
}

/// Creates a private playlist owned by `user_id`.
pub async fn create(client: &ApiClient, user_id: &str, name: &str) -> Result<CreatePlaylistResponse> {
    let body = serde_json::to_value(CreatePlaylistRequest {
        name: name.to_string(),
        description: Some(format!(
            "Created with jammcli - {}",
            Local::now().format("%Y-%m-%d")
        )),
        public: false,
    })?;
    client
        .post(&format!("/users/{}/playlists", encode_segment(user_id)), &body)
        .await
}

/// Appends one batch of at most [`MAX_TRACKS_PER_REQUEST`] URIs to the
/// playlist, keeping their order.
pub async fn add_tracks(client: &ApiClient, playlist_id: &str, uris: &[String]) -> Result<()> {
    let body = serde_json::to_value(AddTrackToPlaylistRequest {
        uris: uris.to_vec(),
    })?;
    let _: AddTrackToPlaylistResponse = client
        .post(&format!("/playlists/{}/tracks", encode_segment(playlist_id)), &body)
        .await?;
    Ok(())
}

/// Percent-encodes an id for use as a single path segment. Form encoding
/// writes a space as `+`, which a path would keep literally.
fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Saves `track_uris` as a new private playlist called `name`.
///
/// Runs three dependent calls: resolve the current user, create the playlist,
/// attach the tracks. Returns the id of the created playlist.
///
/// # Errors
///
/// - [`Error::ValidationError`] for an empty name or track list, before any
///   network call
/// - whatever the user lookup or playlist creation failed with; nothing has
///   been created in that case
/// - [`Error::PartiallyCreated`] when the playlist exists but attaching the
///   tracks failed. It carries the playlist id and how many URIs were attached
///   before the failing batch, so the caller can clean up or retry the rest.
pub async fn save(client: &ApiClient, name: &str, track_uris: &[String]) -> Result<String> {
    if name.trim().is_empty() {
        return Err(Error::ValidationError("playlist name must not be empty".into()));
    }
    if track_uris.is_empty() {
        return Err(Error::ValidationError("playlist needs at least one track".into()));
    }
    if track_uris.iter().any(|uri| uri.trim().is_empty()) {
        return Err(Error::ValidationError("track URIs must not be empty".into()));
    }

    let user = current_user(client).await?;
    let playlist = create(client, &user.id, name).await?;

    let mut attached = 0;
    for chunk in track_uris.chunks(MAX_TRACKS_PER_REQUEST) {
        add_tracks(client, &playlist.id, chunk)
            .await
            .map_err(|e| Error::PartiallyCreated {
                playlist_id: playlist.id.clone(),
                attached,
                source: Box::new(e),
            })?;
        attached += chunk.len();
    }

    Ok(playlist.id)
}
