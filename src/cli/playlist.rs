use crate::{
    cli::{Context, authorize, search::search_authorized, spinner},
    error,
    error::{Error, Result},
    info,
    management::PlaylistDraft,
    spotify, success,
    types::{Track, UNKNOWN_ALBUM, UNKNOWN_ARTIST},
    warning,
};

pub async fn playlist(
    ctx: &Context,
    name: String,
    track_uris: Vec<String>,
    search: Option<String>,
    take: usize,
) {
    let mut draft = PlaylistDraft::new(name);

    for uri in track_uris {
        let track = track_from_uri(uri);
        let uri = track.uri.clone();
        if !draft.add(track) {
            warning!("Skipping duplicate track {}", uri);
        }
    }

    if let Some(term) = search {
        match search_authorized(ctx, &term).await {
            Ok(tracks) => {
                for track in tracks.into_iter().take(take) {
                    let label = format!("{} - {}", track.artist, track.name);
                    if draft.add(track) {
                        info!("Added {}", label);
                    } else {
                        warning!("Skipping duplicate track {}", label);
                    }
                }
            }
            Err(e) => error!("Search failed: {}", e),
        }
    }

    if draft.is_empty() {
        error!("Please add tracks to your playlist before saving");
    }

    match save_authorized(ctx, &draft).await {
        Ok(playlist_id) => {
            success!(
                "Playlist \"{}\" saved with {} tracks (id {}).",
                draft.name(),
                draft.len(),
                playlist_id
            );
            draft.reset();
        }
        Err(Error::PartiallyCreated {
            playlist_id,
            attached,
            source,
        }) => {
            warning!(
                "Playlist {} was created but could not be fully populated ({} of {} tracks attached): {}. Remove it in Spotify or retry adding the rest.",
                playlist_id,
                attached,
                draft.len(),
                source
            );
        }
        Err(e) if e.is_retryable() => error!("Failed to save playlist, please retry later: {}", e),
        Err(e) => error!("Failed to save playlist: {}", e),
    }
}

async fn save_authorized(ctx: &Context, draft: &PlaylistDraft) -> Result<String> {
    let uris = draft.uris();
    authorize(ctx).await?;

    let pb = spinner("Saving playlist...");
    let first = spotify::playlist::save(&ctx.client, draft.name(), &uris).await;
    pb.finish_and_clear();

    match first {
        Err(Error::RedirectIssued) => {
            authorize(ctx).await?;
            spotify::playlist::save(&ctx.client, draft.name(), &uris).await
        }
        other => other,
    }
}

/// A bare track for a URI given on the command line, identified by the URI's
/// last segment.
fn track_from_uri(uri: String) -> Track {
    let id = uri.rsplit(':').next().unwrap_or(&uri).to_string();
    Track {
        id,
        name: uri.clone(),
        artist: UNKNOWN_ARTIST.to_string(),
        album: UNKNOWN_ALBUM.to_string(),
        uri,
        preview_url: None,
        external_urls: Default::default(),
    }
}
