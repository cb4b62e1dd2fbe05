use crate::types::Track;

pub const DEFAULT_PLAYLIST_NAME: &str = "New Playlist";

/// The local collection a user assembles before saving it as a playlist.
///
/// Never holds two tracks with the same id; insertion order is the listening
/// order.
#[derive(Debug, Clone)]
pub struct PlaylistDraft {
    name: String,
    tracks: Vec<Track>,
}

impl PlaylistDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Adds `track` unless a track with the same id is already present.
    /// Returns whether the track was added.
    pub fn add(&mut self, track: Track) -> bool {
        if self.has(&track.id) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    pub fn remove(&mut self, track_id: &str) -> Option<Track> {
        let index = self.tracks.iter().position(|t| t.id == track_id)?;
        Some(self.tracks.remove(index))
    }

    pub fn has(&self, track_id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == track_id)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn uris(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.uri.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Back to an empty draft with the default name, as after a successful save.
    pub fn reset(&mut self) {
        self.name = DEFAULT_PLAYLIST_NAME.to_string();
        self.tracks.clear();
    }
}

impl Default for PlaylistDraft {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYLIST_NAME)
    }
}
