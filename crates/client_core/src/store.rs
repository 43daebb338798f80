use chrono::Utc;
use shared::{
    domain::{BpmBound, LocalPlaylist, LocalPlaylistId, RemotePlaylistSummary},
    protocol::BuildPlaylistResponse,
};
use tracing::info;

pub const EMPTY_STORE_HINT: &str = "No playlists yet. Click '+ New Playlist' to begin!";

/// Append-only, insertion-ordered list of playlists known to this process.
#[derive(Debug, Default)]
pub struct PlaylistStore {
    playlists: Vec<LocalPlaylist>,
    next_seq: u64,
}

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a playlist the user created directly.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        min_bpm: impl Into<BpmBound>,
        max_bpm: impl Into<BpmBound>,
    ) -> &LocalPlaylist {
        let playlist = LocalPlaylist {
            id: self.next_id(),
            name: name.into(),
            min_bpm: min_bpm.into(),
            max_bpm: max_bpm.into(),
            remote: None,
            created_at: Utc::now(),
        };
        self.push(playlist)
    }

    /// Records a playlist the remote service just built.
    pub fn add_built(
        &mut self,
        name: impl Into<String>,
        response: &BuildPlaylistResponse,
    ) -> &LocalPlaylist {
        let playlist = LocalPlaylist {
            id: self.next_id(),
            name: name.into(),
            min_bpm: BpmBound::Number(response.min_bpm),
            max_bpm: BpmBound::Number(response.max_bpm),
            remote: Some(RemotePlaylistSummary {
                playlist_id: response.playlist_id.clone(),
                added_count: response.added_count,
                fell_back: response.fell_back,
            }),
            created_at: Utc::now(),
        };
        self.push(playlist)
    }

    pub fn list(&self) -> &[LocalPlaylist] {
        &self.playlists
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    /// Home-screen text: one name line and one range line per playlist, or
    /// [`EMPTY_STORE_HINT`].
    pub fn render(&self) -> String {
        if self.playlists.is_empty() {
            return EMPTY_STORE_HINT.to_string();
        }
        self.playlists
            .iter()
            .map(|p| format!("{}\n  {}", p.name, p.bpm_range_label()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn push(&mut self, playlist: LocalPlaylist) -> &LocalPlaylist {
        info!(
            id = %playlist.id,
            name = %playlist.name,
            min_bpm = %playlist.min_bpm,
            max_bpm = %playlist.max_bpm,
            "store: playlist added"
        );
        self.playlists.push(playlist);
        &self.playlists[self.playlists.len() - 1]
    }

    // Millisecond timestamp plus a per-store counter: two adds in the same
    // millisecond still get distinct ids.
    fn next_id(&mut self) -> LocalPlaylistId {
        let seq = self.next_seq;
        self.next_seq += 1;
        LocalPlaylistId(format!("{}-{seq}", Utc::now().timestamp_millis()))
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
