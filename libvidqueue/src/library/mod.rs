//! Playlist persistence collaborator
//!
//! The store never touches storage directly. The effect runner calls a
//! [`Library`] after a state transition and feeds the outcome back as an
//! action.
//!
//! Implementations:
//! - [`sqlite::SqliteLibrary`]: the on-disk library used by the binaries
//! - [`memory::MemoryLibrary`]: in-process library with failure injection,
//!   for tests and demos

use async_trait::async_trait;

use crate::error::{EffectError, EffectResult};
use crate::types::{NewPlaylist, NewVideo, Playlist, PlaylistId, VideoId, VideoItem};
use crate::video_ref::VideoRef;

pub mod memory;
pub mod sqlite;

/// Longest accepted playlist name, in characters
pub const MAX_PLAYLIST_NAME_LEN: usize = 100;

#[async_trait]
pub trait Library: Send + Sync {
    /// All playlists, in display order
    async fn load_playlists(&self) -> EffectResult<Vec<Playlist>>;

    /// Videos of one playlist in playback order
    ///
    /// # Errors
    ///
    /// `EffectError::NotFound` when the playlist does not exist
    async fn load_playlist(&self, playlist_id: &PlaylistId) -> EffectResult<Vec<VideoItem>>;

    /// # Errors
    ///
    /// `EffectError::Validation` for an empty or overlong name
    async fn create_playlist(&self, new: &NewPlaylist) -> EffectResult<Playlist>;

    /// Append a video to the end of a playlist
    ///
    /// # Errors
    ///
    /// - `EffectError::Validation` when the reference cannot be parsed
    /// - `EffectError::NotFound` when the playlist does not exist
    async fn add_video(&self, new: &NewVideo) -> EffectResult<VideoItem>;

    /// Store the positions produced by a reorder
    async fn persist_reorder(
        &self,
        playlist_id: &PlaylistId,
        positions: &[(VideoId, i64)],
    ) -> EffectResult<()>;
}

/// Checks shared by every implementation before a playlist is stored
pub fn validate_new_playlist(new: &NewPlaylist) -> EffectResult<()> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(EffectError::Validation(
            "Playlist name cannot be empty".to_string(),
        ));
    }

    let len = name.chars().count();
    if len > MAX_PLAYLIST_NAME_LEN {
        return Err(EffectError::Validation(format!(
            "Playlist name exceeds {} characters (got {})",
            MAX_PLAYLIST_NAME_LEN, len
        )));
    }

    Ok(())
}

/// Parse the user-supplied reference of a new video
pub fn parse_new_video(new: &NewVideo) -> EffectResult<VideoRef> {
    VideoRef::parse(&new.reference)
}
