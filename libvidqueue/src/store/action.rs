//! Actions for the store
//!
//! Every state change, whether requested by a user or reported back by a
//! collaborator, enters the store as one of these values. The reducer is the
//! only consumer; the effect runner reads them to decide which collaborator
//! to call.

use serde::{Deserialize, Serialize};

use crate::error::OperationError;
use crate::types::{
    NewPlaylist, NewVideo, NotificationId, PlaybackCommand, PlayerState, Playlist, PlaylistId,
    VideoItem,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Action {
    // === Playlists ===
    /// Session start; triggers the playlist listing
    Initialize,

    /// Listing finished
    PlaylistsLoaded(Vec<Playlist>),

    /// Listing failed
    PlaylistsLoadFailed(OperationError),

    /// User opened a playlist; its contents load asynchronously
    SelectPlaylist(PlaylistId),

    /// Contents of a playlist arrived
    PlaylistLoaded {
        playlist_id: PlaylistId,
        videos: Vec<VideoItem>,
    },

    CreatePlaylistRequested(NewPlaylist),

    PlaylistCreated(Playlist),

    // === Queue ===
    AddVideoRequested(NewVideo),

    VideoAdded(VideoItem),

    /// Make the video at `index` current, optionally starting playback
    SelectVideo { index: usize, autoplay: bool },

    /// Drag-and-drop completion: move the item at `from` to `to`
    ReorderVideo { from: usize, to: usize },

    /// Randomize the queue order; the seed keeps the reducer deterministic
    ShuffleQueue { seed: u64 },

    // === Player ===
    PlaybackRequested(PlaybackCommand),

    /// Status callback from the embedded player
    PlayerStateChanged(PlayerState),

    // === History ===
    UndoRequested,

    RedoRequested,

    // === Errors and notifications ===
    OperationFailed(OperationError),

    DismissNotification(NotificationId),
}

impl Action {
    /// Stable variant name for logs and events
    pub fn name(&self) -> &'static str {
        match self {
            Action::Initialize => "initialize",
            Action::PlaylistsLoaded(_) => "playlists_loaded",
            Action::PlaylistsLoadFailed(_) => "playlists_load_failed",
            Action::SelectPlaylist(_) => "select_playlist",
            Action::PlaylistLoaded { .. } => "playlist_loaded",
            Action::CreatePlaylistRequested(_) => "create_playlist_requested",
            Action::PlaylistCreated(_) => "playlist_created",
            Action::AddVideoRequested(_) => "add_video_requested",
            Action::VideoAdded(_) => "video_added",
            Action::SelectVideo { .. } => "select_video",
            Action::ReorderVideo { .. } => "reorder_video",
            Action::ShuffleQueue { .. } => "shuffle_queue",
            Action::PlaybackRequested(_) => "playback_requested",
            Action::PlayerStateChanged(_) => "player_state_changed",
            Action::UndoRequested => "undo_requested",
            Action::RedoRequested => "redo_requested",
            Action::OperationFailed(_) => "operation_failed",
            Action::DismissNotification(_) => "dismiss_notification",
        }
    }

    /// Undo and redo only move between snapshots and never reach collaborators
    pub fn is_history(&self) -> bool {
        matches!(self, Action::UndoRequested | Action::RedoRequested)
    }
}
