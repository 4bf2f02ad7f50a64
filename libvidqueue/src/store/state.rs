//! Store state
//!
//! `RootState` is replaced wholesale for every processed action and
//! published behind an `Arc`. Only [`QueueState`] carries undo history.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

use super::snapshot::Snapshot;
use crate::error::OperationError;
use crate::types::{Notification, PlayerState, Playlist, PlaylistId, VideoItem};

/// Maximum number of snapshots kept in each history stack
pub const HISTORY_LIMIT: usize = 30;

/// Maximum number of notifications shown at once; the oldest is evicted
pub const NOTIFICATION_LIMIT: usize = 5;

/// Playlist listing lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum PlaylistsState {
    #[default]
    Loading,
    Loaded(Vec<Playlist>),
    Empty,
    Error(String),
}

impl PlaylistsState {
    pub fn items(&self) -> &[Playlist] {
        match self {
            PlaylistsState::Loaded(items) => items,
            _ => &[],
        }
    }
}

/// The undoable slice: selected playlist, its videos and the current item
#[derive(Debug, Clone, Serialize)]
pub struct QueueState {
    pub selected_playlist_id: Option<PlaylistId>,
    pub videos: Arc<[VideoItem]>,
    pub current_index: Option<usize>,
    /// Undo stack, most recent last
    #[serde(skip)]
    pub past: VecDeque<Snapshot>,
    /// Redo stack, most recent last
    #[serde(skip)]
    pub future: VecDeque<Snapshot>,
}

impl Default for QueueState {
    fn default() -> Self {
        Self {
            selected_playlist_id: None,
            videos: Arc::from(Vec::new()),
            current_index: None,
            past: VecDeque::new(),
            future: VecDeque::new(),
        }
    }
}

impl QueueState {
    pub fn current_video(&self) -> Option<&VideoItem> {
        self.current_index.and_then(|i| self.videos.get(i))
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Same playlist, same items in the same order, same current index.
    /// History stacks are ignored.
    pub fn same_contents(&self, other: &QueueState) -> bool {
        self.selected_playlist_id == other.selected_playlist_id
            && self.current_index == other.current_index
            && self.videos[..] == other.videos[..]
    }

    /// Drop a current index that no longer points at a video
    pub(crate) fn normalize_current(&mut self) {
        match self.current_index {
            Some(i) if i < self.videos.len() => {}
            Some(_) => self.current_index = None,
            None => {}
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RootState {
    pub playlists: PlaylistsState,
    pub queue: QueueState,
    pub player: PlayerState,
    /// Active notifications, oldest first
    pub notifications: Vec<Notification>,
    pub last_error: Option<OperationError>,
    pub next_notification_id: u64,
}

impl RootState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VideoId;
    use crate::video_ref::VideoRef;

    fn item(id: &str) -> VideoItem {
        VideoItem {
            id: VideoId::from(id),
            playlist_id: PlaylistId::from("p"),
            video_ref: VideoRef::parse("dQw4w9WgXcQ").unwrap(),
            title: None,
            position: 0,
        }
    }

    #[test]
    fn test_initial_state() {
        let state = RootState::new();
        assert_eq!(state.playlists, PlaylistsState::Loading);
        assert!(state.queue.videos.is_empty());
        assert_eq!(state.player, PlayerState::Empty);
        assert!(!state.queue.can_undo());
        assert!(!state.queue.can_redo());
    }

    #[test]
    fn test_normalize_current() {
        let mut queue = QueueState {
            videos: Arc::from(vec![item("a")]),
            current_index: Some(3),
            ..QueueState::default()
        };
        queue.normalize_current();
        assert_eq!(queue.current_index, None);

        queue.current_index = Some(0);
        queue.normalize_current();
        assert_eq!(queue.current_video().map(|v| v.id.as_str()), Some("a"));
    }

    #[test]
    fn test_serialized_queue_omits_history() {
        let json = serde_json::to_value(RootState::new()).unwrap();
        assert!(json["queue"].get("past").is_none());
        assert_eq!(json["playlists"]["status"], "loading");
    }
}
