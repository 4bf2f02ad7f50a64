//! Snapshots of the undoable queue slice
//!
//! A snapshot holds the video list exactly as it was shared at capture time
//! plus a separate copy of every item's position. Restoring writes those
//! positions back, so a restored queue shows the order it had when captured
//! even if the list it shares was built from items renumbered later.

use std::sync::Arc;

use super::state::QueueState;
use crate::types::{PlaylistId, VideoItem};

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    selected_playlist_id: Option<PlaylistId>,
    videos: Arc<[VideoItem]>,
    video_positions: Arc<[i64]>,
    current_index: Option<usize>,
}

impl Snapshot {
    pub fn capture(queue: &QueueState) -> Self {
        Self {
            selected_playlist_id: queue.selected_playlist_id.clone(),
            videos: Arc::clone(&queue.videos),
            video_positions: queue.videos.iter().map(|v| v.position).collect(),
            current_index: queue.current_index,
        }
    }

    /// Rebuild the queue as captured, with empty history stacks
    ///
    /// Positions are written back for the first
    /// `min(videos.len(), video_positions.len())` items; any mismatch in
    /// length is tolerated.
    pub fn restore(&self) -> QueueState {
        let stale = self
            .videos
            .iter()
            .zip(self.video_positions.iter())
            .any(|(video, position)| video.position != *position);

        let videos = if stale {
            self.videos
                .iter()
                .enumerate()
                .map(|(i, video)| match self.video_positions.get(i) {
                    Some(position) => video.with_position(*position),
                    None => video.clone(),
                })
                .collect()
        } else {
            Arc::clone(&self.videos)
        };

        let mut queue = QueueState {
            selected_playlist_id: self.selected_playlist_id.clone(),
            videos,
            current_index: self.current_index,
            ..QueueState::default()
        };
        queue.normalize_current();
        queue
    }

    #[cfg(test)]
    fn with_positions(mut self, positions: Vec<i64>) -> Self {
        self.video_positions = positions.into();
        self
    }
}
