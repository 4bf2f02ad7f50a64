//! Pure reducer for store state transitions
//!
//! `(RootState, Action) -> RootState` with no I/O, no clock and no ambient
//! randomness. `ShuffleQueue` carries its own seed.
//!
//! History handling happens before the transition itself:
//! - `Record`: snapshot the queue onto `past` and clear `future`
//! - `Reset`: clear `past` and `future`
//! - `Keep`: leave history alone
//!
//! After every action the current index is validated against the video list.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::sync::Arc;

use super::action::Action;
use super::policy::{self, HistoryEffect};
use super::snapshot::Snapshot;
use super::state::{PlaylistsState, QueueState, RootState, HISTORY_LIMIT, NOTIFICATION_LIMIT};
use crate::error::OperationError;
use crate::types::{Notification, NotificationId, NotificationLevel, PlaylistId, VideoItem};

pub fn reduce(state: &RootState, action: &Action) -> RootState {
    let mut next = state.clone();

    match policy::classify(action) {
        HistoryEffect::Record => {
            let snapshot = Snapshot::capture(&next.queue);
            push_bounded(&mut next.queue.past, snapshot);
            next.queue.future.clear();
        }
        HistoryEffect::Reset => {
            next.queue.past.clear();
            next.queue.future.clear();
        }
        HistoryEffect::Keep => {}
    }

    apply(&mut next, action);
    next.queue.normalize_current();
    next
}

fn apply(state: &mut RootState, action: &Action) {
    match action {
        // === Playlists ===
        Action::Initialize => {
            state.playlists = PlaylistsState::Loading;
        }

        Action::PlaylistsLoaded(playlists) => {
            state.playlists = if playlists.is_empty() {
                PlaylistsState::Empty
            } else {
                PlaylistsState::Loaded(playlists.clone())
            };
        }

        Action::PlaylistsLoadFailed(error) => {
            state.playlists = PlaylistsState::Error(error.to_string());
            record_failure(state, error);
        }

        Action::SelectPlaylist(playlist_id) => {
            state.queue.selected_playlist_id = Some(playlist_id.clone());
            state.queue.videos = Arc::from(Vec::new());
            state.queue.current_index = None;
        }

        Action::PlaylistLoaded {
            playlist_id,
            videos,
        } => {
            // A result for a playlist the user already left is ignored
            if state.queue.selected_playlist_id.as_ref() == Some(playlist_id) {
                state.queue.videos = Arc::from(videos.as_slice());
                state.queue.current_index = None;
                update_video_count(&mut state.playlists, playlist_id, videos.len());
            }
        }

        Action::CreatePlaylistRequested(_) => {}

        Action::PlaylistCreated(playlist) => {
            if let PlaylistsState::Loaded(items) = &mut state.playlists {
                items.push(playlist.clone());
            } else if state.playlists == PlaylistsState::Empty {
                state.playlists = PlaylistsState::Loaded(vec![playlist.clone()]);
            }
            notify(
                state,
                NotificationLevel::Info,
                format!("Created playlist '{}'", playlist.name),
            );
        }

        // === Queue ===
        Action::AddVideoRequested(_) => {}

        Action::VideoAdded(item) => {
            if state.queue.selected_playlist_id.as_ref() == Some(&item.playlist_id) {
                let mut videos = state.queue.videos.to_vec();
                videos.push(item.clone());
                state.queue.videos = videos.into();
            }
            if let PlaylistsState::Loaded(items) = &mut state.playlists {
                if let Some(p) = items.iter_mut().find(|p| p.id == item.playlist_id) {
                    p.video_count += 1;
                }
            }
            notify(
                state,
                NotificationLevel::Info,
                format!("Added '{}'", item.display_name()),
            );
        }

        Action::SelectVideo { index, .. } => {
            if *index < state.queue.videos.len() {
                state.queue.current_index = Some(*index);
            }
        }

        Action::ReorderVideo { from, to } => reorder(&mut state.queue, *from, *to),

        Action::ShuffleQueue { seed } => shuffle(&mut state.queue, *seed),

        // === Player ===
        Action::PlaybackRequested(_) => {}

        Action::PlayerStateChanged(player) => {
            state.player = *player;
        }

        // === History ===
        Action::UndoRequested => undo(&mut state.queue),

        Action::RedoRequested => redo(&mut state.queue),

        // === Errors and notifications ===
        Action::OperationFailed(error) => record_failure(state, error),

        Action::DismissNotification(id) => {
            state.notifications.retain(|n| n.id != *id);
        }
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot) {
    stack.push_back(snapshot);
    while stack.len() > HISTORY_LIMIT {
        stack.pop_front();
    }
}

fn undo(queue: &mut QueueState) {
    let Some(snapshot) = queue.past.pop_back() else {
        return;
    };
    let current = Snapshot::capture(queue);
    push_bounded(&mut queue.future, current);
    restore_keeping_history(queue, &snapshot);
}

fn redo(queue: &mut QueueState) {
    let Some(snapshot) = queue.future.pop_back() else {
        return;
    };
    let current = Snapshot::capture(queue);
    push_bounded(&mut queue.past, current);
    restore_keeping_history(queue, &snapshot);
}

fn restore_keeping_history(queue: &mut QueueState, snapshot: &Snapshot) {
    let past = std::mem::take(&mut queue.past);
    let future = std::mem::take(&mut queue.future);
    *queue = QueueState {
        past,
        future,
        ..snapshot.restore()
    };
}

/// Positions follow list order after a move or shuffle
fn renumber(videos: impl Iterator<Item = VideoItem>) -> Arc<[VideoItem]> {
    videos
        .enumerate()
        .map(|(i, video)| {
            let position = i as i64;
            if video.position == position {
                video
            } else {
                video.with_position(position)
            }
        })
        .collect()
}

fn reorder(queue: &mut QueueState, from: usize, to: usize) {
    let len = queue.videos.len();
    if from == to || from >= len || to >= len {
        return;
    }

    let mut videos = queue.videos.to_vec();
    let moved = videos.remove(from);
    videos.insert(to, moved);
    queue.videos = renumber(videos.into_iter());

    queue.current_index = queue.current_index.map(|current| {
        if current == from {
            to
        } else if from < current && current <= to {
            current - 1
        } else if to <= current && current < from {
            current + 1
        } else {
            current
        }
    });
}

fn shuffle(queue: &mut QueueState, seed: u64) {
    if queue.videos.len() < 2 {
        return;
    }

    let mut order: Vec<usize> = (0..queue.videos.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let videos = Arc::clone(&queue.videos);
    queue.videos = renumber(order.iter().map(|&i| videos[i].clone()));
    queue.current_index = queue
        .current_index
        .and_then(|current| order.iter().position(|&i| i == current));
}

fn update_video_count(playlists: &mut PlaylistsState, playlist_id: &PlaylistId, count: usize) {
    if let PlaylistsState::Loaded(items) = playlists {
        if let Some(p) = items.iter_mut().find(|p| &p.id == playlist_id) {
            p.video_count = count;
        }
    }
}

fn record_failure(state: &mut RootState, error: &OperationError) {
    state.last_error = Some(error.clone());
    notify(state, NotificationLevel::Error, error.to_string());
}

fn notify(state: &mut RootState, level: NotificationLevel, message: String) {
    let id = NotificationId(state.next_notification_id);
    state.next_notification_id += 1;
    state.notifications.push(Notification { id, level, message });

    let excess = state.notifications.len().saturating_sub(NOTIFICATION_LIMIT);
    state.notifications.drain(..excess);
}
