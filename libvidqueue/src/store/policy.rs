//! Undo policy: how an action affects history
//!
//! One exhaustive classification decides everything. `is_undoable` and
//! `is_boundary` are views of it, so no action can be both.

use serde::{Deserialize, Serialize};

use super::action::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEffect {
    /// Capture the queue before the transition and clear redo
    Record,
    /// Clear both history stacks
    Reset,
    /// History untouched (undo and redo manage it themselves)
    Keep,
}

pub fn classify(action: &Action) -> HistoryEffect {
    match action {
        Action::SelectVideo { .. } | Action::ReorderVideo { .. } | Action::ShuffleQueue { .. } => {
            HistoryEffect::Record
        }

        Action::SelectPlaylist(_) | Action::PlaylistLoaded { .. } => HistoryEffect::Reset,

        Action::Initialize
        | Action::PlaylistsLoaded(_)
        | Action::PlaylistsLoadFailed(_)
        | Action::CreatePlaylistRequested(_)
        | Action::PlaylistCreated(_)
        | Action::AddVideoRequested(_)
        | Action::VideoAdded(_)
        | Action::PlaybackRequested(_)
        | Action::PlayerStateChanged(_)
        | Action::UndoRequested
        | Action::RedoRequested
        | Action::OperationFailed(_)
        | Action::DismissNotification(_) => HistoryEffect::Keep,
    }
}

pub fn is_undoable(action: &Action) -> bool {
    classify(action) == HistoryEffect::Record
}

pub fn is_boundary(action: &Action) -> bool {
    classify(action) == HistoryEffect::Reset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EffectError, Operation, OperationError};
    use crate::types::{NewPlaylist, NotificationId, PlaybackCommand, PlayerState, PlaylistId};

    fn all_actions() -> Vec<Action> {
        let failure = OperationError::new(
            Operation::LoadPlaylists,
            EffectError::Transient("busy".to_string()),
        );
        vec![
            Action::Initialize,
            Action::PlaylistsLoaded(Vec::new()),
            Action::PlaylistsLoadFailed(failure.clone()),
            Action::SelectPlaylist(PlaylistId::from("p")),
            Action::PlaylistLoaded {
                playlist_id: PlaylistId::from("p"),
                videos: Vec::new(),
            },
            Action::CreatePlaylistRequested(NewPlaylist {
                name: "n".to_string(),
                description: None,
            }),
            Action::SelectVideo {
                index: 0,
                autoplay: true,
            },
            Action::ReorderVideo { from: 0, to: 1 },
            Action::ShuffleQueue { seed: 1 },
            Action::PlaybackRequested(PlaybackCommand::Pause),
            Action::PlayerStateChanged(PlayerState::Playing),
            Action::UndoRequested,
            Action::RedoRequested,
            Action::OperationFailed(failure),
            Action::DismissNotification(NotificationId(0)),
        ]
    }

    #[test]
    fn test_predicates_are_disjoint() {
        for action in all_actions() {
            assert!(
                !(is_undoable(&action) && is_boundary(&action)),
                "{} is both undoable and a boundary",
                action.name()
            );
        }
    }

    #[test]
    fn test_undoable_set() {
        let undoable: Vec<_> = all_actions()
            .into_iter()
            .filter(is_undoable)
            .map(|a| a.name())
            .collect();
        assert_eq!(undoable, vec!["select_video", "reorder_video", "shuffle_queue"]);
    }

    #[test]
    fn test_boundary_set() {
        let boundaries: Vec<_> = all_actions()
            .into_iter()
            .filter(is_boundary)
            .map(|a| a.name())
            .collect();
        assert_eq!(boundaries, vec!["select_playlist", "playlist_loaded"]);
    }

    #[test]
    fn test_player_callbacks_are_neutral() {
        for state in [PlayerState::Buffering, PlayerState::Paused] {
            assert_eq!(classify(&Action::PlayerStateChanged(state)), HistoryEffect::Keep);
        }
    }
}
