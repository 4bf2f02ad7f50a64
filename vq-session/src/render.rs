//! Text and JSON output for the session

use libvidqueue::store::PlaylistsState;
use libvidqueue::{Notification, NotificationLevel, RootState};

pub fn render_playlists(state: &RootState) -> String {
    match &state.playlists {
        PlaylistsState::Loading => "Loading playlists...".to_string(),
        PlaylistsState::Empty => "No playlists yet. Create one with 'new <name>'".to_string(),
        PlaylistsState::Error(message) => format!("Could not load playlists: {}", message),
        PlaylistsState::Loaded(items) => {
            let selected = state.queue.selected_playlist_id.as_ref();
            items
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let marker = if Some(&p.id) == selected { '*' } else { ' ' };
                    format!(
                        "{} {:>2}. {} ({} videos) [{}]",
                        marker,
                        i + 1,
                        p.name,
                        p.video_count,
                        p.id
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

pub fn render_state(state: &RootState) -> String {
    let queue = &state.queue;
    let mut lines = Vec::new();

    match &queue.selected_playlist_id {
        None => lines.push("No playlist open".to_string()),
        Some(id) => {
            let name = state
                .playlists
                .items()
                .iter()
                .find(|p| &p.id == id)
                .map(|p| p.name.as_str())
                .unwrap_or(id.as_str());
            lines.push(format!("Playlist: {}", name));
            if queue.videos.is_empty() {
                lines.push("  (empty)".to_string());
            }
            for (i, video) in queue.videos.iter().enumerate() {
                let marker = if queue.current_index == Some(i) { '>' } else { ' ' };
                lines.push(format!("{} {:>2}. {}", marker, i + 1, video.display_name()));
            }
        }
    }

    lines.push(format!(
        "Player: {} | undo: {} | redo: {}",
        state.player,
        queue.past.len(),
        queue.future.len()
    ));

    for notification in &state.notifications {
        lines.push(render_notification(notification));
    }

    lines.join("\n")
}

pub fn render_notification(notification: &Notification) -> String {
    let level = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Error => "error",
    };
    format!("[{}] {}: {}", notification.id, level, notification.message)
}

/// Session state as JSON; history depth stands in for the stacks
pub fn state_json(state: &RootState) -> serde_json::Value {
    let mut value = serde_json::to_value(state).unwrap_or(serde_json::Value::Null);
    if let Some(queue) = value.get_mut("queue").and_then(|q| q.as_object_mut()) {
        queue.insert("undo_depth".to_string(), state.queue.past.len().into());
        queue.insert("redo_depth".to_string(), state.queue.future.len().into());
    }
    value
}
