//! Core domain types for vidqueue

use serde::{Deserialize, Serialize};

use crate::video_ref::VideoRef;

/// Identifier of a stored playlist (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(pub String);

impl PlaylistId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlaylistId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlaylistId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a video entry inside a playlist (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Stored playlist summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub video_count: usize,
}

/// Data for a playlist that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlaylist {
    pub name: String,
    pub description: Option<String>,
}

/// Data for a video to append to a playlist.
///
/// `reference` is what the user typed; it is parsed by the add-video effect,
/// so a malformed reference surfaces as a validation failure action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVideo {
    pub playlist_id: PlaylistId,
    pub reference: String,
    pub title: Option<String>,
}

/// One entry of a playlist.
///
/// Items are plain values. Reordering builds new items with new positions,
/// so a list captured in a snapshot never changes underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    pub id: VideoId,
    pub playlist_id: PlaylistId,
    pub video_ref: VideoRef,
    pub title: Option<String>,
    pub position: i64,
}

impl VideoItem {
    pub fn with_position(&self, position: i64) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    /// Title if known, otherwise the external reference
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(self.video_ref.as_str())
    }
}

/// Playback lifecycle as reported by the embedded player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    #[default]
    Empty,
    Loading,
    Buffering,
    Playing,
    Paused,
}

impl std::str::FromStr for PlayerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "empty" => Ok(PlayerState::Empty),
            "loading" => Ok(PlayerState::Loading),
            "buffering" => Ok(PlayerState::Buffering),
            "playing" => Ok(PlayerState::Playing),
            "paused" => Ok(PlayerState::Paused),
            _ => Err(format!(
                "Invalid player state: '{}'. Valid options: empty, loading, buffering, playing, paused",
                s
            )),
        }
    }
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlayerState::Empty => "empty",
            PlayerState::Loading => "loading",
            PlayerState::Buffering => "buffering",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Command sent to the embedded player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "video", rename_all = "snake_case")]
pub enum PlaybackCommand {
    Play(VideoRef),
    Pause,
    Resume,
    Stop,
}

/// Identifier of a transient notification, allocated by the reducer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub level: NotificationLevel,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(PlaylistId::new(), PlaylistId::new());
        assert_ne!(VideoId::new(), VideoId::new());
    }

    #[test]
    fn test_player_state_from_str() {
        assert_eq!("playing".parse::<PlayerState>().unwrap(), PlayerState::Playing);
        assert_eq!("PAUSED".parse::<PlayerState>().unwrap(), PlayerState::Paused);
        assert!("rewinding".parse::<PlayerState>().is_err());
    }

    #[test]
    fn test_player_state_display_round_trips_names() {
        for state in [
            PlayerState::Empty,
            PlayerState::Loading,
            PlayerState::Buffering,
            PlayerState::Playing,
            PlayerState::Paused,
        ] {
            assert_eq!(state.to_string().parse::<PlayerState>().unwrap(), state);
        }
    }

    #[test]
    fn test_with_position_keeps_identity() {
        let item = VideoItem {
            id: VideoId::from("v1"),
            playlist_id: PlaylistId::from("p1"),
            video_ref: VideoRef::parse("dQw4w9WgXcQ").unwrap(),
            title: None,
            position: 0,
        };

        let moved = item.with_position(7);
        assert_eq!(moved.id, item.id);
        assert_eq!(moved.position, 7);
        assert_eq!(item.position, 0);
        assert_eq!(moved.display_name(), "dQw4w9WgXcQ");
    }
}
