//! Player control collaborator
//!
//! The embedded player lives outside the store. Commands go out through
//! [`PlaybackControl`]; status changes come back in as
//! `Action::PlayerStateChanged` from whoever hosts the player.

use async_trait::async_trait;
use tracing::info;

use crate::error::EffectResult;
use crate::types::PlaybackCommand;

pub mod mock;

#[async_trait]
pub trait PlaybackControl: Send + Sync {
    async fn control(&self, command: &PlaybackCommand) -> EffectResult<()>;
}

/// Controller for hosts without an embedded player; logs each command
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPlayback;

#[async_trait]
impl PlaybackControl for LogPlayback {
    async fn control(&self, command: &PlaybackCommand) -> EffectResult<()> {
        match command {
            PlaybackCommand::Play(video_ref) => {
                info!(video = %video_ref, url = %video_ref.watch_url(), "Play");
            }
            PlaybackCommand::Pause => info!("Pause"),
            PlaybackCommand::Resume => info!("Resume"),
            PlaybackCommand::Stop => info!("Stop"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video_ref::VideoRef;

    #[tokio::test]
    async fn test_log_playback_accepts_every_command() {
        let player = LogPlayback;
        for command in [
            PlaybackCommand::Play(VideoRef::parse("dQw4w9WgXcQ").unwrap()),
            PlaybackCommand::Pause,
            PlaybackCommand::Resume,
            PlaybackCommand::Stop,
        ] {
            assert!(player.control(&command).await.is_ok());
        }
    }
}
