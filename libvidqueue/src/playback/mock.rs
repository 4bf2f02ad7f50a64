//! Recording player for tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::PlaybackControl;
use crate::error::{EffectError, EffectResult};
use crate::types::PlaybackCommand;

/// Records every command; optionally fails all of them
#[derive(Debug, Clone, Default)]
pub struct MockPlayback {
    commands: Arc<Mutex<Vec<PlaybackCommand>>>,
    error: Option<EffectError>,
}

impl MockPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    /// A player that rejects every command with `error`
    pub fn failing(error: EffectError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Commands received so far, oldest first
    pub fn commands(&self) -> Vec<PlaybackCommand> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaybackControl for MockPlayback {
    async fn control(&self, command: &PlaybackCommand) -> EffectResult<()> {
        self.commands.lock().unwrap().push(command.clone());
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_commands_in_order() {
        let player = MockPlayback::new();
        player.control(&PlaybackCommand::Pause).await.unwrap();
        player.control(&PlaybackCommand::Stop).await.unwrap();

        assert_eq!(
            player.commands(),
            vec![PlaybackCommand::Pause, PlaybackCommand::Stop]
        );
    }

    #[tokio::test]
    async fn test_failing_player_still_records() {
        let player = MockPlayback::failing(EffectError::External("player detached".to_string()));
        let clone = player.clone();

        let err = clone.control(&PlaybackCommand::Resume).await.unwrap_err();
        assert!(err.to_string().contains("player detached"));
        assert_eq!(player.commands().len(), 1);
    }
}
