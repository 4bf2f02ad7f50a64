//! In-memory library for tests and demos
//!
//! Behaves like the SQLite library (same validation, same append and
//! reorder semantics) but keeps everything in process. Failures can be
//! injected per operation, a delay can simulate a slow disk, and every call
//! is counted so tests can assert which effects ran.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

use super::{parse_new_video, validate_new_playlist, Library};
use crate::error::{EffectError, EffectResult, Operation};
use crate::types::{NewPlaylist, NewVideo, Playlist, PlaylistId, VideoId, VideoItem};
use crate::video_ref::VideoRef;

#[derive(Default)]
struct Contents {
    playlists: Vec<Playlist>,
    videos: HashMap<PlaylistId, Vec<VideoItem>>,
}

impl Contents {
    fn playlist_mut(&mut self, playlist_id: &PlaylistId) -> EffectResult<&mut Playlist> {
        self.playlists
            .iter_mut()
            .find(|p| &p.id == playlist_id)
            .ok_or_else(|| {
                EffectError::NotFound(format!("Playlist {} does not exist", playlist_id))
            })
    }

    fn append(
        &mut self,
        playlist_id: &PlaylistId,
        video_ref: VideoRef,
        title: Option<String>,
    ) -> EffectResult<VideoItem> {
        self.playlist_mut(playlist_id)?.video_count += 1;

        let videos = self.videos.entry(playlist_id.clone()).or_default();
        let position = videos.iter().map(|v| v.position + 1).max().unwrap_or(0);
        let item = VideoItem {
            id: VideoId::new(),
            playlist_id: playlist_id.clone(),
            video_ref,
            title,
            position,
        };
        videos.push(item.clone());
        Ok(item)
    }
}

/// In-memory [`Library`] with failure injection and call recording
#[derive(Default)]
pub struct MemoryLibrary {
    contents: Mutex<Contents>,
    failures: Mutex<HashMap<Operation, EffectError>>,
    calls: Mutex<HashMap<Operation, usize>>,
    reorders: Mutex<Vec<(PlaylistId, Vec<(VideoId, i64)>)>>,
    delay: Duration,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation sleeps for `delay` before answering
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Insert a playlist directly, bypassing call counting
    pub fn seed_playlist(&self, name: &str) -> Playlist {
        let playlist = Playlist {
            id: PlaylistId::new(),
            name: name.to_string(),
            description: None,
            created_at: chrono::Utc::now().timestamp(),
            video_count: 0,
        };
        let mut contents = self.contents.lock().unwrap();
        contents.playlists.push(playlist.clone());
        contents.videos.insert(playlist.id.clone(), Vec::new());
        playlist
    }

    /// Append a video directly, bypassing call counting
    ///
    /// Panics when the reference is invalid or the playlist is unknown.
    pub fn seed_video(&self, playlist_id: &PlaylistId, reference: &str, title: &str) -> VideoItem {
        let video_ref = VideoRef::parse(reference).unwrap();
        self.contents
            .lock()
            .unwrap()
            .append(playlist_id, video_ref, Some(title.to_string()))
            .unwrap()
    }

    /// Make `operation` fail with `error` until cleared
    pub fn fail(&self, operation: Operation, error: EffectError) {
        self.failures.lock().unwrap().insert(operation, error);
    }

    pub fn clear_failure(&self, operation: Operation) {
        self.failures.lock().unwrap().remove(&operation);
    }

    /// Number of times `operation` was invoked through the trait
    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls.lock().unwrap().get(&operation).copied().unwrap_or(0)
    }

    /// Total trait calls across all operations
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Position lists received by `persist_reorder`, oldest first
    pub fn persisted_reorders(&self) -> Vec<(PlaylistId, Vec<(VideoId, i64)>)> {
        self.reorders.lock().unwrap().clone()
    }

    /// Current contents of a playlist, ordered by position
    pub fn videos(&self, playlist_id: &PlaylistId) -> Vec<VideoItem> {
        let mut videos = self
            .contents
            .lock()
            .unwrap()
            .videos
            .get(playlist_id)
            .cloned()
            .unwrap_or_default();
        videos.sort_by_key(|v| v.position);
        videos
    }

    async fn enter(&self, operation: Operation) -> EffectResult<()> {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.failures.lock().unwrap().get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Library for MemoryLibrary {
    async fn load_playlists(&self) -> EffectResult<Vec<Playlist>> {
        self.enter(Operation::LoadPlaylists).await?;
        Ok(self.contents.lock().unwrap().playlists.clone())
    }

    async fn load_playlist(&self, playlist_id: &PlaylistId) -> EffectResult<Vec<VideoItem>> {
        self.enter(Operation::LoadPlaylist).await?;
        self.contents.lock().unwrap().playlist_mut(playlist_id)?;
        Ok(self.videos(playlist_id))
    }

    async fn create_playlist(&self, new: &NewPlaylist) -> EffectResult<Playlist> {
        self.enter(Operation::CreatePlaylist).await?;
        validate_new_playlist(new)?;

        let playlist = Playlist {
            id: PlaylistId::new(),
            name: new.name.trim().to_string(),
            description: new.description.clone().filter(|d| !d.trim().is_empty()),
            created_at: chrono::Utc::now().timestamp(),
            video_count: 0,
        };
        let mut contents = self.contents.lock().unwrap();
        contents.playlists.push(playlist.clone());
        contents.videos.insert(playlist.id.clone(), Vec::new());
        Ok(playlist)
    }

    async fn add_video(&self, new: &NewVideo) -> EffectResult<VideoItem> {
        self.enter(Operation::AddVideo).await?;
        let video_ref = parse_new_video(new)?;
        self.contents
            .lock()
            .unwrap()
            .append(&new.playlist_id, video_ref, new.title.clone())
    }

    async fn persist_reorder(
        &self,
        playlist_id: &PlaylistId,
        positions: &[(VideoId, i64)],
    ) -> EffectResult<()> {
        self.enter(Operation::PersistReorder).await?;

        {
            let mut contents = self.contents.lock().unwrap();
            contents.playlist_mut(playlist_id)?;
            if let Some(videos) = contents.videos.get_mut(playlist_id) {
                for (video_id, position) in positions {
                    if let Some(video) = videos.iter_mut().find(|v| &v.id == video_id) {
                        *video = video.with_position(*position);
                    }
                }
            }
        }

        self.reorders
            .lock()
            .unwrap()
            .push((playlist_id.clone(), positions.to_vec()));
        Ok(())
    }
}
