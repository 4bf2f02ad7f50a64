//! SQLite-backed library

use async_trait::async_trait;
use tracing::debug;

use super::{parse_new_video, validate_new_playlist, Library};
use crate::db::Database;
use crate::error::{EffectError, EffectResult};
use crate::types::{NewPlaylist, NewVideo, Playlist, PlaylistId, VideoId, VideoItem};

#[derive(Clone)]
pub struct SqliteLibrary {
    db: Database,
}

impl SqliteLibrary {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn require_playlist(&self, playlist_id: &PlaylistId) -> EffectResult<Playlist> {
        self.db
            .get_playlist(playlist_id)
            .await?
            .ok_or_else(|| {
                EffectError::NotFound(format!("Playlist {} does not exist", playlist_id))
            })
    }
}

#[async_trait]
impl Library for SqliteLibrary {
    async fn load_playlists(&self) -> EffectResult<Vec<Playlist>> {
        Ok(self.db.list_playlists().await?)
    }

    async fn load_playlist(&self, playlist_id: &PlaylistId) -> EffectResult<Vec<VideoItem>> {
        self.require_playlist(playlist_id).await?;
        Ok(self.db.list_videos(playlist_id).await?)
    }

    async fn create_playlist(&self, new: &NewPlaylist) -> EffectResult<Playlist> {
        validate_new_playlist(new)?;
        let normalized = NewPlaylist {
            name: new.name.trim().to_string(),
            description: new.description.clone().filter(|d| !d.trim().is_empty()),
        };
        Ok(self.db.create_playlist(&normalized).await?)
    }

    async fn add_video(&self, new: &NewVideo) -> EffectResult<VideoItem> {
        let video_ref = parse_new_video(new)?;
        self.require_playlist(&new.playlist_id).await?;
        Ok(self
            .db
            .add_video(&new.playlist_id, &video_ref, new.title.as_deref())
            .await?)
    }

    async fn persist_reorder(
        &self,
        playlist_id: &PlaylistId,
        positions: &[(VideoId, i64)],
    ) -> EffectResult<()> {
        self.require_playlist(playlist_id).await?;
        let updated = self.db.update_positions(playlist_id, positions).await?;
        if updated as usize != positions.len() {
            // The queue held videos the library no longer has
            debug!(
                playlist = %playlist_id,
                expected = positions.len(),
                updated,
                "Reorder touched fewer rows than requested"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use tempfile::TempDir;

    async fn setup_library() -> (SqliteLibrary, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("library.db");
        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
        (SqliteLibrary::new(db), temp_dir)
    }

    #[tokio::test]
    async fn test_create_trims_name_and_drops_blank_description() {
        let (library, _temp_dir) = setup_library().await;

        let playlist = library
            .create_playlist(&NewPlaylist {
                name: "  Cooking  ".to_string(),
                description: Some("  ".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(playlist.name, "Cooking");
        assert_eq!(playlist.description, None);
    }

    #[tokio::test]
    async fn test_load_unknown_playlist_is_not_found() {
        let (library, _temp_dir) = setup_library().await;

        let err = library
            .load_playlist(&PlaylistId::from("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[tokio::test]
    async fn test_add_video_validates_before_lookup() {
        let (library, _temp_dir) = setup_library().await;

        let err = library
            .add_video(&NewVideo {
                playlist_id: PlaylistId::from("missing"),
                reference: "definitely not a video".to_string(),
                title: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[tokio::test]
    async fn test_add_video_to_unknown_playlist_is_not_found() {
        let (library, _temp_dir) = setup_library().await;

        let err = library
            .add_video(&NewVideo {
                playlist_id: PlaylistId::from("missing"),
                reference: "dQw4w9WgXcQ".to_string(),
                title: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[tokio::test]
    async fn test_reorder_round_trip() {
        let (library, _temp_dir) = setup_library().await;
        let playlist = library
            .create_playlist(&NewPlaylist {
                name: "Mix".to_string(),
                description: None,
            })
            .await
            .unwrap();

        let mut ids = Vec::new();
        for title in ["a", "b"] {
            let item = library
                .add_video(&NewVideo {
                    playlist_id: playlist.id.clone(),
                    reference: "dQw4w9WgXcQ".to_string(),
                    title: Some(title.to_string()),
                })
                .await
                .unwrap();
            ids.push(item.id);
        }

        library
            .persist_reorder(&playlist.id, &[(ids[1].clone(), 0), (ids[0].clone(), 1)])
            .await
            .unwrap();

        let videos = library.load_playlist(&playlist.id).await.unwrap();
        assert_eq!(videos[0].id, ids[1]);
        assert_eq!(videos[1].id, ids[0]);
    }
}
