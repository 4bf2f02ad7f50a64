//! Database operations for vidqueue

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::path::Path;

use crate::error::{DbError, Result};
use crate::types::{NewPlaylist, Playlist, PlaylistId, VideoId, VideoItem};
use crate::video_ref::VideoRef;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file and run migrations
    pub async fn new(db_path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(DbError::IoError)?;
        }

        // mode=rwc creates the file when missing
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(DbError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(DbError::MigrationError)?;

        tracing::debug!(path = %expanded_path, "Database ready");

        Ok(Self { pool })
    }

    /// All playlists with their video counts, oldest first
    pub async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.name, p.description, p.created_at, COUNT(v.id) AS video_count
            FROM playlists p
            LEFT JOIN videos v ON v.playlist_id = p.id
            GROUP BY p.id
            ORDER BY p.created_at ASC, p.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(rows.iter().map(playlist_from_row).collect())
    }

    pub async fn get_playlist(&self, playlist_id: &PlaylistId) -> Result<Option<Playlist>> {
        let row = sqlx::query(
            r#"
            SELECT p.id, p.name, p.description, p.created_at, COUNT(v.id) AS video_count
            FROM playlists p
            LEFT JOIN videos v ON v.playlist_id = p.id
            WHERE p.id = ?
            GROUP BY p.id
            "#,
        )
        .bind(playlist_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(row.as_ref().map(playlist_from_row))
    }

    pub async fn create_playlist(&self, new: &NewPlaylist) -> Result<Playlist> {
        let playlist = Playlist {
            id: PlaylistId::new(),
            name: new.name.clone(),
            description: new.description.clone(),
            created_at: chrono::Utc::now().timestamp(),
            video_count: 0,
        };

        sqlx::query(
            r#"
            INSERT INTO playlists (id, name, description, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(playlist.id.as_str())
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(playlist.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(playlist)
    }

    /// Videos of a playlist in playback order
    pub async fn list_videos(&self, playlist_id: &PlaylistId) -> Result<Vec<VideoItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, playlist_id, video_ref, title, position
            FROM videos
            WHERE playlist_id = ?
            ORDER BY position ASC, added_at ASC
            "#,
        )
        .bind(playlist_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(rows.iter().map(video_from_row).collect())
    }

    /// Append a video at the end of a playlist
    pub async fn add_video(
        &self,
        playlist_id: &PlaylistId,
        video_ref: &VideoRef,
        title: Option<&str>,
    ) -> Result<VideoItem> {
        let mut tx = self.pool.begin().await.map_err(DbError::SqlxError)?;

        let next_position: i64 = sqlx::query(
            r#"
            SELECT COALESCE(MAX(position) + 1, 0) AS next_position
            FROM videos WHERE playlist_id = ?
            "#,
        )
        .bind(playlist_id.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::SqlxError)?
        .get("next_position");

        let item = VideoItem {
            id: VideoId::new(),
            playlist_id: playlist_id.clone(),
            video_ref: video_ref.clone(),
            title: title.map(str::to_string),
            position: next_position,
        };

        sqlx::query(
            r#"
            INSERT INTO videos (id, playlist_id, video_ref, title, position, added_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.as_str())
        .bind(item.playlist_id.as_str())
        .bind(item.video_ref.as_str())
        .bind(&item.title)
        .bind(item.position)
        .bind(chrono::Utc::now().timestamp())
        .execute(&mut *tx)
        .await
        .map_err(DbError::SqlxError)?;

        tx.commit().await.map_err(DbError::SqlxError)?;

        Ok(item)
    }

    /// Rewrite positions of the given videos in one transaction.
    ///
    /// Returns the number of rows updated; ids not in the playlist are skipped.
    pub async fn update_positions(
        &self,
        playlist_id: &PlaylistId,
        positions: &[(VideoId, i64)],
    ) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(DbError::SqlxError)?;
        let mut updated = 0;

        for (video_id, position) in positions {
            let result = sqlx::query(
                r#"
                UPDATE videos SET position = ? WHERE id = ? AND playlist_id = ?
                "#,
            )
            .bind(position)
            .bind(video_id.as_str())
            .bind(playlist_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(DbError::SqlxError)?;

            updated += result.rows_affected();
        }

        tx.commit().await.map_err(DbError::SqlxError)?;

        Ok(updated)
    }
}

fn playlist_from_row(r: &sqlx::sqlite::SqliteRow) -> Playlist {
    Playlist {
        id: PlaylistId(r.get("id")),
        name: r.get("name"),
        description: r.get("description"),
        created_at: r.get("created_at"),
        video_count: r.get::<i64, _>("video_count").max(0) as usize,
    }
}

fn video_from_row(r: &sqlx::sqlite::SqliteRow) -> VideoItem {
    VideoItem {
        id: VideoId(r.get("id")),
        playlist_id: PlaylistId(r.get("playlist_id")),
        video_ref: VideoRef::from_stored(r.get("video_ref")),
        title: r.get("title"),
        position: r.get("position"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
        (db, temp_dir)
    }

    fn new_playlist(name: &str) -> NewPlaylist {
        NewPlaylist {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_playlists() {
        let (db, _temp_dir) = setup_test_db().await;

        let created = db.create_playlist(&new_playlist("Lectures")).await.unwrap();
        let playlists = db.list_playlists().await.unwrap();

        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].id, created.id);
        assert_eq!(playlists[0].name, "Lectures");
        assert_eq!(playlists[0].video_count, 0);
    }

    #[tokio::test]
    async fn test_get_missing_playlist() {
        let (db, _temp_dir) = setup_test_db().await;

        let missing = db.get_playlist(&PlaylistId::from("nope")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_add_video_appends_positions() {
        let (db, _temp_dir) = setup_test_db().await;
        let playlist = db.create_playlist(&new_playlist("Music")).await.unwrap();

        let r = VideoRef::parse("dQw4w9WgXcQ").unwrap();
        let first = db.add_video(&playlist.id, &r, Some("first")).await.unwrap();
        let second = db.add_video(&playlist.id, &r, None).await.unwrap();

        assert_eq!(first.position, 0);
        assert_eq!(second.position, 1);

        let videos = db.list_videos(&playlist.id).await.unwrap();
        assert_eq!(videos, vec![first, second]);

        let summary = db.get_playlist(&playlist.id).await.unwrap().unwrap();
        assert_eq!(summary.video_count, 2);
    }

    #[tokio::test]
    async fn test_update_positions_reorders_listing() {
        let (db, _temp_dir) = setup_test_db().await;
        let playlist = db.create_playlist(&new_playlist("Talks")).await.unwrap();
        let r = VideoRef::parse("dQw4w9WgXcQ").unwrap();

        let a = db.add_video(&playlist.id, &r, Some("a")).await.unwrap();
        let b = db.add_video(&playlist.id, &r, Some("b")).await.unwrap();
        let c = db.add_video(&playlist.id, &r, Some("c")).await.unwrap();

        let updated = db
            .update_positions(
                &playlist.id,
                &[(c.id.clone(), 0), (a.id.clone(), 1), (b.id.clone(), 2)],
            )
            .await
            .unwrap();
        assert_eq!(updated, 3);

        let titles: Vec<_> = db
            .list_videos(&playlist.id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.title.unwrap())
            .collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_update_positions_ignores_foreign_ids() {
        let (db, _temp_dir) = setup_test_db().await;
        let playlist = db.create_playlist(&new_playlist("One")).await.unwrap();

        let updated = db
            .update_positions(&playlist.id, &[(VideoId::from("ghost"), 3)])
            .await
            .unwrap();
        assert_eq!(updated, 0);
    }
}
