//! vidqueue - a playlist and video queue client core
//!
//! The heart of this library is [`store`]: a single-writer action store with
//! a pure reducer and snapshot-based undo/redo over the video queue.
//! Persistence and playback are collaborators behind async traits.

pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod logging;
pub mod playback;
pub mod store;
pub mod types;
pub mod video_ref;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use error::{
    EffectError, EffectResult, ErrorCategory, Operation, OperationError, Result, VidqueueError,
};
pub use library::{memory::MemoryLibrary, sqlite::SqliteLibrary, Library};
pub use playback::{mock::MockPlayback, LogPlayback, PlaybackControl};
pub use store::{Action, Dispatcher, RootState, Store, StoreOptions};
pub use types::{
    NewPlaylist, NewVideo, Notification, NotificationId, NotificationLevel, PlaybackCommand,
    PlayerState, Playlist, PlaylistId, VideoId, VideoItem,
};
pub use video_ref::VideoRef;
