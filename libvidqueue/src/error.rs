//! Error types for vidqueue
//!
//! Two layers:
//! - [`VidqueueError`] for setup and CLI paths (config, database bootstrap,
//!   dispatch), propagated with `?`.
//! - [`EffectError`] / [`OperationError`] for collaborator failures. These never
//!   propagate into the dispatch loop; the effect runner turns them into
//!   follow-up actions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VidqueueError>;

/// Result type returned by collaborators (library, playback).
pub type EffectResult<T> = std::result::Result<T, EffectError>;

#[derive(Error, Debug)]
pub enum VidqueueError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Effect error: {0}")]
    Effect(#[from] EffectError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VidqueueError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            VidqueueError::InvalidInput(_) => 3,
            VidqueueError::Effect(EffectError::Validation(_)) => 3,
            VidqueueError::Config(_) | VidqueueError::Database(_) => 2,
            VidqueueError::Dispatch(_) => 2,
            VidqueueError::Effect(_) | VidqueueError::Io(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database operation failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Store is shutting down, action rejected")]
    ShuttingDown,

    #[error("Action queue is full")]
    Full,
}

/// Failure category of an external operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Transient,
    External,
    Unexpected,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::NotFound => write!(f, "not-found"),
            ErrorCategory::Transient => write!(f, "transient"),
            ErrorCategory::External => write!(f, "external"),
            ErrorCategory::Unexpected => write!(f, "unexpected"),
        }
    }
}

/// Failure reported by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", content = "message", rename_all = "kebab-case")]
pub enum EffectError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Temporary failure: {0}")]
    Transient(String),

    #[error("External failure: {0}")]
    External(String),

    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl EffectError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EffectError::Validation(_) => ErrorCategory::Validation,
            EffectError::NotFound(_) => ErrorCategory::NotFound,
            EffectError::Transient(_) => ErrorCategory::Transient,
            EffectError::External(_) => ErrorCategory::External,
            EffectError::Unexpected(_) => ErrorCategory::Unexpected,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            EffectError::Validation(m)
            | EffectError::NotFound(m)
            | EffectError::Transient(m)
            | EffectError::External(m)
            | EffectError::Unexpected(m) => m,
        }
    }

    /// Whether retrying the same call might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EffectError::Transient(_))
    }
}

impl From<DbError> for EffectError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::SqlxError(sqlx::Error::RowNotFound) => {
                EffectError::NotFound("Requested row does not exist".to_string())
            }
            DbError::SqlxError(
                e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)),
            ) => EffectError::Transient(e.to_string()),
            DbError::SqlxError(sqlx::Error::Database(db_err))
                if db_err.message().contains("database is locked") =>
            {
                EffectError::Transient(db_err.message().to_string())
            }
            DbError::IoError(e) => EffectError::Transient(e.to_string()),
            other => EffectError::Unexpected(other.to_string()),
        }
    }
}

impl From<VidqueueError> for EffectError {
    fn from(err: VidqueueError) -> Self {
        match err {
            VidqueueError::Database(db) => db.into(),
            VidqueueError::Effect(e) => e,
            VidqueueError::InvalidInput(m) => EffectError::Validation(m),
            other => EffectError::Unexpected(other.to_string()),
        }
    }
}

/// Named outbound operation, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    LoadPlaylists,
    LoadPlaylist,
    CreatePlaylist,
    AddVideo,
    PersistReorder,
    ControlPlayback,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::LoadPlaylists => "load-playlists",
            Operation::LoadPlaylist => "load-playlist",
            Operation::CreatePlaylist => "create-playlist",
            Operation::AddVideo => "add-video",
            Operation::PersistReorder => "persist-reorder",
            Operation::ControlPlayback => "control-playback",
        };
        write!(f, "{}", name)
    }
}

/// A collaborator failure tagged with the operation that produced it.
///
/// This is the payload of error-result actions and of `RootState::last_error`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{operation} failed: {error}")]
pub struct OperationError {
    pub operation: Operation,
    pub error: EffectError,
}

impl OperationError {
    pub fn new(operation: Operation, error: EffectError) -> Self {
        Self { operation, error }
    }

    pub fn category(&self) -> ErrorCategory {
        self.error.category()
    }
}
