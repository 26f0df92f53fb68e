//! Shared error types for the services crate.

use thiserror::Error;

use literacy_core::model::{LevelId, ProgressError, QuestionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by a `QuestionSource`. The game engine absorbs all of them
/// by serving a fallback question.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("question generation is not configured")]
    Disabled,
    #[error("question generation returned an empty response")]
    EmptyResponse,
    #[error("question generation failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("generated question is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("generated question is invalid: {0}")]
    InvalidQuestion(#[from] QuestionError),
}

/// Errors emitted by `ProgressStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressStoreError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors reported by a speech synthesizer. Narration treats all of them as
/// "no speech".
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpeechError {
    #[error("speech synthesis is unavailable")]
    Unavailable,
    #[error("speech synthesis failed: {0}")]
    Failed(String),
}

/// Errors emitted by the game engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameError {
    #[error("unknown level {0}")]
    UnknownLevel(LevelId),
    #[error(transparent)]
    Progress(#[from] ProgressStoreError),
}

/// Errors emitted by `GameHandle` once the engine task has stopped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameHandleError {
    #[error("game engine is no longer running")]
    Closed,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Progress(#[from] ProgressStoreError),
}
