use async_trait::async_trait;
use chrono::{DateTime, Utc};
use literacy_core::model::Progress;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of the unlock progress.
///
/// The value is kept as the raw stored text; callers decide how to interpret
/// values that are not positive integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub raw_value: String,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_progress(progress: Progress, updated_at: DateTime<Utc>) -> Self {
        Self {
            raw_value: progress.to_persisted(),
            updated_at,
        }
    }

    /// Interpret the stored text, defaulting to the first level.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::from_persisted(&self.raw_value)
    }
}

/// Durable key-value slot holding the highest unlocked level.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the stored progress, if any has been written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_progress(&self) -> Result<Option<ProgressRecord>, StorageError>;

    /// Replace the stored progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<Option<ProgressRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(&self) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(record.clone());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use literacy_core::model::LevelId;
    use literacy_core::time::fixed_now;

    #[tokio::test]
    async fn empty_repository_has_no_progress() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_progress().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saved_progress_is_read_back() {
        let repo = InMemoryRepository::new();
        let progress = Progress::new(LevelId::new(4).unwrap());
        repo.save_progress(&ProgressRecord::from_progress(progress, fixed_now()))
            .await
            .unwrap();

        let stored = repo.get_progress().await.unwrap().unwrap();
        assert_eq!(stored.raw_value, "4");
        assert_eq!(stored.updated_at, fixed_now());
        assert_eq!(stored.progress(), progress);
    }

    #[tokio::test]
    async fn garbage_value_reads_as_first_level() {
        let repo = InMemoryRepository::new();
        repo.save_progress(&ProgressRecord {
            raw_value: "NaN".into(),
            updated_at: fixed_now(),
        })
        .await
        .unwrap();

        let stored = repo.get_progress().await.unwrap().unwrap();
        assert_eq!(stored.progress().max_unlocked(), LevelId::FIRST);
    }
}
