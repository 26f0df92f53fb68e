use std::sync::Arc;

use literacy_core::Clock;
use literacy_core::model::{LevelId, Progress};
use storage::repository::{ProgressRecord, ProgressRepository};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::ProgressStoreError;

/// Owns the highest unlocked level and keeps it persisted.
///
/// Every write goes to the repository before the in-memory value changes, so a
/// read after a successful write always sees the new value.
pub struct ProgressStore {
    clock: Clock,
    repo: Arc<dyn ProgressRepository>,
    current: Mutex<Progress>,
}

impl ProgressStore {
    /// Store starting at the first level; call `load` to pick up persisted progress.
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            repo,
            current: Mutex::new(Progress::default()),
        }
    }

    /// Build a store and load the persisted value.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::Storage` if the repository cannot be read.
    pub async fn open(
        clock: Clock,
        repo: Arc<dyn ProgressRepository>,
    ) -> Result<Self, ProgressStoreError> {
        let store = Self::new(clock, repo);
        store.load().await?;
        Ok(store)
    }

    /// Read the persisted value. Missing or unparseable values count as level 1.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::Storage` if the repository cannot be read.
    pub async fn load(&self) -> Result<Progress, ProgressStoreError> {
        let mut current = self.current.lock().await;
        let progress = match self.repo.get_progress().await? {
            Some(record) => {
                if record.raw_value.parse::<LevelId>().is_err() {
                    debug!(raw = %record.raw_value, "stored progress unreadable, starting at level 1");
                }
                record.progress()
            }
            None => Progress::default(),
        };
        *current = progress;
        Ok(progress)
    }

    pub async fn current(&self) -> Progress {
        *self.current.lock().await
    }

    /// Unlock up to `level`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::Progress` if `level` does not move progress
    /// forward, or `ProgressStoreError::Storage` if persisting fails (the
    /// in-memory value is then left unchanged).
    pub async fn advance_to(&self, level: LevelId) -> Result<Progress, ProgressStoreError> {
        let mut current = self.current.lock().await;
        let next = current.advanced_to(level)?;
        self.persist(next).await?;
        *current = next;
        info!(max_unlocked = %level, "level unlocked");
        Ok(next)
    }

    /// Back to level 1.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::Storage` if persisting fails.
    pub async fn reset(&self) -> Result<Progress, ProgressStoreError> {
        let mut current = self.current.lock().await;
        let reset = Progress::default();
        self.persist(reset).await?;
        *current = reset;
        info!("progress reset");
        Ok(reset)
    }

    async fn persist(&self, progress: Progress) -> Result<(), ProgressStoreError> {
        let record = ProgressRecord::from_progress(progress, self.clock.now());
        self.repo.save_progress(&record).await?;
        Ok(())
    }
}
