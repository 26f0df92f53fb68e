use std::sync::Arc;

use literacy_core::LevelCatalog;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::game::GameEngine;
use crate::narration::NarrationQueue;
use crate::progress_store::ProgressStore;
use crate::question_source::{HttpQuestionSource, QuestionSource};

/// Assembles the app-facing services around one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<LevelCatalog>,
    progress: Arc<ProgressStore>,
    questions: Arc<dyn QuestionSource>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, generating questions with the
    /// endpoint configured in the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or loading progress fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock, Arc::new(HttpQuestionSource::from_env())).await
    }

    /// Build services over an existing storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Progress` if persisted progress cannot be read.
    pub async fn from_storage(
        storage: Storage,
        clock: Clock,
        questions: Arc<dyn QuestionSource>,
    ) -> Result<Self, AppServicesError> {
        let progress = ProgressStore::open(clock, Arc::clone(&storage.progress)).await?;
        Ok(Self {
            catalog: Arc::new(LevelCatalog::builtin()),
            progress: Arc::new(progress),
            questions,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<LevelCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn question_source(&self) -> Arc<dyn QuestionSource> {
        Arc::clone(&self.questions)
    }

    /// A fresh engine sharing this catalog, progress and question source.
    #[must_use]
    pub fn game_engine(&self, narration: NarrationQueue) -> GameEngine {
        GameEngine::new(
            self.catalog(),
            self.progress(),
            self.question_source(),
            narration,
        )
    }
}
