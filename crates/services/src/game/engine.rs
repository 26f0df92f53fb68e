use std::future::Future;
use std::sync::Arc;

use literacy_core::model::{
    Level, LevelId, Progress, Question, SessionSnapshot, SessionStatus,
};
use literacy_core::{FallbackPool, LevelCatalog, QUESTIONS_PER_LEVEL};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument, warn};

use super::messages;
use super::session::{Generation, Session};
use crate::error::{GameError, GenerationError, ProgressStoreError};
use crate::narration::{NarrationPacing, NarrationQueue};
use crate::progress_store::ProgressStore;
use crate::question_source::QuestionSource;

//
// ─── REQUESTS AND OUTCOMES ─────────────────────────────────────────────────────
//

/// A question the engine is waiting for. Turn it into a future with
/// `GameEngine::fetch` and hand the result back to `GameEngine::resolve`.
#[derive(Debug)]
pub struct FetchTicket {
    generation: Generation,
    prompt_context: String,
}

impl FetchTicket {
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn prompt_context(&self) -> &str {
        &self.prompt_context
    }
}

/// Result of a question request, still tagged with the generation it was issued for.
#[derive(Debug)]
pub struct FetchOutcome {
    generation: Generation,
    result: Result<Question, GenerationError>,
}

impl FetchOutcome {
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

#[derive(Debug)]
pub enum StartOutcome {
    /// The level is beyond the unlocked frontier; nothing changed.
    Locked,
    Loading(FetchTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// No question was answerable.
    Ignored,
    Correct,
    Incorrect,
    LevelComplete { unlocked: Option<LevelId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The question is on screen. `fallback` is set when the source failed.
    Presented { fallback: bool },
    /// The session moved on before the result arrived; it was dropped.
    Stale,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Drives one level at a time: question requests, answer checking, unlocks and
/// narration.
///
/// The engine is a plain state machine; it never awaits a question itself
/// (except in `load_question`). Callers run the future from `fetch` wherever they
/// like and feed the outcome back through `resolve`, which drops anything issued
/// for an older generation.
pub struct GameEngine {
    catalog: Arc<LevelCatalog>,
    progress: Arc<ProgressStore>,
    source: Arc<dyn QuestionSource>,
    fallback: FallbackPool,
    narration: NarrationQueue,
    pacing: NarrationPacing,
    rng: StdRng,
    session: Option<Session>,
    generation: Generation,
}

impl GameEngine {
    #[must_use]
    pub fn new(
        catalog: Arc<LevelCatalog>,
        progress: Arc<ProgressStore>,
        source: Arc<dyn QuestionSource>,
        narration: NarrationQueue,
    ) -> Self {
        Self {
            catalog,
            progress,
            source,
            fallback: FallbackPool::builtin(),
            narration,
            pacing: NarrationPacing::default(),
            rng: StdRng::from_os_rng(),
            session: None,
            generation: Generation::default(),
        }
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: NarrationPacing) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn with_fallback_pool(mut self, fallback: FallbackPool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Make fallback selection reproducible.
    #[must_use]
    pub fn with_fallback_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn progress_store(&self) -> &Arc<ProgressStore> {
        &self.progress
    }

    /// Current session as the presentation layer should see it.
    #[must_use]
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(Session::snapshot)
    }

    #[must_use]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Begin `id` at question 1, replacing any running session.
    ///
    /// A locked level is refused with a spoken hint and leaves everything as it was.
    ///
    /// # Errors
    ///
    /// Returns `GameError::UnknownLevel` if `id` is not in the catalog.
    #[instrument(skip(self), fields(level = %id))]
    pub async fn start_level(&mut self, id: LevelId) -> Result<StartOutcome, GameError> {
        let level = self
            .catalog
            .level_by_id(id)
            .cloned()
            .ok_or(GameError::UnknownLevel(id))?;

        let progress = self.progress.current().await;
        if progress.is_locked(id) {
            info!(max_unlocked = %progress.max_unlocked(), "level is locked");
            self.narration.speak(messages::LOCKED);
            return Ok(StartOutcome::Locked);
        }

        self.generation = self.generation.next();
        let ticket = FetchTicket {
            generation: self.generation,
            prompt_context: level.prompt_context().to_string(),
        };
        self.narration
            .speak(&messages::level_intro(&level, QUESTIONS_PER_LEVEL));
        self.session = Some(Session::start(level, self.generation));
        info!("level started");

        Ok(StartOutcome::Loading(ticket))
    }

    /// Future that asks the question source for `ticket`. It borrows nothing from
    /// the engine, so it can run on another task.
    pub fn fetch(&self, ticket: FetchTicket) -> impl Future<Output = FetchOutcome> + Send + 'static {
        let source = Arc::clone(&self.source);
        async move {
            let result = source.fetch(&ticket.prompt_context).await;
            FetchOutcome {
                generation: ticket.generation,
                result,
            }
        }
    }

    /// Apply a finished request: show the question (or a fallback when the
    /// source failed) and read it aloud. Results for an older generation are
    /// dropped without touching the session.
    #[instrument(skip_all, fields(generation = outcome.generation.value()))]
    pub fn resolve(&mut self, outcome: FetchOutcome) -> Resolution {
        let current = self
            .session
            .as_ref()
            .is_some_and(|session| session.is_waiting_for(outcome.generation));
        if !current {
            debug!("stale question discarded");
            if self.session.is_none() {
                self.narration.cancel_all();
            }
            return Resolution::Stale;
        }

        let (question, fallback) = match outcome.result {
            Ok(question) => (question, false),
            Err(err) => {
                warn!(%err, "question source failed, serving a fallback");
                (self.pick_fallback(), true)
            }
        };

        let batch = self.pacing.question_batch(&question);
        if let Some(session) = self.session.as_mut() {
            session.present(question);
        }
        self.narration.enqueue_batch(batch);

        Resolution::Presented { fallback }
    }

    /// `fetch` and `resolve` in one step.
    pub async fn load_question(&mut self, ticket: FetchTicket) -> Resolution {
        let outcome = self.fetch(ticket).await;
        self.resolve(outcome)
    }

    /// Check `option` against the current question.
    ///
    /// Ignored unless a question is waiting for an answer. A correct answer on the
    /// last question completes the level, unlocking the next one when this level
    /// is the frontier.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Progress` if unlocking would move progress backwards.
    /// A failure to persist the unlock is logged and the level completes without it.
    #[instrument(skip(self))]
    pub async fn submit_answer(&mut self, option: &str) -> Result<AnswerOutcome, GameError> {
        let Some(session) = self.session.as_mut() else {
            debug!("no active session");
            return Ok(AnswerOutcome::Ignored);
        };
        if !session.status.accepts_answers() {
            debug!(status = ?session.status, "answer ignored");
            return Ok(AnswerOutcome::Ignored);
        }
        let Some(question) = session.question.as_ref() else {
            return Ok(AnswerOutcome::Ignored);
        };

        if !question.is_correct(option) {
            session.status = SessionStatus::Incorrect;
            session.feedback = messages::RETRY_FEEDBACK.to_string();
            self.narration.speak(messages::RETRY_SPOKEN);
            return Ok(AnswerOutcome::Incorrect);
        }

        if !session.index.is_last(QUESTIONS_PER_LEVEL) {
            let (feedback, spoken) = messages::correct(question.explanation());
            session.status = SessionStatus::Correct;
            session.feedback = feedback;
            self.narration.speak(&spoken);
            return Ok(AnswerOutcome::Correct);
        }

        let completed = session.level.id();
        session.status = SessionStatus::LevelComplete;
        session.feedback = messages::LEVEL_COMPLETE.to_string();

        let unlocked = self.unlock_after(completed).await?;
        let spoken = match unlocked {
            Some(next) => {
                if let Some(session) = self.session.as_mut() {
                    session.feedback = messages::LEVEL_COMPLETE_UNLOCKED.to_string();
                }
                messages::level_unlocked_spoken(QUESTIONS_PER_LEVEL, next)
            }
            None => messages::LEVEL_COMPLETE_SPOKEN.to_string(),
        };
        self.narration.speak(&spoken);
        info!(level = %completed, ?unlocked, "level complete");

        Ok(AnswerOutcome::LevelComplete { unlocked })
    }

    /// Move from a correct answer to the next question. Returns `None` (and
    /// changes nothing) unless the current question was answered correctly and
    /// is not the last one.
    pub fn advance_question(&mut self) -> Option<FetchTicket> {
        let session = self.session.as_mut()?;
        if session.status != SessionStatus::Correct {
            debug!(status = ?session.status, "advance ignored");
            return None;
        }
        let next = session.index.next(QUESTIONS_PER_LEVEL)?;

        self.generation = self.generation.next();
        session.begin_loading(next, self.generation);
        self.narration.speak(&messages::next_activity(next));

        Some(FetchTicket {
            generation: self.generation,
            prompt_context: session.level.prompt_context().to_string(),
        })
    }

    /// Leave the game: drop the session and silence narration. Pending
    /// question requests become stale.
    pub fn end_session(&mut self) {
        if self.session.take().is_some() {
            debug!("session ended");
        }
        self.generation = self.generation.next();
        self.narration.cancel_all();
    }

    /// Read the current question and its options again. Returns `false` when no
    /// question is on screen or the answer has already been accepted.
    pub fn repeat_question(&self) -> bool {
        let question = self
            .session
            .as_ref()
            .filter(|session| session.status.accepts_answers())
            .and_then(|session| session.question.as_ref());
        let Some(question) = question else {
            return false;
        };
        self.narration
            .enqueue_batch(self.pacing.question_batch(question));
        true
    }

    /// Back to level 1. A running session keeps going; its completion is judged
    /// against the reset progress.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Progress` if the reset cannot be persisted.
    pub async fn reset_progress(&self) -> Result<Progress, GameError> {
        let progress = self.progress.reset().await?;
        self.narration.speak(messages::PROGRESS_RESET);
        Ok(progress)
    }

    async fn unlock_after(&self, completed: LevelId) -> Result<Option<LevelId>, GameError> {
        let progress = self.progress.current().await;
        if !progress.is_frontier(completed) {
            return Ok(None);
        }
        let Some(next) = self.catalog.next(completed).map(Level::id) else {
            return Ok(None);
        };

        match self.progress.advance_to(next).await {
            Ok(_) => Ok(Some(next)),
            Err(ProgressStoreError::Storage(err)) => {
                warn!(%err, "unlock could not be saved");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn pick_fallback(&mut self) -> Question {
        let index = self.rng.random_range(0..self.fallback.len());
        self.fallback.get(index).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use literacy_core::Clock;
    use literacy_core::model::QuestionDraft;
    use literacy_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    struct FixedSource;

    #[async_trait]
    impl QuestionSource for FixedSource {
        async fn fetch(&self, _prompt_context: &str) -> Result<Question, GenerationError> {
            Ok(QuestionDraft::new("Qual é a primeira letra de BOLA?", ["B", "O", "L"], "B", "")
                .validate()?)
        }
    }

    fn engine() -> GameEngine {
        let progress = ProgressStore::new(
            Clock::fixed(fixed_now()),
            Arc::new(InMemoryRepository::new()),
        );
        GameEngine::new(
            Arc::new(LevelCatalog::builtin()),
            Arc::new(progress),
            Arc::new(FixedSource),
            NarrationQueue::silent(),
        )
    }

    #[tokio::test]
    async fn generations_increase_with_every_request() {
        let mut engine = engine();
        let StartOutcome::Loading(first) = engine.start_level(LevelId::FIRST).await.unwrap() else {
            panic!("level 1 is always unlocked");
        };
        engine.load_question(first).await;
        engine.submit_answer("B").await.unwrap();
        let second = engine.advance_question().unwrap();
        assert!(second.generation() > Generation::default().next());
        assert!(second.prompt_context().contains("Alfabeto"));
    }

    #[tokio::test]
    async fn unknown_level_is_an_error() {
        let mut engine = engine();
        let err = engine.start_level(LevelId::new(42).unwrap()).await.unwrap_err();
        assert!(matches!(err, GameError::UnknownLevel(_)));
        assert!(!engine.has_session());
    }

    #[tokio::test]
    async fn advance_is_ignored_outside_correct() {
        let mut engine = engine();
        assert!(engine.advance_question().is_none());

        let StartOutcome::Loading(ticket) = engine.start_level(LevelId::FIRST).await.unwrap() else {
            panic!("level 1 is always unlocked");
        };
        assert!(engine.advance_question().is_none());
        engine.load_question(ticket).await;
        assert!(engine.advance_question().is_none());
        engine.submit_answer("O").await.unwrap();
        assert!(engine.advance_question().is_none());
    }

    #[tokio::test]
    async fn repeat_needs_an_answerable_question() {
        let mut engine = engine();
        assert!(!engine.repeat_question());
        let StartOutcome::Loading(ticket) = engine.start_level(LevelId::FIRST).await.unwrap() else {
            panic!("level 1 is always unlocked");
        };
        assert!(!engine.repeat_question());
        engine.load_question(ticket).await;
        assert!(engine.repeat_question());
        engine.submit_answer("B").await.unwrap();
        assert!(!engine.repeat_question());
    }
}
