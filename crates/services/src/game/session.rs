use std::fmt;

use literacy_core::QUESTIONS_PER_LEVEL;
use literacy_core::model::{Level, Question, QuestionIndex, SessionSnapshot, SessionStatus};

/// Tag carried by every question request. A result is only applied if its
/// generation is still the one the session is waiting for.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generation({})", self.0)
    }
}

/// Mutable state of the level being played. Only the engine touches it.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) level: Level,
    pub(crate) index: QuestionIndex,
    pub(crate) status: SessionStatus,
    pub(crate) question: Option<Question>,
    pub(crate) feedback: String,
    pub(crate) generation: Generation,
}

impl Session {
    pub(crate) fn start(level: Level, generation: Generation) -> Self {
        Self {
            level,
            index: QuestionIndex::FIRST,
            status: SessionStatus::Loading,
            question: None,
            feedback: String::new(),
            generation,
        }
    }

    pub(crate) fn begin_loading(&mut self, index: QuestionIndex, generation: Generation) {
        self.index = index;
        self.status = SessionStatus::Loading;
        self.question = None;
        self.feedback.clear();
        self.generation = generation;
    }

    pub(crate) fn present(&mut self, question: Question) {
        self.question = Some(question);
        self.status = SessionStatus::AwaitingAnswer;
        self.feedback.clear();
    }

    pub(crate) fn is_waiting_for(&self, generation: Generation) -> bool {
        self.status == SessionStatus::Loading && self.generation == generation
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            level: self.level.clone(),
            question_index: self.index,
            questions_per_level: QUESTIONS_PER_LEVEL,
            status: self.status,
            question: self.question.clone(),
            feedback: self.feedback.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use literacy_core::LevelCatalog;
    use literacy_core::model::{LevelId, QuestionDraft};

    fn session() -> Session {
        let level = LevelCatalog::builtin()
            .level_by_id(LevelId::FIRST)
            .cloned()
            .unwrap();
        Session::start(level, Generation::default().next())
    }

    #[test]
    fn new_session_is_loading_the_first_question() {
        let session = session();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Loading);
        assert_eq!(snapshot.question_index, QuestionIndex::FIRST);
        assert_eq!(snapshot.questions_per_level, QUESTIONS_PER_LEVEL);
        assert!(snapshot.question.is_none());
    }

    #[test]
    fn only_the_awaited_generation_matches() {
        let mut session = session();
        let first = session.generation;
        assert!(session.is_waiting_for(first));
        assert!(!session.is_waiting_for(first.next()));

        let question = QuestionDraft::new("Q", ["a", "b", "c"], "a", "")
            .validate()
            .unwrap();
        session.present(question);
        assert!(!session.is_waiting_for(first));
        assert_eq!(session.status, SessionStatus::AwaitingAnswer);
    }
}
