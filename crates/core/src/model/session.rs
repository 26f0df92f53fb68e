use std::fmt;

use crate::model::{Level, Question};

/// Where a level run-through currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Waiting for the question source.
    Loading,
    AwaitingAnswer,
    Correct,
    /// Wrong option picked; the same question stays answerable.
    Incorrect,
    /// Last question answered correctly. Terminal for the session.
    LevelComplete,
}

impl SessionStatus {
    /// True when a submitted option is evaluated rather than ignored.
    ///
    /// `Incorrect` keeps the question answerable: a retry goes straight back to
    /// evaluation.
    #[must_use]
    pub fn accepts_answers(self) -> bool {
        matches!(self, Self::AwaitingAnswer | Self::Incorrect)
    }

    /// True while a question is on screen.
    #[must_use]
    pub fn shows_question(self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// 1-based position of the current question within a level.
///
/// Never exceeds the questions-per-level bound it was advanced with.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuestionIndex(u32);

impl QuestionIndex {
    pub const FIRST: QuestionIndex = QuestionIndex(1);

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn is_last(&self, per_level: u32) -> bool {
        self.0 >= per_level
    }

    /// The following index, or `None` when this is already the last question.
    #[must_use]
    pub fn next(&self, per_level: u32) -> Option<Self> {
        if self.is_last(per_level) {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }
}

impl Default for QuestionIndex {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Debug for QuestionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionIndex({})", self.0)
    }
}

impl fmt::Display for QuestionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only view of a session handed to the presentation layer after every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub level: Level,
    pub question_index: QuestionIndex,
    pub questions_per_level: u32,
    pub status: SessionStatus,
    pub question: Option<Question>,
    pub feedback: String,
}

impl SessionSnapshot {
    #[must_use]
    pub fn is_level_complete(&self) -> bool {
        self.status == SessionStatus::LevelComplete
    }

    /// True when the presentation layer should offer a "next question" action.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.status == SessionStatus::Correct && !self.question_index.is_last(self.questions_per_level)
    }
}
