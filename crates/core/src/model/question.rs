use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every exercise offers exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 3;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("expected {expected} options, got {actual}")]
    OptionCount { expected: usize, actual: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("duplicate option: {0}")]
    DuplicateOption(String),

    #[error("correct answer {0:?} is not one of the options")]
    AnswerNotInOptions(String),
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question, shaped like the generator's JSON output:
///
/// ```json
/// { "question": "...", "options": ["a", "b", "c"], "correctAnswer": "a", "explanation": "..." }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuestionDraft {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
        correct_answer: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_answer: correct_answer.into(),
            explanation: explanation.into(),
        }
    }

    /// Trim every field and check the question invariants.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or an option is empty, the option count is
    /// not `OPTIONS_PER_QUESTION`, options repeat, or the correct answer is not an option.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(QuestionError::OptionCount {
                expected: OPTIONS_PER_QUESTION,
                actual: self.options.len(),
            });
        }

        let mut options: Vec<String> = Vec::with_capacity(OPTIONS_PER_QUESTION);
        for (index, option) in self.options.into_iter().enumerate() {
            let option = option.trim().to_string();
            if option.is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
            if options.contains(&option) {
                return Err(QuestionError::DuplicateOption(option));
            }
            options.push(option);
        }

        let correct_answer = self.correct_answer.trim().to_string();
        if !options.contains(&correct_answer) {
            return Err(QuestionError::AnswerNotInOptions(correct_answer));
        }

        Ok(Question {
            text,
            options,
            correct_answer,
            explanation: self.explanation.trim().to_string(),
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One validated exercise. The correct answer is always one of the options,
/// and option order is presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    correct_answer: String,
    explanation: String,
}

impl Question {
    /// Build from literal parts that already satisfy the invariants.
    pub(crate) fn from_trusted(
        text: &str,
        options: [&str; OPTIONS_PER_QUESTION],
        correct_answer: &str,
        explanation: &str,
    ) -> Self {
        debug_assert!(options.contains(&correct_answer));
        Self {
            text: text.to_string(),
            options: options.iter().map(ToString::to_string).collect(),
            correct_answer: correct_answer.to_string(),
            explanation: explanation.to_string(),
        }
    }

    /// Back to an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> QuestionDraft {
        QuestionDraft {
            text: self.text.clone(),
            options: self.options.clone(),
            correct_answer: self.correct_answer.clone(),
            explanation: self.explanation.clone(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Feedback shown after a correct answer; may be empty.
    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        option == self.correct_answer
    }

    /// Option strings that would be judged wrong, in presentation order.
    pub fn wrong_options(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .map(String::as_str)
            .filter(|option| *option != self.correct_answer)
    }
}
