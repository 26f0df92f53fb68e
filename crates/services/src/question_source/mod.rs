//! Where exercises come from.

use async_trait::async_trait;
use literacy_core::model::Question;

use crate::error::GenerationError;

mod http;

pub use http::{HttpQuestionSource, QuestionSourceConfig};

/// Produces one question for a level's activity template.
///
/// Implementations may be slow and may fail; callers never treat a failure as
/// terminal.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Generate a question for `prompt_context`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` when no valid question could be produced.
    async fn fetch(&self, prompt_context: &str) -> Result<Question, GenerationError>;
}
