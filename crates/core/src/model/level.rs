use thiserror::Error;

use crate::model::ids::LevelId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level title cannot be empty")]
    EmptyTitle,

    #[error("level activity prompt cannot be empty")]
    EmptyPrompt,
}

/// One difficulty stage. Immutable once built; lock state is never stored here,
/// it is derived from `Progress`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    id: LevelId,
    subtitle: String,
    title: String,
    description: String,
    prompt_context: String,
}

impl Level {
    /// Build a level.
    ///
    /// # Errors
    ///
    /// Returns `LevelError` if the title or the activity prompt is blank.
    pub fn new(
        id: LevelId,
        subtitle: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        prompt_context: impl Into<String>,
    ) -> Result<Self, LevelError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(LevelError::EmptyTitle);
        }
        let prompt_context = prompt_context.into().trim().to_string();
        if prompt_context.is_empty() {
            return Err(LevelError::EmptyPrompt);
        }

        Ok(Self {
            id,
            subtitle: subtitle.into(),
            title,
            description: description.into(),
            prompt_context,
        })
    }

    #[must_use]
    pub fn id(&self) -> LevelId {
        self.id
    }

    /// Presentation order; identical to the id.
    #[must_use]
    pub fn order(&self) -> u32 {
        self.id.value()
    }

    #[must_use]
    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Activity template handed to the question source.
    #[must_use]
    pub fn prompt_context(&self) -> &str {
        &self.prompt_context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let err = Level::new(LevelId::FIRST, "Nível 1", "  ", "", "ATIVIDADE").unwrap_err();
        assert_eq!(err, LevelError::EmptyTitle);
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let err = Level::new(LevelId::FIRST, "Nível 1", "Alfabeto", "", "\n  ").unwrap_err();
        assert_eq!(err, LevelError::EmptyPrompt);
    }

    #[test]
    fn order_follows_id() {
        let level = Level::new(LevelId::new(4).unwrap(), "Nível 4", "Sílabas", "", "x").unwrap();
        assert_eq!(level.order(), 4);
    }
}
