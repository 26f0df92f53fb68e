use thiserror::Error;

use crate::model::ids::LevelId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("progress can only move forward: unlocked up to {current}, requested {requested}")]
    InvariantViolation { current: LevelId, requested: LevelId },
}

/// How a level looks from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelState {
    /// Below the frontier; replayable, never unlocks anything again.
    Completed,
    /// The frontier level; finishing it unlocks the next one.
    Current,
    Locked,
}

/// Highest unlocked level. Only moves forward, except through an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    max_unlocked: LevelId,
}

impl Progress {
    #[must_use]
    pub fn new(max_unlocked: LevelId) -> Self {
        Self { max_unlocked }
    }

    /// Parse a persisted value, falling back to the first level when it is not a
    /// positive integer.
    #[must_use]
    pub fn from_persisted(raw: &str) -> Self {
        raw.parse::<LevelId>().map(Self::new).unwrap_or_default()
    }

    #[must_use]
    pub fn max_unlocked(&self) -> LevelId {
        self.max_unlocked
    }

    #[must_use]
    pub fn is_locked(&self, level: LevelId) -> bool {
        level > self.max_unlocked
    }

    #[must_use]
    pub fn is_frontier(&self, level: LevelId) -> bool {
        level == self.max_unlocked
    }

    #[must_use]
    pub fn level_state(&self, level: LevelId) -> LevelState {
        if level < self.max_unlocked {
            LevelState::Completed
        } else if level == self.max_unlocked {
            LevelState::Current
        } else {
            LevelState::Locked
        }
    }

    /// Move the frontier forward to `requested`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvariantViolation` if `requested` is not strictly
    /// greater than the current value.
    pub fn advanced_to(self, requested: LevelId) -> Result<Self, ProgressError> {
        if requested <= self.max_unlocked {
            return Err(ProgressError::InvariantViolation {
                current: self.max_unlocked,
                requested,
            });
        }
        Ok(Self::new(requested))
    }

    /// Value written to storage.
    #[must_use]
    pub fn to_persisted(&self) -> String {
        self.max_unlocked.to_string()
    }
}
