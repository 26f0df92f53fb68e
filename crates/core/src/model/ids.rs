use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Identifier of a level. Levels are numbered from 1 in presentation order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LevelId(NonZeroU32);

impl LevelId {
    /// The first level; always unlocked.
    pub const FIRST: LevelId = LevelId(NonZeroU32::MIN);

    /// Creates a `LevelId`, or `None` for zero.
    #[must_use]
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    /// Returns the underlying value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0.get()
    }

    /// The id directly after this one.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl Default for LevelId {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Debug for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LevelId({})", self.0)
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<LevelId> for u32 {
    fn from(id: LevelId) -> Self {
        id.value()
    }
}

impl TryFrom<u32> for LevelId {
    type Error = ParseIdError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ParseIdError { kind: "LevelId" })
    }
}

/// Error type for parsing an id from a string or raw integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse a positive {}", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for LevelId {
    type Err = ParseIdError;

    /// Accepts only a positive decimal integer (surrounding whitespace allowed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or(ParseIdError { kind: "LevelId" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_level() {
        assert!(LevelId::new(0).is_none());
        assert_eq!(LevelId::new(1), Some(LevelId::FIRST));
    }

    #[test]
    fn next_increments_by_one() {
        let id = LevelId::new(3).unwrap();
        assert_eq!(id.next(), LevelId::new(4));
        assert_eq!(LevelId::new(u32::MAX).unwrap().next(), None);
    }

    #[test]
    fn from_str_accepts_positive_integers_only() {
        assert_eq!("7".parse::<LevelId>().unwrap().value(), 7);
        assert_eq!(" 2\n".parse::<LevelId>().unwrap().value(), 2);
        assert!("0".parse::<LevelId>().is_err());
        assert!("-3".parse::<LevelId>().is_err());
        assert!("2.5".parse::<LevelId>().is_err());
        assert!("dois".parse::<LevelId>().is_err());
        assert!("".parse::<LevelId>().is_err());
    }

    #[test]
    fn display_matches_value() {
        assert_eq!(LevelId::new(5).unwrap().to_string(), "5");
    }
}
