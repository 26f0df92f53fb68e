use thiserror::Error;

use crate::model::{Level, LevelError, LevelId, LevelState, Progress};

/// Fixed number of exercises in every level.
pub const QUESTIONS_PER_LEVEL: u32 = 7;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog must contain at least one level")]
    Empty,

    #[error("level ids must be sequential from 1: expected {expected}, found {found}")]
    NonSequentialId { expected: u32, found: LevelId },

    #[error(transparent)]
    Level(#[from] LevelError),
}

/// A level paired with its derived lock state, for level pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelOverview<'a> {
    pub level: &'a Level,
    pub state: LevelState,
}

/// Ordered, read-only set of levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Build a catalog from levels numbered 1..=n in order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for no levels and `CatalogError::NonSequentialId`
    /// if ids are not exactly 1, 2, 3, ...
    pub fn new(levels: Vec<Level>) -> Result<Self, CatalogError> {
        if levels.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (expected, level) in (1_u32..).zip(&levels) {
            if level.id().value() != expected {
                return Err(CatalogError::NonSequentialId {
                    expected,
                    found: level.id(),
                });
            }
        }
        Ok(Self { levels })
    }

    /// The eight literacy levels, from letters up to short stories.
    #[must_use]
    pub fn builtin() -> Self {
        let levels = (1_u32..)
            .zip(BUILTIN_LEVELS)
            .filter_map(|(id, entry)| {
                let id = LevelId::new(id)?;
                Level::new(
                    id,
                    format!("Nível {id}"),
                    entry.title,
                    entry.description,
                    entry.prompt_context,
                )
                .ok()
            })
            .collect();
        Self { levels }
    }

    #[must_use]
    pub fn level_by_id(&self, id: LevelId) -> Option<&Level> {
        let index = usize::try_from(id.value() - 1).ok()?;
        self.levels.get(index)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.levels.len()
    }

    /// The level after `id`, if any.
    #[must_use]
    pub fn next(&self, id: LevelId) -> Option<&Level> {
        self.level_by_id(id.next()?)
    }

    #[must_use]
    pub fn is_final(&self, id: LevelId) -> bool {
        self.next(id).is_none()
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Every level with its lock state under `progress`.
    #[must_use]
    pub fn overview(&self, progress: Progress) -> Vec<LevelOverview<'_>> {
        self.levels
            .iter()
            .map(|level| LevelOverview {
                level,
                state: progress.level_state(level.id()),
            })
            .collect()
    }

    /// Number of playable levels; progress beyond the catalog does not count.
    #[must_use]
    pub fn unlocked_count(&self, progress: Progress) -> usize {
        self.levels
            .iter()
            .filter(|level| !progress.is_locked(level.id()))
            .count()
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

struct BuiltinLevel {
    title: &'static str,
    description: &'static str,
    prompt_context: &'static str,
}

const BUILTIN_LEVELS: [BuiltinLevel; 8] = [
    BuiltinLevel {
        title: "Alfabeto",
        description: "Caça-Letras Interativo. Identificar a letra inicial.",
        prompt_context: "ATIVIDADE: Nível 1 - Alfabeto.\n\
            PERGUNTA: \"Qual é a primeira letra da palavra [PALAVRA]?\"\n\
            OPÇÕES: 3 letras (1 correta).",
    },
    BuiltinLevel {
        title: "Vogais",
        description: "Bingo Sonoro. Identificar vogais.",
        prompt_context: "ATIVIDADE: Nível 2 - Vogais.\n\
            PERGUNTA: \"Qual vogal falta em: P _ T O (Pato)?\"\n\
            OPÇÕES: 3 vogais.",
    },
    BuiltinLevel {
        title: "Fonemas",
        description: "Sons das palavras.",
        prompt_context: "ATIVIDADE: Nível 3 - Fonemas.\n\
            PERGUNTA: \"Qual palavra começa com o som /som/?\"\n\
            OPÇÕES: 3 palavras.",
    },
    BuiltinLevel {
        title: "Sílabas",
        description: "Contar sílabas.",
        prompt_context: "ATIVIDADE: Nível 4 - Sílabas.\n\
            PERGUNTA: \"Quantas sílabas tem a palavra [PALAVRA]?\"\n\
            OPÇÕES: Números.",
    },
    BuiltinLevel {
        title: "Palavras",
        description: "Ortografia correta.",
        prompt_context: "ATIVIDADE: Nível 5 - Palavras.\n\
            PERGUNTA: \"Qual é a escrita correta?\"\n\
            OPÇÕES: 1 correta, 2 erradas.",
    },
    BuiltinLevel {
        title: "Frases",
        description: "Organizar frases.",
        prompt_context: "ATIVIDADE: Nível 6 - Frases.\n\
            PERGUNTA: \"Qual a ordem certa das palavras?\"\n\
            OPÇÕES: 3 ordens.",
    },
    BuiltinLevel {
        title: "Textos",
        description: "Interpretação rápida.",
        prompt_context: "ATIVIDADE: Nível 7 - Leitura.\n\
            PERGUNTA: Pergunta simples sobre um texto curto.\n\
            OPÇÕES: 3 respostas.",
    },
    BuiltinLevel {
        title: "Histórias",
        description: "Continuar a história.",
        prompt_context: "ATIVIDADE: Nível 8 - Narrativa.\n\
            PERGUNTA: \"O que acontece depois?\"\n\
            OPÇÕES: 3 finais.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: u32) -> LevelId {
        LevelId::new(value).unwrap()
    }

    fn level(value: u32) -> Level {
        Level::new(id(value), format!("Nível {value}"), format!("L{value}"), "", "prompt").unwrap()
    }

    #[test]
    fn builtin_has_eight_ordered_levels() {
        let catalog = LevelCatalog::builtin();
        assert_eq!(catalog.count(), 8);
        for (expected, level) in (1_u32..).zip(catalog.levels()) {
            assert_eq!(level.order(), expected);
            assert_eq!(level.subtitle(), format!("Nível {expected}"));
        }
        assert_eq!(catalog.level_by_id(id(1)).unwrap().title(), "Alfabeto");
        assert_eq!(catalog.level_by_id(id(8)).unwrap().title(), "Histórias");
        assert!(catalog.level_by_id(id(9)).is_none());
    }

    #[test]
    fn next_stops_at_the_final_level() {
        let catalog = LevelCatalog::builtin();
        assert_eq!(catalog.next(id(1)).map(Level::id), Some(id(2)));
        assert!(catalog.next(id(8)).is_none());
        assert!(catalog.is_final(id(8)));
        assert!(!catalog.is_final(id(7)));
    }

    #[test]
    fn rejects_gaps_and_empty_catalogs() {
        assert_eq!(LevelCatalog::new(Vec::new()).unwrap_err(), CatalogError::Empty);
        assert_eq!(
            LevelCatalog::new(vec![level(1), level(3)]).unwrap_err(),
            CatalogError::NonSequentialId {
                expected: 2,
                found: id(3)
            }
        );
        assert!(LevelCatalog::new(vec![level(1), level(2)]).is_ok());
    }

    #[test]
    fn overview_derives_states_from_progress() {
        let catalog = LevelCatalog::builtin();
        let overview = catalog.overview(Progress::new(id(3)));
        let states: Vec<_> = overview.iter().map(|item| item.state).collect();
        assert_eq!(states[..4], [
            LevelState::Completed,
            LevelState::Completed,
            LevelState::Current,
            LevelState::Locked
        ]);
        assert_eq!(catalog.unlocked_count(Progress::new(id(3))), 3);
        assert_eq!(catalog.unlocked_count(Progress::new(id(20))), 8);
    }
}
