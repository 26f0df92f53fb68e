use crate::model::Question;

/// Questions served when the question source fails. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPool {
    questions: Vec<Question>,
}

impl FallbackPool {
    /// Pool over the given questions, or `None` if there are none.
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Option<Self> {
        if questions.is_empty() {
            None
        } else {
            Some(Self { questions })
        }
    }

    /// General-knowledge questions that fit any level.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            questions: vec![
                Question::from_trusted(
                    "O que usamos para cortar papel?",
                    ["Tesoura", "Colher", "Pedra"],
                    "Tesoura",
                    "A tesoura corta.",
                ),
                Question::from_trusted(
                    "Qual destas é uma fruta?",
                    ["Mesa", "Banana", "Carro"],
                    "Banana",
                    "Banana é fruta.",
                ),
                Question::from_trusted(
                    "Qual letra vem depois do A?",
                    ["C", "B", "D"],
                    "B",
                    "A, B, C.",
                ),
            ],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at `index`, wrapping around the pool.
    #[must_use]
    pub fn get(&self, index: usize) -> &Question {
        &self.questions[index % self.questions.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

impl Default for FallbackPool {
    fn default() -> Self {
        Self::builtin()
    }
}
