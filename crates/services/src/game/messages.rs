//! Player-facing text. Everything shown is also spoken.

use literacy_core::model::{Level, LevelId, QuestionIndex};

pub const LOCKED: &str = "Bloqueado. Termine o nível anterior.";
pub const CORRECT: &str = "Correto!";
pub const ENCOURAGEMENT: &str = "Muito bem!";
pub const ENCOURAGEMENT_NEXT: &str = "Muito bem! Vamos para a próxima.";
pub const RETRY_FEEDBACK: &str = "Não foi dessa vez. Tente novamente!";
pub const RETRY_SPOKEN: &str = "Não foi dessa vez. Tente outra opção.";
pub const LEVEL_COMPLETE_UNLOCKED: &str = "Parabéns! Nível Concluído e Próximo Desbloqueado!";
pub const LEVEL_COMPLETE: &str = "Parabéns! Você completou este nível!";
pub const LEVEL_COMPLETE_SPOKEN: &str = "Parabéns! Você completou todas as atividades deste nível!";
pub const PROGRESS_RESET: &str = "Progresso reiniciado.";

pub fn level_intro(level: &Level, questions_per_level: u32) -> String {
    format!(
        "Iniciando {}. Atividade 1 de {questions_per_level}.",
        level.title()
    )
}

pub fn next_activity(index: QuestionIndex) -> String {
    format!("Atividade {index}.")
}

/// Feedback and spoken line for a correct answer that is not the last one.
pub fn correct(explanation: &str) -> (String, String) {
    if explanation.is_empty() {
        (
            ENCOURAGEMENT_NEXT.to_string(),
            format!("{CORRECT} {ENCOURAGEMENT}"),
        )
    } else {
        (explanation.to_string(), format!("{CORRECT} {explanation}"))
    }
}

pub fn level_unlocked_spoken(questions_per_level: u32, unlocked: LevelId) -> String {
    format!(
        "Parabéns! Você completou as {questions_per_level} atividades. Nível {unlocked} desbloqueado!"
    )
}
