#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod game;
pub mod narration;
pub mod progress_store;
pub mod question_source;

pub use literacy_core::Clock;

pub use app_services::AppServices;
pub use error::{
    AppServicesError, GameError, GameHandleError, GenerationError, ProgressStoreError, SpeechError,
};
pub use game::{
    AnswerOutcome, FetchOutcome, FetchTicket, GameCommand, GameEngine, GameHandle, Resolution,
    StartOutcome,
};
pub use narration::{NarrationPacing, NarrationQueue, SpeechSynthesizer, Utterance};
pub use progress_store::ProgressStore;
pub use question_source::{HttpQuestionSource, QuestionSource, QuestionSourceConfig};
