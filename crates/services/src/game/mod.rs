//! The game session engine: one level at a time, seven questions per level.

mod engine;
mod handle;
pub mod messages;
mod session;

pub use engine::{AnswerOutcome, FetchOutcome, FetchTicket, GameEngine, Resolution, StartOutcome};
pub use handle::{GameCommand, GameHandle};
pub use session::Generation;
