mod ids;
mod level;
mod progress;
mod question;
mod session;

pub use ids::{LevelId, ParseIdError};
pub use level::{Level, LevelError};
pub use progress::{LevelState, Progress, ProgressError};
pub use question::{OPTIONS_PER_QUESTION, Question, QuestionDraft, QuestionError};
pub use session::{QuestionIndex, SessionSnapshot, SessionStatus};
