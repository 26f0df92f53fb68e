use literacy_core::model::{LevelId, SessionSnapshot};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::engine::{FetchTicket, GameEngine, StartOutcome};
use crate::error::GameHandleError;

const COMMAND_BUFFER: usize = 32;

/// Requests the presentation layer can make of a running game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    StartLevel(LevelId),
    SubmitAnswer(String),
    AdvanceQuestion,
    RepeatQuestion,
    EndSession,
    ResetProgress,
}

/// Cloneable front for a `GameEngine` running on its own task.
///
/// Commands are applied in the order they are sent. Question requests run on
/// separate tasks, so the engine keeps taking commands while one is in flight.
/// Every change is published as a fresh snapshot.
#[derive(Clone)]
pub struct GameHandle {
    commands: mpsc::Sender<GameCommand>,
    snapshots: watch::Receiver<Option<SessionSnapshot>>,
}

impl GameHandle {
    /// Move `engine` onto a new task. Must be called inside a Tokio runtime.
    ///
    /// The task ends once every handle has been dropped.
    pub fn spawn(engine: GameEngine) -> (Self, JoinHandle<()>) {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshots_tx, snapshots) = watch::channel(engine.snapshot());
        let task = tokio::spawn(run(engine, rx, snapshots_tx));
        (
            Self {
                commands,
                snapshots,
            },
            task,
        )
    }

    /// # Errors
    ///
    /// Returns `GameHandleError::Closed` if the engine task has stopped.
    pub async fn send(&self, command: GameCommand) -> Result<(), GameHandleError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| GameHandleError::Closed)
    }

    /// # Errors
    ///
    /// Returns `GameHandleError::Closed` if the engine task has stopped.
    pub async fn start_level(&self, level: LevelId) -> Result<(), GameHandleError> {
        self.send(GameCommand::StartLevel(level)).await
    }

    /// # Errors
    ///
    /// Returns `GameHandleError::Closed` if the engine task has stopped.
    pub async fn submit_answer(&self, option: impl Into<String>) -> Result<(), GameHandleError> {
        self.send(GameCommand::SubmitAnswer(option.into())).await
    }

    /// # Errors
    ///
    /// Returns `GameHandleError::Closed` if the engine task has stopped.
    pub async fn advance_question(&self) -> Result<(), GameHandleError> {
        self.send(GameCommand::AdvanceQuestion).await
    }

    /// # Errors
    ///
    /// Returns `GameHandleError::Closed` if the engine task has stopped.
    pub async fn repeat_question(&self) -> Result<(), GameHandleError> {
        self.send(GameCommand::RepeatQuestion).await
    }

    /// # Errors
    ///
    /// Returns `GameHandleError::Closed` if the engine task has stopped.
    pub async fn end_session(&self) -> Result<(), GameHandleError> {
        self.send(GameCommand::EndSession).await
    }

    /// # Errors
    ///
    /// Returns `GameHandleError::Closed` if the engine task has stopped.
    pub async fn reset_progress(&self) -> Result<(), GameHandleError> {
        self.send(GameCommand::ResetProgress).await
    }

    /// Latest published snapshot; `None` when no level is being played.
    #[must_use]
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionSnapshot>> {
        self.snapshots.clone()
    }
}

async fn run(
    mut engine: GameEngine,
    mut commands: mpsc::Receiver<GameCommand>,
    snapshots: watch::Sender<Option<SessionSnapshot>>,
) {
    let (fetched_tx, mut fetched) = mpsc::unbounded_channel();

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                if let Some(ticket) = apply(&mut engine, command).await {
                    let request = engine.fetch(ticket);
                    let fetched_tx = fetched_tx.clone();
                    tokio::spawn(async move {
                        // The receiver only goes away when the engine stops.
                        let _ = fetched_tx.send(request.await);
                    });
                }
            }
            Some(outcome) = fetched.recv() => {
                engine.resolve(outcome);
            }
        }
        snapshots.send_replace(engine.snapshot());
    }

    debug!("all game handles dropped, stopping engine");
    engine.end_session();
    snapshots.send_replace(None);
}

async fn apply(engine: &mut GameEngine, command: GameCommand) -> Option<FetchTicket> {
    match command {
        GameCommand::StartLevel(level) => match engine.start_level(level).await {
            Ok(StartOutcome::Loading(ticket)) => Some(ticket),
            Ok(StartOutcome::Locked) => None,
            Err(err) => {
                error!(%err, "could not start level");
                None
            }
        },
        GameCommand::SubmitAnswer(option) => {
            if let Err(err) = engine.submit_answer(&option).await {
                error!(%err, "answer could not be recorded");
            }
            None
        }
        GameCommand::AdvanceQuestion => engine.advance_question(),
        GameCommand::RepeatQuestion => {
            engine.repeat_question();
            None
        }
        GameCommand::EndSession => {
            engine.end_session();
            None
        }
        GameCommand::ResetProgress => {
            if let Err(err) = engine.reset_progress().await {
                error!(%err, "progress reset failed");
            }
            None
        }
    }
}
