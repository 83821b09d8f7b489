//! Orchestration: structured instructions in, feedback out.
//!
//! The outer layers (CLI, session loop) hand this module already-parsed
//! instructions. Logic builds the matching command, runs it through the
//! executor, snapshots committed state into history, and answers with a
//! feedback value carrying the full view set; on rejection the views are
//! the untouched pre-mutation state. The storage port is injected at
//! construction.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::command::{Command, CommandExecutor};
use crate::error::{Error, Result};
use crate::history::History;
use crate::store::{TaskStore, ViewId, ViewSet};
use crate::storage::{StoredState, TaskStorage};

/// A structured instruction from the outer parsing layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Mutate(Command),
    Undo,
    Redo,
    Synchronise,
    /// The outer parser failed; carries its message for the feedback echo.
    Invalid { message: String },
}

impl Instruction {
    pub fn describe(&self) -> String {
        match self {
            Instruction::Mutate(command) => command.describe(),
            Instruction::Undo => "undo".to_string(),
            Instruction::Redo => "redo".to_string(),
            Instruction::Synchronise => "sync".to_string(),
            Instruction::Invalid { message } => format!("invalid input: {message}"),
        }
    }
}

/// Error description carried by feedback; never fatal to the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackError {
    pub kind: &'static str,
    pub message: String,
    pub code: i32,
}

impl From<&Error> for FeedbackError {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            code: err.exit_code(),
        }
    }
}

/// What the presentation layer receives after every instruction.
#[derive(Debug, Clone)]
pub struct Feedback {
    /// The full eight-view set after the operation (pre-mutation state when
    /// the operation was rejected).
    pub views: ViewSet,
    /// Echo of the instruction that was executed.
    pub echo: String,
    /// Success summary; empty when an error is present.
    pub message: String,
    pub error: Option<FeedbackError>,
}

impl Feedback {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// The session orchestrator: owns the store, its history, and the storage
/// port. One instruction is fully processed before the next is accepted.
pub struct Logic<S: TaskStorage> {
    store: TaskStore,
    history: History,
    storage: S,
}

impl<S: TaskStorage> Logic<S> {
    /// Load persisted state through the port, derive the view set, run the
    /// initial synchronise, and anchor history at the result.
    pub fn load(storage: S, now: DateTime<Utc>) -> Result<Self> {
        let state = storage.load()?;
        let mut store =
            TaskStore::from_loaded(state.pending, state.expired, state.completed, state.tags);
        store.synchronise(now);
        let history = History::new(store.snapshot());
        Ok(Self {
            store,
            history,
            storage,
        })
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Process one instruction to completion and describe the outcome.
    pub fn handle(&mut self, instruction: &Instruction, now: DateTime<Utc>) -> Feedback {
        let echo = instruction.describe();
        match self.dispatch(instruction, now) {
            Ok(message) => {
                tracing::debug!(%echo, "instruction committed");
                Feedback {
                    views: self.store.views().clone(),
                    echo,
                    message,
                    error: None,
                }
            }
            Err(err) => {
                tracing::debug!(%echo, error = %err, "instruction rejected");
                Feedback {
                    views: self.store.views().clone(),
                    echo,
                    message: String::new(),
                    error: Some(FeedbackError::from(&err)),
                }
            }
        }
    }

    fn dispatch(&mut self, instruction: &Instruction, now: DateTime<Utc>) -> Result<String> {
        match instruction {
            Instruction::Mutate(Command::ChangeSaveDirectory { dir }) => {
                self.change_save_directory(dir.clone(), now)?;
                Ok(format!("Now tracking tasks in {}", dir.display()))
            }
            Instruction::Mutate(command) => {
                let message = CommandExecutor::execute(command, &mut self.store, now)?;
                self.history.record(self.store.snapshot());
                Ok(message)
            }
            Instruction::Undo => {
                let snapshot = self.history.undo()?;
                self.store.restore(snapshot);
                Ok("Undid the last change".to_string())
            }
            Instruction::Redo => {
                let snapshot = self.history.redo()?;
                self.store.restore(snapshot);
                Ok("Redid the undone change".to_string())
            }
            Instruction::Synchronise => {
                if self.store.synchronise(now) {
                    self.history.record(self.store.snapshot());
                    Ok("Views synchronised".to_string())
                } else {
                    Ok("Already up to date".to_string())
                }
            }
            Instruction::Invalid { message } => Err(Error::InvalidArgument(message.clone())),
        }
    }

    /// Push the three disk-backed lists and the tag table through the port.
    /// Saving is driven by the caller, never automatic per mutation.
    pub fn save(&self) -> Result<()> {
        self.storage.save(&self.stored_state())
    }

    fn stored_state(&self) -> StoredState {
        let collect = |view: ViewId| {
            self.store
                .views()
                .view(view)
                .iter()
                .map(|task| task.as_ref().clone())
                .collect()
        };
        StoredState {
            pending: collect(ViewId::Pending),
            expired: collect(ViewId::Expired),
            completed: collect(ViewId::Completed),
            tags: self.store.tags().categories(),
        }
    }

    /// Re-point the storage port and replace the whole view set with the
    /// state found there; history restarts from the reloaded state.
    fn change_save_directory(&mut self, dir: PathBuf, now: DateTime<Utc>) -> Result<()> {
        self.storage.set_save_dir(dir)?;
        let state = self.storage.load()?;
        self.store =
            TaskStore::from_loaded(state.pending, state.expired, state.completed, state.tags);
        self.store.synchronise(now);
        self.history.reset(self.store.snapshot());
        Ok(())
    }
}
