//! Command descriptors and their executor.
//!
//! A [`Command`] is an immutable description of one user-requested mutation,
//! carrying exactly the data needed to replay it. The executor is a single
//! exhaustive dispatch into [`TaskStore`]; every invariant check lives in the
//! store, not here.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::store::{TaskStore, ViewId};
use crate::task::{Task, TaskChange};

/// The closed set of store mutations a user can request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddFloating { task: Task },
    AddDeadline { task: Task },
    AddEvent { task: Task },
    DeleteByIndex { view: ViewId, index: usize },
    DeleteByName { view: ViewId, name: String },
    DoneByIndex { view: ViewId, index: usize },
    DoneByName { view: ViewId, name: String },
    UpdateByIndex { view: ViewId, index: usize, change: TaskChange },
    UpdateByName { view: ViewId, name: String, change: TaskChange },
    Search { phrase: String },
    Clear,
    ChangeSaveDirectory { dir: PathBuf },
}

impl Command {
    /// One-line echo of the request, shown back in feedback.
    pub fn describe(&self) -> String {
        match self {
            Command::AddFloating { task } => format!("add floating '{}'", task.name),
            Command::AddDeadline { task } => format!("add deadline '{}'", task.name),
            Command::AddEvent { task } => format!("add event '{}'", task.name),
            Command::DeleteByIndex { view, index } => format!("delete {view} #{index}"),
            Command::DeleteByName { view, name } => format!("delete '{name}' from {view}"),
            Command::DoneByIndex { view, index } => format!("done {view} #{index}"),
            Command::DoneByName { view, name } => format!("done '{name}' in {view}"),
            Command::UpdateByIndex { view, index, .. } => format!("update {view} #{index}"),
            Command::UpdateByName { view, name, .. } => format!("update '{name}' in {view}"),
            Command::Search { phrase } => format!("search '{phrase}'"),
            Command::Clear => "clear".to_string(),
            Command::ChangeSaveDirectory { dir } => {
                format!("change save directory to {}", dir.display())
            }
        }
    }
}

/// Stateless invoker running commands against a store.
pub struct CommandExecutor;

impl CommandExecutor {
    /// Dispatch `command` to the store, returning a short result message for
    /// feedback. Errors from the store propagate untouched; no state change
    /// is observable on failure.
    pub fn execute(
        command: &Command,
        store: &mut TaskStore,
        now: DateTime<Utc>,
    ) -> Result<String> {
        match command {
            Command::AddFloating { task } => {
                store.add_floating(task.clone(), now)?;
                Ok(format!("Added '{}'", task.name))
            }
            Command::AddDeadline { task } => {
                store.add_deadline(task.clone(), now)?;
                Ok(format!("Added '{}'", task.name))
            }
            Command::AddEvent { task } => {
                store.add_event(task.clone(), now)?;
                Ok(format!("Added '{}'", task.name))
            }
            Command::DeleteByIndex { view, index } => {
                let removed = store.delete_by_index(*view, *index)?;
                Ok(format!("Deleted '{}'", removed.name))
            }
            Command::DeleteByName { view, name } => {
                let removed = store.delete_by_name(*view, name)?;
                Ok(format!("Deleted '{}'", removed.name))
            }
            Command::DoneByIndex { view, index } => {
                let archived = store.done_by_index(*view, *index)?;
                Ok(format!("Completed '{}'", archived.name))
            }
            Command::DoneByName { view, name } => {
                let archived = store.done_by_name(*view, name)?;
                Ok(format!("Completed '{}'", archived.name))
            }
            Command::UpdateByIndex { view, index, change } => {
                let updated = store.update_by_index(*view, *index, change, now)?;
                Ok(format!("Updated '{}'", updated.name))
            }
            Command::UpdateByName { view, name, change } => {
                let updated = store.update_by_name(*view, name, change, now)?;
                Ok(format!("Updated '{}'", updated.name))
            }
            Command::Search { phrase } => {
                let found = store.search(phrase)?;
                Ok(match found {
                    0 => format!("No matches for '{}'", phrase.trim()),
                    1 => "1 match".to_string(),
                    n => format!("{n} matches"),
                })
            }
            Command::Clear => {
                store.clear_all();
                Ok("Cleared all tasks".to_string())
            }
            // Needs the storage port, which only the orchestrator holds; a
            // bare store cannot switch directories.
            Command::ChangeSaveDirectory { .. } => Err(Error::InvalidArgument(
                "save directory changes must go through the session".to_string(),
            )),
        }
    }
}
