//! Error types for trak
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad arguments, rejected mutation, empty history)
//! - 4: Operation failed (I/O, serialization, internal invariant breach)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the trak CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for trak operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("An equal task already exists: {0}")]
    DuplicateTask(String),

    #[error("Date is already past: {0}")]
    DateExpired(String),

    #[error("No task at position {position} in {view}")]
    InvalidIndex { view: String, position: usize },

    #[error("No task named '{name}' in {view}")]
    NameNotFound { view: String, name: String },

    #[error("Task is already archived: {0}")]
    AlreadyArchived(String),

    #[error("Tasks in {0} cannot be edited")]
    InvalidTab(String),

    #[error("Search phrase is empty")]
    SearchEmpty,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Operation failures (exit code 4)
    //
    // TagNotFound signals a broken reference count inside the core, not bad
    // user input; it is surfaced as an operation failure so bugs stay loud.
    #[error("Tag registry has no entry for '{0}'")]
    TagNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Save directory is not usable: {0}")]
    SaveDirUnusable(PathBuf),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::DuplicateTask(_)
            | Error::DateExpired(_)
            | Error::InvalidIndex { .. }
            | Error::NameNotFound { .. }
            | Error::AlreadyArchived(_)
            | Error::InvalidTab(_)
            | Error::SearchEmpty
            | Error::NothingToUndo
            | Error::NothingToRedo
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            // Operation failures
            Error::TagNotFound(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::SaveDirUnusable(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Short machine-readable kind tag, used in feedback and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::DuplicateTask(_) => "duplicate_task",
            Error::DateExpired(_) => "date_expired",
            Error::InvalidIndex { .. } => "invalid_index",
            Error::NameNotFound { .. } => "name_not_found",
            Error::AlreadyArchived(_) => "already_archived",
            Error::InvalidTab(_) => "invalid_tab",
            Error::SearchEmpty => "search_empty",
            Error::NothingToUndo => "nothing_to_undo",
            Error::NothingToRedo => "nothing_to_redo",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::InvalidConfig(_) => "invalid_config",
            Error::TagNotFound(_) => "tag_not_found",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::TomlParse(_) => "toml_parse",
            Error::TomlSerialize(_) => "toml_serialize",
            Error::SaveDirUnusable(_) => "save_dir_unusable",
        }
    }
}

/// Result type alias for trak operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub kind: &'static str,
    pub code: i32,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            kind: err.kind(),
            code: err.exit_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_map_to_exit_code_2() {
        assert_eq!(
            Error::DuplicateTask("Buy milk".to_string()).exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(
            Error::InvalidIndex {
                view: "pending".to_string(),
                position: 9,
            }
            .exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(Error::NothingToUndo.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn internal_errors_map_to_exit_code_4() {
        assert_eq!(
            Error::TagNotFound("errand".to_string()).exit_code(),
            exit_codes::OPERATION_FAILED
        );
    }

    #[test]
    fn json_error_carries_kind_and_code() {
        let json = JsonError::from(&Error::SearchEmpty);
        assert_eq!(json.kind, "search_empty");
        assert_eq!(json.code, exit_codes::USER_ERROR);
    }
}
