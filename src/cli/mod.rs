//! Command-line interface for trak
//!
//! This module defines the CLI structure using clap derive macros. Each
//! subcommand builds a structured instruction and runs it through the
//! session orchestrator; `session` keeps one orchestrator alive for
//! undo/redo.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::output::OutputOptions;
use crate::storage::FileStorage;

mod session;
mod task;

pub use task::{AddArgs, SelectArgs, UpdateArgs};

/// trak - Personal task tracking
///
/// Tasks live in synchronized views (pending, expired, this-week, by-type,
/// completed, search results); every mutation keeps them consistent, and an
/// interactive session supports undo/redo.
#[derive(Parser, Debug)]
#[command(name = "trak")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, env = "TRAK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the task list files
    #[arg(long, global = true, env = "TRAK_SAVE_DIR")]
    pub save_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task (floating unless --due or --start/--end is given)
    Add(AddArgs),

    /// Show a view
    List {
        /// View to show: this-week, pending, expired, general, deadline,
        /// event, completed, action
        view: Option<String>,
    },

    /// Delete a task
    Delete(SelectArgs),

    /// Mark a task done (moves it to completed)
    Done(SelectArgs),

    /// Update a pending task
    Update(UpdateArgs),

    /// Search pending and expired task names (case-insensitive substring)
    Search {
        /// Words of the search phrase
        #[arg(required = true)]
        phrase: Vec<String>,
    },

    /// Remove every task and tag
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },

    /// Switch the save directory, reload from it, and remember it in the
    /// configuration
    SaveDir {
        /// Directory to keep the task files in
        dir: PathBuf,
    },

    /// Interactive session (undo/redo live here)
    Session,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let save_dir = config.resolve_save_dir(self.save_dir.clone())?;
        let storage = FileStorage::new(save_dir);
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Session => session::run(storage, &config, options),
            command => task::run_one_shot(command, storage, &config, self.config, options),
        }
    }
}
