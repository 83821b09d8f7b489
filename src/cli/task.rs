//! trak one-shot command handling.
//!
//! Argument structs double as the session-mode grammar; both surfaces build
//! the same structured instructions.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::Args;

use crate::command::Command;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logic::{Feedback, Instruction, Logic};
use crate::output::{emit_feedback, render_view, OutputOptions};
use crate::storage::FileStorage;
use crate::store::ViewId;
use crate::task::{Task, TaskChange, TaskKind};

use super::Commands;

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Task name
    pub name: String,

    /// Due date for a deadline task ("YYYY-MM-DD HH:MM" or "YYYY-MM-DD",
    /// date-only meaning end of day; times are UTC)
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub due: Option<String>,

    /// Event start (same formats as --due)
    #[arg(long, requires = "end")]
    pub start: Option<String>,

    /// Event end (same formats as --due)
    #[arg(long, requires = "start")]
    pub end: Option<String>,

    /// Tag to attach (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Priority 1-3, 3 highest
    #[arg(short, long)]
    pub priority: Option<u8>,
}

impl AddArgs {
    pub(crate) fn instruction(&self, config: &Config) -> Result<Instruction> {
        let kind = match (&self.due, &self.start, &self.end) {
            (Some(due), None, None) => TaskKind::Deadline {
                due: parse_instant(due)?,
            },
            (None, Some(start), Some(end)) => TaskKind::Event {
                start: parse_instant(start)?,
                end: parse_instant(end)?,
            },
            (None, None, None) => TaskKind::Floating,
            _ => {
                return Err(Error::InvalidArgument(
                    "--start and --end must be given together".to_string(),
                ))
            }
        };

        let task = Task::new(self.name.clone(), kind.clone())
            .with_tags(self.tags.iter().map(|tag| tag.trim().to_string()))
            .with_priority(self.priority.unwrap_or(config.default_priority));

        let command = match kind {
            TaskKind::Floating => Command::AddFloating { task },
            TaskKind::Deadline { .. } => Command::AddDeadline { task },
            TaskKind::Event { .. } => Command::AddEvent { task },
        };
        Ok(Instruction::Mutate(command))
    }
}

#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    /// Task to target: a 1-based index into the view, or a task name
    pub target: String,

    /// View to address
    #[arg(long, default_value = "pending")]
    pub view: String,
}

enum Target {
    Index(usize),
    Name(String),
}

impl SelectArgs {
    fn parsed(&self) -> Result<(ViewId, Target)> {
        let view: ViewId = self.view.parse()?;
        let target = match self.target.parse::<usize>() {
            Ok(0) => {
                return Err(Error::InvalidArgument(
                    "indexes start at 1".to_string(),
                ))
            }
            Ok(position) => Target::Index(position - 1),
            Err(_) => Target::Name(self.target.clone()),
        };
        Ok((view, target))
    }

    pub(crate) fn delete_instruction(&self) -> Result<Instruction> {
        let (view, target) = self.parsed()?;
        Ok(Instruction::Mutate(match target {
            Target::Index(index) => Command::DeleteByIndex { view, index },
            Target::Name(name) => Command::DeleteByName { view, name },
        }))
    }

    pub(crate) fn done_instruction(&self) -> Result<Instruction> {
        let (view, target) = self.parsed()?;
        Ok(Instruction::Mutate(match target {
            Target::Index(index) => Command::DoneByIndex { view, index },
            Target::Name(name) => Command::DoneByName { view, name },
        }))
    }
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// New task name
    #[arg(long)]
    pub name: Option<String>,

    /// New due date (turns the task into a deadline)
    #[arg(long, conflicts_with_all = ["start", "end", "floating"])]
    pub due: Option<String>,

    /// New event start (turns the task into an event)
    #[arg(long, requires = "end", conflicts_with = "floating")]
    pub start: Option<String>,

    /// New event end
    #[arg(long, requires = "start", conflicts_with = "floating")]
    pub end: Option<String>,

    /// Drop the schedule (turns the task into a floating one)
    #[arg(long)]
    pub floating: bool,

    /// New priority 1-3; cannot be combined with other changes
    #[arg(short, long)]
    pub priority: Option<u8>,
}

impl UpdateArgs {
    fn schedule(&self) -> Result<Option<TaskKind>> {
        if self.floating {
            return Ok(Some(TaskKind::Floating));
        }
        if let Some(due) = &self.due {
            return Ok(Some(TaskKind::Deadline {
                due: parse_instant(due)?,
            }));
        }
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => Ok(Some(TaskKind::Event {
                start: parse_instant(start)?,
                end: parse_instant(end)?,
            })),
            (None, None) => Ok(None),
            _ => Err(Error::InvalidArgument(
                "--start and --end must be given together".to_string(),
            )),
        }
    }

    pub(crate) fn instruction(&self) -> Result<Instruction> {
        let schedule = self.schedule()?;
        let change = match (&self.name, schedule, self.priority) {
            (_, _, Some(_)) if self.name.is_some() || self.due.is_some() || self.floating || self.start.is_some() => {
                return Err(Error::InvalidArgument(
                    "a priority change cannot be combined with other changes".to_string(),
                ))
            }
            (None, None, Some(priority)) => TaskChange::Reprioritize(priority),
            (Some(name), None, None) => TaskChange::Rename(name.clone()),
            (None, Some(kind), None) => TaskChange::Reschedule(kind),
            (Some(name), Some(kind), None) => {
                TaskChange::RenameAndReschedule(name.clone(), kind)
            }
            (None, None, None) => {
                return Err(Error::InvalidArgument(
                    "nothing to update; pass --name, --due, --start/--end, --floating or --priority"
                        .to_string(),
                ))
            }
            (_, _, Some(_)) => {
                return Err(Error::InvalidArgument(
                    "a priority change cannot be combined with other changes".to_string(),
                ))
            }
        };

        let (view, target) = self.select.parsed()?;
        Ok(Instruction::Mutate(match target {
            Target::Index(index) => Command::UpdateByIndex { view, index, change },
            Target::Name(name) => Command::UpdateByName { view, name, change },
        }))
    }
}

/// Parse "YYYY-MM-DD HH:MM" or "YYYY-MM-DD" (end of day) as UTC.
pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(23, 59, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(Error::InvalidArgument(format!(
        "cannot parse date '{trimmed}'; use YYYY-MM-DD or \"YYYY-MM-DD HH:MM\""
    )))
}

pub(crate) fn search_instruction(phrase: &[String]) -> Instruction {
    Instruction::Mutate(Command::Search {
        phrase: phrase.join(" "),
    })
}

/// Run one subcommand against a freshly loaded state: load, synchronise,
/// execute, save on success.
pub(crate) fn run_one_shot(
    command: Commands,
    storage: FileStorage,
    config: &Config,
    config_path: Option<PathBuf>,
    options: OutputOptions,
) -> Result<()> {
    let now = Utc::now();
    let mut logic = Logic::load(storage, now)?;

    let instruction = match &command {
        Commands::Add(args) => args.instruction(config)?,
        Commands::Delete(args) => args.delete_instruction()?,
        Commands::Done(args) => args.done_instruction()?,
        Commands::Update(args) => args.instruction()?,
        Commands::Search { phrase } => search_instruction(phrase),
        Commands::Clear { yes } => {
            if !*yes {
                return Err(Error::InvalidArgument(
                    "refusing to clear all tasks; pass --yes to confirm".to_string(),
                ));
            }
            Instruction::Mutate(Command::Clear)
        }
        Commands::SaveDir { dir } => Instruction::Mutate(Command::ChangeSaveDirectory {
            dir: dir.clone(),
        }),
        Commands::List { view } => {
            let view: ViewId = view.as_deref().unwrap_or("pending").parse()?;
            if options.json {
                let feedback = Feedback {
                    views: logic.store().views().clone(),
                    echo: format!("list {view}"),
                    message: String::new(),
                    error: None,
                };
                emit_feedback(options, &feedback)?;
            } else {
                println!("{}", render_view(logic.store().views(), view));
            }
            return Ok(());
        }
        Commands::Session => unreachable!("session handled by the caller"),
    };

    let feedback = logic.handle(&instruction, now);
    emit_feedback(options, &feedback)?;

    match feedback.error {
        Some(error) => std::process::exit(error.code),
        None => {
            logic.save()?;
            if let Commands::SaveDir { dir } = &command {
                remember_save_dir(config, config_path, dir.clone())?;
            }
            Ok(())
        }
    }
}

/// Record a switched save directory in the configuration file so later
/// invocations pick it up.
fn remember_save_dir(config: &Config, config_path: Option<PathBuf>, dir: PathBuf) -> Result<()> {
    let path = match config_path.or_else(Config::default_path) {
        Some(path) => path,
        None => {
            tracing::debug!("no config location available; save directory not remembered");
            return Ok(());
        }
    };
    let mut updated = config.clone();
    updated.save_dir = Some(dir);
    updated.save(&path)
}
