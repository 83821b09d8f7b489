//! Interactive session: one orchestrator kept alive across commands, which
//! is where undo/redo operate. Lines are tokenized and parsed through a
//! clap grammar that reuses the one-shot argument structs; anything clap
//! rejects flows through the invalid-instruction path.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;

use crate::command::Command;
use crate::config::Config;
use crate::error::Result;
use crate::logic::{Feedback, Instruction, Logic};
use crate::output::{emit_feedback, render_view, OutputOptions};
use crate::storage::FileStorage;
use crate::store::ViewId;

use super::task::{search_instruction, AddArgs, SelectArgs, UpdateArgs};

/// Grammar for one session line.
#[derive(Parser, Debug)]
#[command(name = "trak", no_binary_name = true, disable_version_flag = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SessionCommand {
    /// Add a task (floating unless --due or --start/--end is given)
    Add(AddArgs),

    /// Show a view
    List { view: Option<String> },

    /// Delete a task
    Delete(SelectArgs),

    /// Mark a task done
    Done(SelectArgs),

    /// Update a pending task
    Update(UpdateArgs),

    /// Search pending and expired task names
    Search {
        #[arg(required = true)]
        phrase: Vec<String>,
    },

    /// Remove every task and tag (undoable)
    Clear,

    /// Switch the save directory and reload from it
    SaveDir { dir: PathBuf },

    /// Undo the last change
    Undo,

    /// Redo the undone change
    Redo,

    /// Re-check expiry and this-week membership
    Sync,

    /// Write the task lists to disk now
    Save,

    /// Save and leave the session
    Quit,
}

pub(crate) fn run(storage: FileStorage, config: &Config, options: OutputOptions) -> Result<()> {
    let mut logic = Logic::load(storage, Utc::now())?;
    let stdin = io::stdin();
    let interactive = stdin.is_terminal() && !options.json;

    if interactive && !options.quiet {
        println!("trak session; 'help' lists commands, 'quit' saves and exits");
    }

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("trak> ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let tokens = tokenize(&line);
        if tokens.is_empty() {
            continue;
        }

        let command = match SessionLine::try_parse_from(tokens) {
            Ok(parsed) => parsed.command,
            Err(err)
                if matches!(
                    err.kind(),
                    clap::error::ErrorKind::DisplayHelp
                        | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) =>
            {
                println!("{err}");
                continue;
            }
            Err(err) => {
                let feedback = logic.handle(
                    &Instruction::Invalid {
                        message: first_line(&err.to_string()),
                    },
                    Utc::now(),
                );
                emit_feedback(options, &feedback)?;
                continue;
            }
        };

        match command {
            SessionCommand::Quit => break,
            SessionCommand::Save => {
                logic.save()?;
                if !options.quiet && !options.json {
                    println!("Saved");
                }
            }
            SessionCommand::List { view } => {
                let view: ViewId = match view.as_deref().unwrap_or("pending").parse() {
                    Ok(view) => view,
                    Err(err) => {
                        let feedback = logic.handle(
                            &Instruction::Invalid {
                                message: err.to_string(),
                            },
                            Utc::now(),
                        );
                        emit_feedback(options, &feedback)?;
                        continue;
                    }
                };
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
            }
            command => {
                let instruction = match build_instruction(command, config) {
                    Ok(instruction) => instruction,
                    Err(err) => Instruction::Invalid {
                        message: err.to_string(),
                    },
                };
                let feedback = logic.handle(&instruction, Utc::now());
                emit_feedback(options, &feedback)?;
            }
        }
    }

    logic.save()?;
    if interactive && !options.quiet {
        println!("Saved; goodbye");
    }
    Ok(())
}

fn build_instruction(command: SessionCommand, config: &Config) -> Result<Instruction> {
    match command {
        SessionCommand::Add(args) => args.instruction(config),
        SessionCommand::Delete(args) => args.delete_instruction(),
        SessionCommand::Done(args) => args.done_instruction(),
        SessionCommand::Update(args) => args.instruction(),
        SessionCommand::Search { phrase } => Ok(search_instruction(&phrase)),
        SessionCommand::Clear => Ok(Instruction::Mutate(Command::Clear)),
        SessionCommand::SaveDir { dir } => {
            Ok(Instruction::Mutate(Command::ChangeSaveDirectory { dir }))
        }
        SessionCommand::Undo => Ok(Instruction::Undo),
        SessionCommand::Redo => Ok(Instruction::Redo),
        SessionCommand::Sync => Ok(Instruction::Synchronise),
        SessionCommand::List { .. } | SessionCommand::Save | SessionCommand::Quit => {
            Err(crate::error::Error::InvalidArgument(
                "session-only command".to_string(),
            ))
        }
    }
}

/// Split a line into tokens, honoring single and double quotes.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

fn first_line(rendered: &str) -> String {
    rendered
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("unrecognised input")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskChange;

    #[test]
    fn tokenize_honors_quotes() {
        assert_eq!(
            tokenize(r#"add "Buy milk" --tag errand"#),
            ["add", "Buy milk", "--tag", "errand"]
        );
        assert_eq!(tokenize("  "), Vec::<String>::new());
        assert_eq!(tokenize("delete 'Buy milk'"), ["delete", "Buy milk"]);
        // An empty quoted token survives as an argument.
        assert_eq!(tokenize(r#"add """#), ["add", ""]);
    }

    #[test]
    fn session_lines_parse_into_commands() {
        let parsed = SessionLine::try_parse_from(["add", "Buy milk", "--tag", "errand"])
            .expect("parse add");
        assert!(matches!(parsed.command, SessionCommand::Add(_)));

        let parsed = SessionLine::try_parse_from(["undo"]).expect("parse undo");
        assert!(matches!(parsed.command, SessionCommand::Undo));

        assert!(SessionLine::try_parse_from(["frobnicate"]).is_err());
    }

    #[test]
    fn update_line_builds_an_update_instruction() {
        let parsed = SessionLine::try_parse_from([
            "update", "1", "--view", "pending", "--name", "Review",
        ])
        .expect("parse update");
        let instruction =
            build_instruction(parsed.command, &Config::default()).expect("instruction");
        assert_eq!(
            instruction,
            Instruction::Mutate(Command::UpdateByIndex {
                view: ViewId::Pending,
                index: 0,
                change: TaskChange::Rename("Review".to_string()),
            })
        );
    }
}
