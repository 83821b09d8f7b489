//! Shared output formatting for trak CLI commands.

use serde::Serialize;

use crate::error::{Error, JsonError, Result};
use crate::logic::{Feedback, FeedbackError};
use crate::store::{ViewId, ViewSet};
use crate::task::{format_instant, Task, TaskKind};

pub const SCHEMA_VERSION: &str = "trak.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Emit the outcome of one instruction. JSON mode prints a schema-versioned
/// envelope with the full view set; human mode prints the summary line (or
/// the error to stderr).
pub fn emit_feedback(options: OutputOptions, feedback: &Feedback) -> Result<()> {
    if options.json {
        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            message: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a FeedbackError>,
            views: serde_json::Value,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command: &feedback.echo,
            status: if feedback.is_ok() { "success" } else { "error" },
            message: if feedback.message.is_empty() {
                None
            } else {
                Some(&feedback.message)
            },
            error: feedback.error.as_ref(),
            views: views_json(&feedback.views),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match &feedback.error {
        Some(error) => eprintln!("error: {}", error.message),
        None => {
            if !options.quiet && !feedback.message.is_empty() {
                println!("{}", feedback.message);
            }
        }
    }
    Ok(())
}

/// Render one view for humans: numbered lines in presentation order.
/// Indexes are 1-based, matching what delete/done/update accept.
pub fn render_view(views: &ViewSet, view: ViewId) -> String {
    let tasks = views.presented(view);
    if tasks.is_empty() {
        return format!("{view}: no tasks");
    }

    let mut lines = vec![format!("{view} ({}):", tasks.len())];
    for (position, task) in tasks.iter().enumerate() {
        lines.push(format!("{:>3}. {}", position + 1, format_task(task)));
    }
    lines.join("\n")
}

fn format_task(task: &Task) -> String {
    let mut parts = vec![task.kind.label().to_string()];
    match &task.kind {
        TaskKind::Floating => {}
        TaskKind::Deadline { due } => parts.push(format!("due {}", format_instant(*due))),
        TaskKind::Event { start, end } => parts.push(format!(
            "{} .. {}",
            format_instant(*start),
            format_instant(*end)
        )),
    }
    parts.push(format!("p{}", task.priority));
    if !task.tags.is_empty() {
        let tags: Vec<String> = task.tags.iter().map(|tag| format!("#{tag}")).collect();
        parts.push(tags.join(" "));
    }
    format!("{}  ({})", task.name, parts.join(", "))
}

fn views_json(views: &ViewSet) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for view in ViewId::ALL {
        let tasks: Vec<Task> = views
            .presented(view)
            .iter()
            .map(|task| task.as_ref().clone())
            .collect();
        map.insert(
            view.name().to_string(),
            serde_json::to_value(tasks).unwrap_or(serde_json::Value::Null),
        );
    }
    serde_json::Value::Object(map)
}

/// Emit a top-level failure (config, storage, argument parsing).
pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    if json {
        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: JsonError,
        }
        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: JsonError::from(err),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        eprintln!("error: {err}");
    }
    Ok(())
}
