//! Task entities for trak.
//!
//! A task is identified by value: two tasks are equal when their names and
//! schedules (including every date field) match. Tags and priority are
//! attributes, not identity. Stored tasks are immutable; an update replaces
//! the task rather than mutating it in place.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 3;

fn default_priority() -> u8 {
    MIN_PRIORITY
}

/// Schedule variant carried by a task.
///
/// Each variant carries only the date fields that exist for it, so invalid
/// combinations (a floating task with a due date) cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    Floating,
    Deadline {
        due: DateTime<Utc>,
    },
    Event {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl TaskKind {
    /// Short label used in listings and messages.
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Floating => "floating",
            TaskKind::Deadline { .. } => "deadline",
            TaskKind::Event { .. } => "event",
        }
    }

    /// Earliest instant the task becomes relevant; sort key for timed tasks.
    pub fn sort_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            TaskKind::Floating => None,
            TaskKind::Deadline { due } => Some(*due),
            TaskKind::Event { start, .. } => Some(*start),
        }
    }

    /// Instant after which the task counts as expired. Floating tasks never
    /// expire; an event expires when its end has passed.
    pub fn expiry_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            TaskKind::Floating => None,
            TaskKind::Deadline { due } => Some(*due),
            TaskKind::Event { end, .. } => Some(*end),
        }
    }
}

/// A single tracked task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub kind: TaskKind,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

impl Task {
    pub fn floating(name: impl Into<String>) -> Self {
        Self::new(name, TaskKind::Floating)
    }

    pub fn deadline(name: impl Into<String>, due: DateTime<Utc>) -> Self {
        Self::new(name, TaskKind::Deadline { due })
    }

    pub fn event(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(name, TaskKind::Event { start, end })
    }

    pub fn new(name: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            name: name.into(),
            kind,
            tags: BTreeSet::new(),
            priority: default_priority(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Check structural validity: non-blank name, priority in range, event
    /// window ordered. Date-vs-now checks live in the store, which receives
    /// `now` from the caller.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "task name cannot be empty".to_string(),
            ));
        }
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&self.priority) {
            return Err(Error::InvalidArgument(format!(
                "priority must be {}-{}, got {}",
                MIN_PRIORITY, MAX_PRIORITY, self.priority
            )));
        }
        if let TaskKind::Event { start, end } = &self.kind {
            if end < start {
                return Err(Error::InvalidArgument(format!(
                    "event ends before it starts: {} > {}",
                    format_instant(*start),
                    format_instant(*end)
                )));
            }
        }
        Ok(())
    }

    /// Whether the task's relevant date lies strictly before `now`.
    /// A date equal to `now` is not yet expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.kind.expiry_instant() {
            Some(instant) => instant < now,
            None => false,
        }
    }

    /// Calendar-week membership relative to `now` (ISO week, Monday-based).
    /// An event also counts while `now` lies inside its window.
    pub fn in_this_week(&self, now: DateTime<Utc>) -> bool {
        match &self.kind {
            TaskKind::Floating => false,
            TaskKind::Deadline { due } => same_iso_week(*due, now),
            TaskKind::Event { start, end } => {
                same_iso_week(*start, now)
                    || same_iso_week(*end, now)
                    || (*start <= now && now <= *end)
            }
        }
    }
}

/// Identity by value: name plus schedule, with tags and priority excluded.
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for Task {}

impl Task {
    /// Field-by-field comparison, unlike `==` which is identity only. Used
    /// where two states must match exactly (snapshot equality).
    pub fn same_record(&self, other: &Self) -> bool {
        self == other && self.tags == other.tags && self.priority == other.priority
    }
}

/// One user-requested modification, applied to a copy of the task during an
/// update. The store validates the modified copy before committing it.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskChange {
    Rename(String),
    Reschedule(TaskKind),
    RenameAndReschedule(String, TaskKind),
    Reprioritize(u8),
}

impl TaskChange {
    pub fn apply(&self, task: &mut Task) {
        match self {
            TaskChange::Rename(name) => task.name = name.clone(),
            TaskChange::Reschedule(kind) => task.kind = kind.clone(),
            TaskChange::RenameAndReschedule(name, kind) => {
                task.name = name.clone();
                task.kind = kind.clone();
            }
            TaskChange::Reprioritize(priority) => task.priority = *priority,
        }
    }
}

fn same_iso_week(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.iso_week() == b.iso_week()
}

/// Presentation order: priority descending, timed kinds before floating,
/// timed ties by earliest relevant instant, then name. Computed wherever a
/// view is shown; never stored.
pub fn presentation_cmp(a: &Task, b: &Task) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| kind_rank(&a.kind).cmp(&kind_rank(&b.kind)))
        .then_with(|| match (a.kind.sort_instant(), b.kind.sort_instant()) {
            (Some(left), Some(right)) => left.cmp(&right),
            _ => Ordering::Equal,
        })
        .then_with(|| a.name.cmp(&b.name))
}

fn kind_rank(kind: &TaskKind) -> u8 {
    match kind {
        TaskKind::Event { .. } | TaskKind::Deadline { .. } => 0,
        TaskKind::Floating => 1,
    }
}

/// Render an instant the way listings and error messages show dates.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M").to_string()
}
