//! The synchronized view set and its sole mutator.
//!
//! Eight views over one task collection:
//!
//! ```text
//! this-week(0)  pending tasks whose date falls in the current week
//! pending(1)    every live, non-expired task
//! expired(2)    tasks whose date has passed without completion
//! general(3)    pending floating tasks
//! deadline(4)   pending deadline tasks
//! event(5)      pending event tasks
//! completed(6)  archived via done
//! action(7)     results of the most recent search
//! ```
//!
//! pending/expired/completed are the disk-backed lists; general, deadline
//! and event are derived from pending by kind, this-week from pending by
//! date. Tasks are shared between views as `Arc<Task>` and never mutated in
//! place, so snapshots clone cheaply without aliasing live state.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::tags::{TagCategory, TagRegistry};
use crate::task::{format_instant, presentation_cmp, Task, TaskChange, TaskKind};

/// Shared handle to an immutable stored task.
pub type TaskRef = Arc<Task>;

/// Identifier of one of the eight views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewId {
    ThisWeek,
    Pending,
    Expired,
    General,
    Deadline,
    Event,
    Completed,
    Action,
}

impl ViewId {
    pub const ALL: [ViewId; 8] = [
        ViewId::ThisWeek,
        ViewId::Pending,
        ViewId::Expired,
        ViewId::General,
        ViewId::Deadline,
        ViewId::Event,
        ViewId::Completed,
        ViewId::Action,
    ];

    pub fn index(self) -> usize {
        match self {
            ViewId::ThisWeek => 0,
            ViewId::Pending => 1,
            ViewId::Expired => 2,
            ViewId::General => 3,
            ViewId::Deadline => 4,
            ViewId::Event => 5,
            ViewId::Completed => 6,
            ViewId::Action => 7,
        }
    }

    /// User-facing view name, also the parse form.
    pub fn name(self) -> &'static str {
        match self {
            ViewId::ThisWeek => "this-week",
            ViewId::Pending => "pending",
            ViewId::Expired => "expired",
            ViewId::General => "general",
            ViewId::Deadline => "deadline",
            ViewId::Event => "event",
            ViewId::Completed => "completed",
            ViewId::Action => "action",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewId {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let view = ViewId::ALL
            .into_iter()
            .find(|view| view.name() == raw.trim().to_lowercase());
        view.ok_or_else(|| Error::InvalidArgument(format!("unknown view: {raw}")))
    }
}

/// The eight task lists, index-addressable by [`ViewId`].
#[derive(Debug, Clone)]
pub struct ViewSet {
    lists: [Vec<TaskRef>; 8],
}

/// Deep equality over every field of every task, not just identity, so
/// snapshot comparisons see priority and tag differences too.
impl PartialEq for ViewSet {
    fn eq(&self, other: &Self) -> bool {
        self.lists.iter().zip(&other.lists).all(|(left, right)| {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right)
                    .all(|(a, b)| a.same_record(b))
        })
    }
}

impl Default for ViewSet {
    fn default() -> Self {
        Self {
            lists: std::array::from_fn(|_| Vec::new()),
        }
    }
}

impl ViewSet {
    /// The view's tasks in internal (insertion) order.
    pub fn view(&self, view: ViewId) -> &[TaskRef] {
        &self.lists[view.index()]
    }

    /// The view's tasks in presentation order. This is the order shown to
    /// the user and the order index arguments address.
    pub fn presented(&self, view: ViewId) -> Vec<TaskRef> {
        let mut tasks = self.lists[view.index()].to_vec();
        tasks.sort_by(|a, b| presentation_cmp(a, b));
        tasks
    }

    pub fn len(&self, view: ViewId) -> usize {
        self.lists[view.index()].len()
    }

    pub fn is_empty(&self, view: ViewId) -> bool {
        self.lists[view.index()].is_empty()
    }

    fn push(&mut self, view: ViewId, task: TaskRef) {
        self.lists[view.index()].push(task);
    }

    fn contains(&self, view: ViewId, task: &Task) -> bool {
        self.lists[view.index()].iter().any(|t| t.as_ref() == task)
    }

    fn remove_from(&mut self, view: ViewId, task: &Task) -> bool {
        let list = &mut self.lists[view.index()];
        let before = list.len();
        list.retain(|t| t.as_ref() != task);
        list.len() != before
    }

    fn remove_everywhere(&mut self, task: &Task) {
        for view in ViewId::ALL {
            self.remove_from(view, task);
        }
    }

    fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }

    fn replace(&mut self, view: ViewId, tasks: Vec<TaskRef>) {
        self.lists[view.index()] = tasks;
    }
}

/// Deep, alias-free copy of the whole store state, as recorded by history.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub views: ViewSet,
    pub tags: TagRegistry,
}

/// Owner of the view set and tag registry; the only code that mutates them.
///
/// Every mutation either fully commits with all invariants re-established or
/// fully fails with no observable change. Time-sensitive operations receive
/// `now` from the caller; the store never reads a wall clock.
#[derive(Debug, Default)]
pub struct TaskStore {
    views: ViewSet,
    tags: TagRegistry,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from the three persisted lists plus the tag table.
    /// The derived views are reconstructed here; this-week stays empty until
    /// the caller runs [`TaskStore::synchronise`].
    pub fn from_loaded(
        pending: Vec<Task>,
        expired: Vec<Task>,
        completed: Vec<Task>,
        tags: Vec<TagCategory>,
    ) -> Self {
        let mut views = ViewSet::default();
        for task in pending {
            let task = Arc::new(task);
            views.push(type_view(&task.kind), Arc::clone(&task));
            views.push(ViewId::Pending, task);
        }
        for task in expired {
            views.push(ViewId::Expired, Arc::new(task));
        }
        for task in completed {
            views.push(ViewId::Completed, Arc::new(task));
        }
        Self {
            views,
            tags: TagRegistry::from_categories(tags),
        }
    }

    pub fn views(&self) -> &ViewSet {
        &self.views
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            views: self.views.clone(),
            tags: self.tags.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.views = snapshot.views;
        self.tags = snapshot.tags;
    }

    // =========================================================================
    // Add
    // =========================================================================

    pub fn add_floating(&mut self, task: Task, now: DateTime<Utc>) -> Result<()> {
        self.add_kind_checked(task, TaskKind::Floating.label(), now)
    }

    pub fn add_deadline(&mut self, task: Task, now: DateTime<Utc>) -> Result<()> {
        self.add_kind_checked(task, "deadline", now)
    }

    pub fn add_event(&mut self, task: Task, now: DateTime<Utc>) -> Result<()> {
        self.add_kind_checked(task, "event", now)
    }

    fn add_kind_checked(&mut self, task: Task, expected: &str, now: DateTime<Utc>) -> Result<()> {
        if task.kind.label() != expected {
            return Err(Error::InvalidArgument(format!(
                "expected a {} task, got {}",
                expected,
                task.kind.label()
            )));
        }
        self.add(task, now)
    }

    /// Insert a new task into pending, its type view, and this-week when its
    /// date falls in the current week; register its tags.
    pub fn add(&mut self, task: Task, now: DateTime<Utc>) -> Result<()> {
        task.validate()?;
        if self.find_duplicate(&task, None) {
            return Err(Error::DuplicateTask(task.name.clone()));
        }
        if task.is_expired(now) {
            let instant = task
                .kind
                .expiry_instant()
                .map(format_instant)
                .unwrap_or_default();
            return Err(Error::DateExpired(instant));
        }

        for tag in &task.tags {
            self.tags.add(tag);
        }
        let task = Arc::new(task);
        if task.in_this_week(now) {
            self.views.push(ViewId::ThisWeek, Arc::clone(&task));
        }
        self.views.push(type_view(&task.kind), Arc::clone(&task));
        self.views.push(ViewId::Pending, task);
        Ok(())
    }

    // =========================================================================
    // Delete / done
    // =========================================================================

    /// Remove the task at `index` (presented order) of `view` from every
    /// view, decrementing its tags. Returns the removed task.
    pub fn delete_by_index(&mut self, view: ViewId, index: usize) -> Result<Task> {
        let target = self.resolve_index(view, index)?;
        self.remove_task(&target)
    }

    /// Remove the task named `name` in `view` from every view, decrementing
    /// its tags. Returns the removed task.
    pub fn delete_by_name(&mut self, view: ViewId, name: &str) -> Result<Task> {
        let target = self.resolve_name(view, name)?;
        self.remove_task(&target)
    }

    pub fn done_by_index(&mut self, view: ViewId, index: usize) -> Result<Task> {
        let target = self.resolve_index(view, index)?;
        self.archive(view, &target)
    }

    pub fn done_by_name(&mut self, view: ViewId, name: &str) -> Result<Task> {
        let target = self.resolve_name(view, name)?;
        self.archive(view, &target)
    }

    fn archive(&mut self, view: ViewId, target: &TaskRef) -> Result<Task> {
        if view == ViewId::Completed {
            return Err(Error::AlreadyArchived(target.name.clone()));
        }
        let removed = self.remove_task(target)?;
        self.views.push(ViewId::Completed, Arc::new(removed.clone()));
        Ok(removed)
    }

    fn remove_task(&mut self, target: &TaskRef) -> Result<Task> {
        let live = self.views.contains(ViewId::Pending, target)
            || self.views.contains(ViewId::Expired, target);
        self.views.remove_everywhere(target);
        if live {
            for tag in &target.tags {
                self.tags.remove(tag)?;
            }
        }
        Ok(target.as_ref().clone())
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Replace the task at `index` of `view` with a modified copy, as one
    /// atomic step: the replacement is validated in full before the original
    /// is touched. Only pending tasks are editable. Returns the replacement.
    pub fn update_by_index(
        &mut self,
        view: ViewId,
        index: usize,
        change: &TaskChange,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        self.check_editable_view(view)?;
        let target = self.resolve_index(view, index)?;
        self.replace_task(view, target, change, now)
    }

    /// Replace the task named `name` in `view`; see [`TaskStore::update_by_index`].
    pub fn update_by_name(
        &mut self,
        view: ViewId,
        name: &str,
        change: &TaskChange,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        self.check_editable_view(view)?;
        let target = self.resolve_name(view, name)?;
        self.replace_task(view, target, change, now)
    }

    fn check_editable_view(&self, view: ViewId) -> Result<()> {
        if matches!(view, ViewId::Completed | ViewId::Expired) {
            return Err(Error::InvalidTab(view.name().to_string()));
        }
        Ok(())
    }

    fn replace_task(
        &mut self,
        view: ViewId,
        target: TaskRef,
        change: &TaskChange,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        // An action view can surface expired tasks; only pending ones are
        // editable regardless of how they were addressed.
        if !self.views.contains(ViewId::Pending, &target) {
            return Err(Error::InvalidTab(view.name().to_string()));
        }

        let mut replacement = target.as_ref().clone();
        change.apply(&mut replacement);
        replacement.validate()?;
        if self.find_duplicate(&replacement, Some(&target)) {
            return Err(Error::DuplicateTask(replacement.name.clone()));
        }
        if replacement.is_expired(now) {
            let instant = replacement
                .kind
                .expiry_instant()
                .map(format_instant)
                .unwrap_or_default();
            return Err(Error::DateExpired(instant));
        }

        // All checks passed; commit. Tags carry over unchanged, so the
        // registry is untouched.
        self.views.remove_everywhere(&target);
        let replacement = Arc::new(replacement);
        if replacement.in_this_week(now) {
            self.views.push(ViewId::ThisWeek, Arc::clone(&replacement));
        }
        self.views.push(type_view(&replacement.kind), Arc::clone(&replacement));
        self.views.push(ViewId::Pending, Arc::clone(&replacement));
        Ok(replacement.as_ref().clone())
    }

    // =========================================================================
    // Search / clear / synchronise
    // =========================================================================

    /// Case-insensitive substring search over pending and expired task
    /// names; rebuilds the action view. An empty result is not an error.
    /// Returns the number of matches.
    pub fn search(&mut self, phrase: &str) -> Result<usize> {
        let needle = phrase.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::SearchEmpty);
        }

        let mut matches: Vec<TaskRef> = Vec::new();
        for view in [ViewId::Pending, ViewId::Expired] {
            for task in self.views.view(view) {
                if task.name.to_lowercase().contains(&needle) {
                    matches.push(Arc::clone(task));
                }
            }
        }
        let found = matches.len();
        self.views.replace(ViewId::Action, matches);
        Ok(found)
    }

    /// Empty every view and the tag registry.
    pub fn clear_all(&mut self) {
        self.views.clear();
        self.tags.clear();
    }

    /// Move newly expired pending tasks into expired and rebuild this-week
    /// from pending. Idempotent for a fixed `now`; the only operation that
    /// moves tasks between views without an explicit command. Returns
    /// whether anything changed.
    pub fn synchronise(&mut self, now: DateTime<Utc>) -> bool {
        let mut changed = false;

        let newly_expired: Vec<TaskRef> = self
            .views
            .view(ViewId::Pending)
            .iter()
            .filter(|task| task.is_expired(now))
            .map(Arc::clone)
            .collect();
        for task in newly_expired {
            self.views.remove_from(ViewId::Pending, &task);
            self.views.remove_from(type_view(&task.kind), &task);
            self.views.remove_from(ViewId::ThisWeek, &task);
            self.views.push(ViewId::Expired, task);
            changed = true;
        }

        let this_week: Vec<TaskRef> = self
            .views
            .view(ViewId::Pending)
            .iter()
            .filter(|task| task.in_this_week(now))
            .map(Arc::clone)
            .collect();
        if this_week != self.views.view(ViewId::ThisWeek) {
            self.views.replace(ViewId::ThisWeek, this_week);
            changed = true;
        }

        changed
    }

    // =========================================================================
    // Resolution helpers
    // =========================================================================

    fn resolve_index(&self, view: ViewId, index: usize) -> Result<TaskRef> {
        // Reported 1-based: the position the caller presented to the user.
        self.views
            .presented(view)
            .get(index)
            .cloned()
            .ok_or(Error::InvalidIndex {
                view: view.name().to_string(),
                position: index + 1,
            })
    }

    fn resolve_name(&self, view: ViewId, name: &str) -> Result<TaskRef> {
        self.views
            .presented(view)
            .into_iter()
            .find(|task| task.name == name)
            .ok_or_else(|| Error::NameNotFound {
                view: view.name().to_string(),
                name: name.to_string(),
            })
    }

    fn find_duplicate(&self, candidate: &Task, exclude: Option<&TaskRef>) -> bool {
        [ViewId::Pending, ViewId::Expired, ViewId::Completed]
            .into_iter()
            .flat_map(|view| self.views.view(view))
            .any(|task| {
                task.as_ref() == candidate
                    && exclude.map_or(true, |excluded| !Arc::ptr_eq(task, excluded))
            })
    }
}

fn type_view(kind: &TaskKind) -> ViewId {
    match kind {
        TaskKind::Floating => ViewId::General,
        TaskKind::Deadline { .. } => ViewId::Deadline,
        TaskKind::Event { .. } => ViewId::Event,
    }
}
