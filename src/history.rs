//! Session undo/redo over full state snapshots.
//!
//! Two stacks: `past` holds every committed state with the current one on
//! top, `future` holds states undone away. The bottom of `past` is the
//! pristine loaded state and is never popped. Recording new activity after
//! an undo discards the redo branch.
//!
//! Snapshots share their task allocations (`Arc`) but never alias the live
//! store's containers, so later mutations cannot corrupt history.

use crate::error::{Error, Result};
use crate::store::Snapshot;

#[derive(Debug)]
pub struct History {
    past: Vec<Snapshot>,
    future: Vec<Snapshot>,
}

impl History {
    /// Start a history anchored at the pristine loaded state.
    pub fn new(pristine: Snapshot) -> Self {
        Self {
            past: vec![pristine],
            future: Vec::new(),
        }
    }

    /// Drop everything and re-anchor, used when the store is reloaded
    /// wholesale (save-directory switch).
    pub fn reset(&mut self, pristine: Snapshot) {
        self.past = vec![pristine];
        self.future.clear();
    }

    /// Record the state after a committed mutation; invalidates any redo
    /// chain.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.past.push(snapshot);
        self.future.clear();
    }

    /// Step back one committed mutation, returning the state to restore.
    pub fn undo(&mut self) -> Result<Snapshot> {
        if self.past.len() < 2 {
            return Err(Error::NothingToUndo);
        }
        if let Some(undone) = self.past.pop() {
            self.future.push(undone);
        }
        match self.past.last() {
            Some(snapshot) => Ok(snapshot.clone()),
            None => Err(Error::NothingToUndo),
        }
    }

    /// Step forward again, returning the state to restore.
    pub fn redo(&mut self) -> Result<Snapshot> {
        let snapshot = self.future.pop().ok_or(Error::NothingToRedo)?;
        self.past.push(snapshot.clone());
        Ok(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        self.past.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStore;
    use crate::task::Task;
    use chrono::{TimeZone, Utc};

    fn snapshot_with(names: &[&str]) -> Snapshot {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let mut store = TaskStore::new();
        for name in names {
            store.add(Task::floating(*name), now).unwrap();
        }
        store.snapshot()
    }

    #[test]
    fn undo_redo_round_trip_restores_exact_state() {
        let pristine = snapshot_with(&[]);
        let after = snapshot_with(&["Buy milk"]);

        let mut history = History::new(pristine.clone());
        history.record(after.clone());

        assert_eq!(history.undo().unwrap(), pristine);
        assert_eq!(history.redo().unwrap(), after);
    }

    #[test]
    fn pristine_state_is_never_undone_away() {
        let mut history = History::new(snapshot_with(&[]));
        assert!(matches!(history.undo().unwrap_err(), Error::NothingToUndo));
        assert!(!history.can_undo());
    }

    #[test]
    fn new_activity_discards_the_redo_branch() {
        let mut history = History::new(snapshot_with(&[]));
        history.record(snapshot_with(&["A"]));
        history.undo().unwrap();
        assert!(history.can_redo());

        history.record(snapshot_with(&["B"]));
        assert!(matches!(history.redo().unwrap_err(), Error::NothingToRedo));
    }

    #[test]
    fn chained_undo_walks_back_through_every_mutation() {
        let s0 = snapshot_with(&[]);
        let s1 = snapshot_with(&["A"]);
        let s2 = snapshot_with(&["A", "B"]);

        let mut history = History::new(s0.clone());
        history.record(s1.clone());
        history.record(s2);

        assert_eq!(history.undo().unwrap(), s1);
        assert_eq!(history.undo().unwrap(), s0);
        assert!(matches!(history.undo().unwrap_err(), Error::NothingToUndo));
    }

    #[test]
    fn redo_on_fresh_history_fails() {
        let mut history = History::new(snapshot_with(&[]));
        assert!(matches!(history.redo().unwrap_err(), Error::NothingToRedo));
    }
}
