//! Tag categories and their reference counts.
//!
//! A category exists exactly while at least one pending or expired task
//! carries its tag. Counts are maintained by the task store on every
//! add/delete/update; the registry itself only enforces the count >= 1
//! lifecycle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A tag name together with the number of live tasks referencing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCategory {
    pub name: String,
    pub count: u32,
}

/// Reference-count registry over tag names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegistry {
    counts: BTreeMap<String, u32>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted categories. Entries with a zero
    /// count are dropped rather than resurrected.
    pub fn from_categories(categories: Vec<TagCategory>) -> Self {
        let counts = categories
            .into_iter()
            .filter(|category| category.count > 0)
            .map(|category| (category.name, category.count))
            .collect();
        Self { counts }
    }

    /// Increment the count for `name`, creating the category at 1 if absent.
    pub fn add(&mut self, name: &str) {
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Decrement the count for `name`, removing the category at 0.
    ///
    /// An unknown name means the store's bookkeeping is broken; callers treat
    /// the error as an internal defect, not user input.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let count = self
            .counts
            .get_mut(name)
            .ok_or_else(|| Error::TagNotFound(name.to_string()))?;
        *count -= 1;
        if *count == 0 {
            self.counts.remove(name);
        }
        Ok(())
    }

    pub fn count(&self, name: &str) -> Option<u32> {
        self.counts.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Snapshot the registry as a name-ordered category list.
    pub fn categories(&self) -> Vec<TagCategory> {
        self.counts
            .iter()
            .map(|(name, count)| TagCategory {
                name: name.clone(),
                count: *count,
            })
            .collect()
    }
}
