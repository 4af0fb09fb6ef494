//! # SetChange
//!
//! A delta over a collection: items to add and items to remove, applied
//! adds first. Compatible with every other change.
//!
//! Every item a change adds must be absent and every item it removes must be
//! present, so composing an add with a later remove of the same item really
//! cancels two visible edits.
//!
//! When two concurrent changes touch the same item the local one wins: the
//! remote side drops every item the local side adds or removes.

use crate::Membership;
use docsync_common::{format_items, ItemSet};
use docsync_engine::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Ord"
))]
pub struct SetChange<T> {
    #[serde(default)]
    pub add: ItemSet<T>,

    #[serde(default)]
    pub remove: ItemSet<T>,
}

impl<T: Ord> SetChange<T> {
    pub fn new() -> Self {
        Self {
            add: ItemSet::new(),
            remove: ItemSet::new(),
        }
    }

    pub fn adding(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.add.extend(items);
        self
    }

    pub fn removing(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.remove.extend(items);
        self
    }
}

impl<T: Ord> Default for SetChange<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> From<Membership<T>> for SetChange<T> {
    fn from(membership: Membership<T>) -> Self {
        match membership {
            Membership::Add(item) => SetChange::new().adding([item]),
            Membership::Remove(item) => SetChange::new().removing([item]),
            Membership::Noop => SetChange::new(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for SetChange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if !self.add.is_empty() {
            parts.push(format!("add: {}", format_items(&self.add)));
        }

        if !self.remove.is_empty() {
            parts.push(format!("remove: {}", format_items(&self.remove)));
        }

        write!(f, "SetChange[{}]", parts.join(", "))
    }
}

impl<T> Operation for SetChange<T>
where
    T: Ord + Clone + fmt::Debug,
{
    type Snapshot = ItemSet<T>;

    fn apply(&self, snapshot: &mut ItemSet<T>) {
        for item in &self.add {
            snapshot.insert(item.clone());
        }

        for item in &self.remove {
            snapshot.remove(item);
        }
    }

    fn test(&self, snapshot: &ItemSet<T>) -> bool {
        self.add.iter().all(|item| !snapshot.contains(item))
            && self.remove.iter().all(|item| snapshot.contains(item))
    }

    fn is_compatible(&self, _other: &Self) -> bool {
        true
    }

    fn transform(&self, prev: &Self) -> Option<(Self, Self)> {
        let this_prime = SetChange {
            add: self.add.difference(&prev.add).cloned().collect(),
            remove: self.remove.difference(&prev.remove).cloned().collect(),
        };

        let untouched = |item: &&T| !self.add.contains(*item) && !self.remove.contains(*item);
        let prev_prime = SetChange {
            add: prev.add.iter().filter(untouched).cloned().collect(),
            remove: prev.remove.iter().filter(untouched).cloned().collect(),
        };

        Some((this_prime, prev_prime))
    }

    fn compose(&self, next: &Self) -> Option<Self> {
        let mut change = self.clone();

        for item in &next.add {
            if !change.remove.remove(item) {
                change.add.insert(item.clone());
            }
        }

        for item in &next.remove {
            if !change.add.remove(item) {
                change.remove.insert(item.clone());
            }
        }

        Some(change)
    }

    fn is_noop(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}
