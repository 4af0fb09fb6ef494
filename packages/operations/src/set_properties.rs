//! # SetProperties
//!
//! Several property assignments applied together, keyed by property.
//! Compatible with every other batch; overlapping keys are resolved per key
//! the same way [`SetProperty`](crate::SetProperty) resolves one.

use crate::SetProperty;
use docsync_common::{read_property, write_property, PropertyMap, Value};
use docsync_engine::Operation;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// One property's `old -> new`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChange {
    #[serde(default)]
    pub old: Value,

    #[serde(default)]
    pub new: Value,
}

impl PropertyChange {
    pub fn new(old: Value, new: Value) -> Self {
        Self { old, new }
    }

    fn is_effectless(&self) -> bool {
        self.old == self.new
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SetProperties {
    pub changes: BTreeMap<String, PropertyChange>,
}

impl SetProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment; effectless ones are skipped
    pub fn with(mut self, property: impl Into<String>, old: Value, new: Value) -> Self {
        let change = PropertyChange::new(old, new);
        if !change.is_effectless() {
            self.changes.insert(property.into(), change);
        }
        self
    }

    pub fn get(&self, property: &str) -> Option<&PropertyChange> {
        self.changes.get(property)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    fn pruned(changes: BTreeMap<String, PropertyChange>) -> Self {
        Self {
            changes: changes
                .into_iter()
                .filter(|(_, change)| !change.is_effectless())
                .collect(),
        }
    }
}

impl From<SetProperty> for SetProperties {
    fn from(op: SetProperty) -> Self {
        SetProperties::new().with(op.property, op.old, op.new)
    }
}

impl fmt::Display for SetProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .changes
            .iter()
            .map(|(property, change)| format!("{} {}->{}", property, change.old, change.new))
            .collect();
        write!(f, "SetProperties[{}]", parts.join(", "))
    }
}

impl Operation for SetProperties {
    type Snapshot = PropertyMap;

    fn apply(&self, snapshot: &mut PropertyMap) {
        for (property, change) in &self.changes {
            write_property(snapshot, property, &change.new);
        }
    }

    fn test(&self, snapshot: &PropertyMap) -> bool {
        self.changes
            .iter()
            .all(|(property, change)| read_property(snapshot, property) == &change.old)
    }

    fn is_compatible(&self, _other: &Self) -> bool {
        true
    }

    fn transform(&self, prev: &Self) -> Option<(Self, Self)> {
        let mut this_prime = BTreeMap::new();
        let mut prev_prime = prev.changes.clone();

        for (property, change) in &self.changes {
            match prev_prime.remove(property) {
                Some(remote) => {
                    this_prime.insert(
                        property.clone(),
                        PropertyChange::new(remote.new, change.new.clone()),
                    );
                }
                None => {
                    this_prime.insert(property.clone(), change.clone());
                }
            }
        }

        Some((Self::pruned(this_prime), Self::pruned(prev_prime)))
    }

    fn compose(&self, next: &Self) -> Option<Self> {
        let mut changes = self.changes.clone();

        for (property, update) in &next.changes {
            match changes.entry(property.clone()) {
                Entry::Occupied(mut entry) => {
                    // Reverted to the value it had before this batch
                    if entry.get().old == update.new {
                        entry.remove();
                    } else {
                        entry.get_mut().new = update.new.clone();
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(update.clone());
                }
            }
        }

        Some(Self::pruned(changes))
    }

    fn is_noop(&self) -> bool {
        self.changes.values().all(PropertyChange::is_effectless)
    }
}
