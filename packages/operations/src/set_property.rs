//! # SetProperty
//!
//! Assignment of one property: `property: old -> new`.
//!
//! - **Precondition**: the snapshot holds `old` (`null` matches an absent key)
//! - **Compatible** with assignments to the same property
//! - **Transform**: local wins; the local assignment is rebased onto the
//!   remote value and the remote one becomes a noop
//! - **Compose**: keeps the first `old` and the last `new`
//! - **Noop** when `old == new`

use docsync_common::{read_property, write_property, PropertyMap, Value};
use docsync_engine::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetProperty {
    pub property: String,

    /// Value the snapshot must hold before the assignment
    #[serde(default)]
    pub old: Value,

    #[serde(default)]
    pub new: Value,
}

impl SetProperty {
    pub fn new(property: impl Into<String>, old: Value, new: Value) -> Self {
        Self {
            property: property.into(),
            old,
            new,
        }
    }
}

impl fmt::Display for SetProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Set[{} {}->{}]", self.property, self.old, self.new)
    }
}

impl Operation for SetProperty {
    type Snapshot = PropertyMap;

    fn apply(&self, snapshot: &mut PropertyMap) {
        write_property(snapshot, &self.property, &self.new);
    }

    fn test(&self, snapshot: &PropertyMap) -> bool {
        read_property(snapshot, &self.property) == &self.old
    }

    fn is_compatible(&self, other: &Self) -> bool {
        self.property == other.property
    }

    fn transform(&self, prev: &Self) -> Option<(Self, Self)> {
        if self.property != prev.property {
            return Some((self.clone(), prev.clone()));
        }

        Some((
            SetProperty::new(&self.property, prev.new.clone(), self.new.clone()),
            SetProperty::new(&prev.property, Value::Null, Value::Null),
        ))
    }

    fn compose(&self, next: &Self) -> Option<Self> {
        if self.property != next.property {
            return None;
        }

        Some(SetProperty::new(
            &self.property,
            self.old.clone(),
            next.new.clone(),
        ))
    }

    fn is_noop(&self) -> bool {
        self.old == self.new
    }
}
