//! # Membership
//!
//! Adding or removing a single item of a collection.
//!
//! An add followed by a remove of the same item (or the reverse) composes
//! to a noop. Two concurrent adds (or removes) of the same item collapse: the
//! local one has nothing left to do and neither does the remote one.
//!
//! An add concurrent with a remove of the same item cannot happen when
//! preconditions hold: adding requires the item to be absent, which means no
//! other actor could have removed it.

use docsync_common::ItemSet;
use docsync_engine::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "item", rename_all = "camelCase")]
pub enum Membership<T> {
    Add(T),
    Remove(T),
    /// Cancelled out by composition or transformation
    Noop,
}

impl<T> Membership<T> {
    pub fn item(&self) -> Option<&T> {
        match self {
            Membership::Add(item) | Membership::Remove(item) => Some(item),
            Membership::Noop => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Membership<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Membership::Add(item) => write!(f, "Add[{}]", item),
            Membership::Remove(item) => write!(f, "Remove[{}]", item),
            Membership::Noop => write!(f, "Noop"),
        }
    }
}

impl<T> Operation for Membership<T>
where
    T: Ord + Clone + fmt::Debug,
{
    type Snapshot = ItemSet<T>;

    fn apply(&self, snapshot: &mut ItemSet<T>) {
        match self {
            Membership::Add(item) => {
                snapshot.insert(item.clone());
            }
            Membership::Remove(item) => {
                snapshot.remove(item);
            }
            Membership::Noop => {}
        }
    }

    fn test(&self, snapshot: &ItemSet<T>) -> bool {
        match self {
            Membership::Add(item) => !snapshot.contains(item),
            Membership::Remove(item) => snapshot.contains(item),
            Membership::Noop => true,
        }
    }

    fn is_compatible(&self, other: &Self) -> bool {
        match (self.item(), other.item()) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => false,
        }
    }

    fn transform(&self, prev: &Self) -> Option<(Self, Self)> {
        match (self, prev) {
            (Membership::Add(mine), Membership::Add(theirs))
            | (Membership::Remove(mine), Membership::Remove(theirs))
                if mine == theirs =>
            {
                Some((Membership::Noop, Membership::Noop))
            }
            _ => Some((self.clone(), prev.clone())),
        }
    }

    fn compose(&self, next: &Self) -> Option<Self> {
        match (self, next) {
            (Membership::Add(mine), Membership::Remove(theirs))
            | (Membership::Remove(mine), Membership::Add(theirs))
                if mine == theirs =>
            {
                Some(Membership::Noop)
            }
            _ => Some(self.clone()),
        }
    }

    fn is_noop(&self) -> bool {
        matches!(self, Membership::Noop)
    }
}
