//! # CollectionOp
//!
//! Operation type for an item-set reference. Single-item changes stay
//! [`Membership`] until they meet a [`SetChange`], then both sides are
//! resolved as set changes.

use crate::{Membership, SetChange};
use docsync_common::ItemSet;
use docsync_engine::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(
        serialize = "T: Serialize",
        deserialize = "T: Deserialize<'de> + Ord"
    )
)]
pub enum CollectionOp<T> {
    Member(Membership<T>),
    Change(SetChange<T>),
}

impl<T: Ord + Clone> CollectionOp<T> {
    pub fn add(item: T) -> Self {
        CollectionOp::Member(Membership::Add(item))
    }

    pub fn remove(item: T) -> Self {
        CollectionOp::Member(Membership::Remove(item))
    }

    fn to_change(&self) -> SetChange<T> {
        match self {
            CollectionOp::Member(membership) => membership.clone().into(),
            CollectionOp::Change(change) => change.clone(),
        }
    }
}

impl<T> From<Membership<T>> for CollectionOp<T> {
    fn from(membership: Membership<T>) -> Self {
        CollectionOp::Member(membership)
    }
}

impl<T> From<SetChange<T>> for CollectionOp<T> {
    fn from(change: SetChange<T>) -> Self {
        CollectionOp::Change(change)
    }
}

impl<T: fmt::Display> fmt::Display for CollectionOp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionOp::Member(membership) => fmt::Display::fmt(membership, f),
            CollectionOp::Change(change) => fmt::Display::fmt(change, f),
        }
    }
}

impl<T> Operation for CollectionOp<T>
where
    T: Ord + Clone + fmt::Debug,
{
    type Snapshot = ItemSet<T>;

    fn apply(&self, snapshot: &mut ItemSet<T>) {
        match self {
            CollectionOp::Member(membership) => membership.apply(snapshot),
            CollectionOp::Change(change) => change.apply(snapshot),
        }
    }

    fn test(&self, snapshot: &ItemSet<T>) -> bool {
        match self {
            CollectionOp::Member(membership) => membership.test(snapshot),
            CollectionOp::Change(change) => change.test(snapshot),
        }
    }

    fn is_compatible(&self, other: &Self) -> bool {
        match (self, other) {
            (CollectionOp::Member(mine), CollectionOp::Member(theirs)) => {
                mine.is_compatible(theirs)
            }
            _ => true,
        }
    }

    fn transform(&self, prev: &Self) -> Option<(Self, Self)> {
        match (self, prev) {
            (CollectionOp::Member(mine), CollectionOp::Member(theirs)) => {
                let (mine, theirs) = mine.transform(theirs)?;
                Some((mine.into(), theirs.into()))
            }
            _ => {
                let (mine, theirs) = self.to_change().transform(&prev.to_change())?;
                Some((mine.into(), theirs.into()))
            }
        }
    }

    fn compose(&self, next: &Self) -> Option<Self> {
        match (self, next) {
            (CollectionOp::Member(mine), CollectionOp::Member(theirs)) => {
                mine.compose(theirs).map(CollectionOp::Member)
            }
            _ => self
                .to_change()
                .compose(&next.to_change())
                .map(CollectionOp::Change),
        }
    }

    fn is_noop(&self) -> bool {
        match self {
            CollectionOp::Member(membership) => membership.is_noop(),
            CollectionOp::Change(change) => change.is_noop(),
        }
    }
}
