//! # PropertyOp
//!
//! Operation type for a property-map reference. A single assignment stays a
//! [`SetProperty`] until it meets a [`SetProperties`] batch, at which point
//! it is promoted to a one-key batch so the pair can be resolved key-wise.

use crate::{SetProperties, SetProperty};
use docsync_common::PropertyMap;
use docsync_engine::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PropertyOp {
    Set(SetProperty),
    Batch(SetProperties),
}

impl PropertyOp {
    /// Promote to the batch form
    pub fn into_batch(self) -> SetProperties {
        match self {
            PropertyOp::Set(op) => op.into(),
            PropertyOp::Batch(batch) => batch,
        }
    }

    fn to_batch(&self) -> SetProperties {
        self.clone().into_batch()
    }
}

impl From<SetProperty> for PropertyOp {
    fn from(op: SetProperty) -> Self {
        PropertyOp::Set(op)
    }
}

impl From<SetProperties> for PropertyOp {
    fn from(batch: SetProperties) -> Self {
        PropertyOp::Batch(batch)
    }
}

impl fmt::Display for PropertyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyOp::Set(op) => fmt::Display::fmt(op, f),
            PropertyOp::Batch(batch) => fmt::Display::fmt(batch, f),
        }
    }
}

impl Operation for PropertyOp {
    type Snapshot = PropertyMap;

    fn apply(&self, snapshot: &mut PropertyMap) {
        match self {
            PropertyOp::Set(op) => op.apply(snapshot),
            PropertyOp::Batch(batch) => batch.apply(snapshot),
        }
    }

    fn test(&self, snapshot: &PropertyMap) -> bool {
        match self {
            PropertyOp::Set(op) => op.test(snapshot),
            PropertyOp::Batch(batch) => batch.test(snapshot),
        }
    }

    fn is_compatible(&self, other: &Self) -> bool {
        match (self, other) {
            (PropertyOp::Set(mine), PropertyOp::Set(theirs)) => mine.is_compatible(theirs),
            _ => true,
        }
    }

    fn transform(&self, prev: &Self) -> Option<(Self, Self)> {
        match (self, prev) {
            (PropertyOp::Set(mine), PropertyOp::Set(theirs)) => {
                let (mine, theirs) = mine.transform(theirs)?;
                Some((mine.into(), theirs.into()))
            }
            _ => {
                let (mine, theirs) = self.to_batch().transform(&prev.to_batch())?;
                Some((mine.into(), theirs.into()))
            }
        }
    }

    fn compose(&self, next: &Self) -> Option<Self> {
        match (self, next) {
            (PropertyOp::Set(mine), PropertyOp::Set(theirs)) => {
                mine.compose(theirs).map(PropertyOp::Set)
            }
            _ => self
                .to_batch()
                .compose(&next.to_batch())
                .map(PropertyOp::Batch),
        }
    }

    fn is_noop(&self) -> bool {
        match self {
            PropertyOp::Set(op) => op.is_noop(),
            PropertyOp::Batch(batch) => batch.is_noop(),
        }
    }
}
