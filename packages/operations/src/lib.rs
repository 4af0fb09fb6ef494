//! # Docsync Operations
//!
//! Concrete operations for the two snapshot shapes in `docsync-common`.
//!
//! | Snapshot | Single change | Batched change | Reference operation |
//! |---|---|---|---|
//! | `PropertyMap` | [`SetProperty`] | [`SetProperties`] | [`PropertyOp`] |
//! | `ItemSet<T>` | [`Membership`] | [`SetChange`] | [`CollectionOp`] |
//!
//! Concurrent writes to the same property resolve in favour of the local
//! edit: the local assignment is rebased onto the remote value and the remote
//! one is dropped from the buffered view.

mod collection_op;
mod membership;
mod property_op;
mod set_change;
mod set_properties;
mod set_property;

pub use collection_op::CollectionOp;
pub use membership::Membership;
pub use property_op::PropertyOp;
pub use set_change::SetChange;
pub use set_properties::{PropertyChange, SetProperties};
pub use set_property::SetProperty;
