//! # docsync Engine
//!
//! Keeps an optimistic, locally-editable view of a document while a remote
//! authority applies other actors' changes and at most one save is in flight.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Reference: canonical │ in-flight │ buffer   │
//! └─────────────────────────────────────────────┘
//!        ▲                    ▲           ▲
//!  apply_to_canonical       saving   apply_to_buffer
//!  (remote, transforms      saved    (local, composes
//!   in-flight + buffer)               into buffer)
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Notifier: canonical:change, buffer:change,  │
//! │ buffer:transformed, lifecycle:saving/saved  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Canonical only moves forward**: remote operations and acknowledged saves
//! 2. **Unsent edits survive**: pending tiers are transformed, never dropped
//! 3. **Acknowledged edits apply once**: `saved` folds in-flight into canonical
//! 4. **Noops are pruned**: `is_dirty` reflects real pending effect
//! 5. **Failures are clean**: a rejected call leaves the reference as it was
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docsync_engine::{EventLog, Reference};
//!
//! let log = Arc::new(EventLog::new());
//! let mut reference = Reference::new("person", "1").with_notifier(log.clone());
//!
//! // Local edit
//! reference.apply_to_buffer(op)?;
//!
//! // Send the buffer, then acknowledge it
//! reference.saving()?;
//! reference.saved()?;
//!
//! // Remote edit from another actor
//! reference.apply_to_canonical(remote)?;
//! ```
//!
//! Calls on one reference must be serialized by the caller. Distinct
//! references are independent.

mod batch;
mod errors;
mod events;
mod lifecycle;
mod operation;
mod reconcile;
mod reference;

pub use batch::Batch;
pub use errors::{SyncError, SyncResult, Tier};
pub use events::{
    EventBus, EventKind, EventLog, Notifier, NullNotifier, RecordedEvent, SubscriptionId,
    SyncEvent,
};
pub use lifecycle::LifecycleState;
pub use operation::{Capability, Operation};
pub use reference::{DocumentKey, Reference};

// Re-export common types for convenience
pub use docsync_common::Snapshot;
