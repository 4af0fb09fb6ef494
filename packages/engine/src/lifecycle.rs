//! # Save Lifecycle
//!
//! ```text
//!            apply_to_buffer           saving
//!   Idle ───────────────────► Dirty ──────────► Saving
//!    ▲                                            │
//!    └──────────── saved (buffer empty) ──────────┤
//!                  saved (buffer pending) ──► Dirty
//! ```
//!
//! At most one batch is in flight per reference. A save that is never
//! acknowledged leaves the reference in `Saving` for good; there is no
//! cancellation.

use crate::errors::{SyncError, SyncResult};
use crate::events::EventKind;
use crate::operation::Operation;
use crate::reference::Reference;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Derived save state of a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Nothing pending
    Idle,
    /// Local edits, nothing in flight
    Dirty,
    /// A save is awaiting acknowledgment (the buffer may hold more edits)
    Saving,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Idle => write!(f, "idle"),
            LifecycleState::Dirty => write!(f, "dirty"),
            LifecycleState::Saving => write!(f, "saving"),
        }
    }
}

impl<O: Operation> Reference<O> {
    pub fn state(&self) -> LifecycleState {
        if self.in_flight.is_some() {
            LifecycleState::Saving
        } else if self.buffer.is_some() {
            LifecycleState::Dirty
        } else {
            LifecycleState::Idle
        }
    }

    /// Move the whole buffer in flight.
    ///
    /// The buffered snapshot is unchanged, so only `lifecycle:saving` is emitted.
    pub fn saving(&mut self) -> SyncResult<()> {
        if self.in_flight.is_some() {
            return Err(SyncError::SaveInProgress(self.key().clone()));
        }

        let batch = self
            .buffer
            .take()
            .ok_or_else(|| SyncError::EmptyBuffer(self.key().clone()))?;

        info!(key = %self.key(), operations = batch.len(), "saving");
        self.in_flight = Some(batch);

        self.emit(EventKind::LifecycleSaving, None);

        Ok(())
    }

    /// Acknowledge the in-flight batch and fold it into canonical.
    ///
    /// Emits `canonical:change` then `lifecycle:saved`. The canonical change
    /// carries the acknowledged operation when the batch holds exactly one.
    pub fn saved(&mut self) -> SyncResult<()> {
        let batch = self
            .in_flight
            .take()
            .ok_or_else(|| SyncError::NothingInFlight(self.key().clone()))?;

        batch.apply_to(&mut self.canonical);
        info!(key = %self.key(), operations = batch.len(), "saved");

        let acknowledged = match batch.operations() {
            [operation] => Some(operation),
            _ => None,
        };

        self.emit(EventKind::CanonicalChange, acknowledged);
        self.emit(EventKind::LifecycleSaved, None);

        Ok(())
    }
}
