//! # Reconciliation
//!
//! The two entry points that change what a reference holds:
//!
//! - [`Reference::apply_to_canonical`]: a remote operation the authority has
//!   already accepted. Canonical advances, and the in-flight and buffer tiers
//!   are transformed against it so the buffered snapshot keeps every unsent
//!   local edit.
//! - [`Reference::apply_to_buffer`]: a local intent. It is composed into the
//!   buffer.
//!
//! In-flight is reconciled before the buffer because the authority sees it
//! first. The buffer is transformed against whatever is left of the remote
//! operation once in-flight has absorbed its share, which keeps
//! `buffered = canonical ∘ in-flight ∘ buffer`.
//!
//! Preconditions are checked and every rebased tier is computed before
//! anything is replaced, so a failed call leaves the reference untouched.

use crate::errors::{SyncError, SyncResult, Tier};
use crate::events::EventKind;
use crate::operation::Operation;
use crate::reference::Reference;
use crate::Batch;
use tracing::{debug, warn};

impl<O: Operation> Reference<O> {
    /// Apply a confirmed remote operation to canonical and rebase the pending tiers.
    ///
    /// Emits `canonical:change`, then `buffer:change` when the operation
    /// still changes the buffered snapshot after transformation, or
    /// `buffer:transformed` when the pending tiers absorbed it completely.
    pub fn apply_to_canonical(&mut self, operation: O) -> SyncResult<()> {
        if !operation.test(&self.canonical) {
            warn!(key = %self.key(), ?operation, "remote operation does not fit canonical");
            return Err(SyncError::PreconditionViolation {
                key: self.key().clone(),
                tier: Tier::Canonical,
                operation: format!("{:?}", operation),
            });
        }

        let (in_flight, remainder) = match &self.in_flight {
            Some(batch) => batch.transform(operation.clone())?,
            None => (None, operation.clone()),
        };

        let mut rebased_buffer = None;
        let mut visible = None;

        if !remainder.is_noop() {
            match &self.buffer {
                Some(batch) => {
                    let (buffer, rest) = batch.transform(remainder)?;
                    rebased_buffer = Some(buffer);
                    if !rest.is_noop() {
                        visible = Some(rest);
                    }
                }
                None => visible = Some(remainder),
            }
        }

        operation.apply(&mut self.canonical);

        if self.in_flight.is_some() && in_flight.is_none() {
            debug!(key = %self.key(), "in-flight batch reduced to noop");
        }
        self.in_flight = in_flight;

        if let Some(buffer) = rebased_buffer {
            if buffer.is_none() {
                debug!(key = %self.key(), "buffer reduced to noop");
            }
            self.buffer = buffer;
        }

        self.emit(EventKind::CanonicalChange, Some(&operation));

        match visible {
            Some(change) => self.emit(EventKind::BufferChange, Some(&change)),
            None => self.emit(EventKind::BufferTransformed, None),
        }

        Ok(())
    }

    /// Compose a local operation into the buffer.
    ///
    /// The precondition is checked against the buffered snapshot. A
    /// composition that cancels out (an add undone by a remove) empties the
    /// buffer. Emits `buffer:change`.
    pub fn apply_to_buffer(&mut self, operation: O) -> SyncResult<()> {
        if !operation.test(&self.buffered_snapshot()) {
            warn!(key = %self.key(), ?operation, "local operation does not fit the buffer");
            return Err(SyncError::PreconditionViolation {
                key: self.key().clone(),
                tier: Tier::Buffered,
                operation: format!("{:?}", operation),
            });
        }

        let buffer = match &self.buffer {
            Some(batch) => batch.compose(operation.clone())?,
            None => Batch::single(operation.clone()),
        };

        debug!(
            key = %self.key(),
            pending = buffer.as_ref().map_or(0, |batch| batch.len()),
            "buffer updated"
        );
        self.buffer = buffer;

        self.emit(EventKind::BufferChange, Some(&operation));

        Ok(())
    }
}
