//! # Operation Batches
//!
//! The content of the in-flight and buffer tiers.
//!
//! A batch is a non-empty, ordered run of pending operations. Compatible
//! operations are folded together; incompatible ones stay side by side as a
//! composable sequence. Every method returns a new batch instead of mutating,
//! so a reference can compute all of its rebased tiers before committing any
//! of them.
//!
//! Both walks are linear scans over the batch. A per-target index (one slot
//! per mutated key) would avoid them for long batches.

use crate::errors::{SyncError, SyncResult};
use crate::operation::{Capability, Operation};
use tracing::debug;

/// Ordered, non-empty run of pending operations
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<O> {
    operations: Vec<O>,
}

impl<O: Operation> Batch<O> {
    /// Start a batch from one operation (`None` if it is already a noop)
    pub fn single(operation: O) -> Option<Self> {
        Self::from_operations(vec![operation])
    }

    /// Build a batch, pruning noops (`None` if nothing survives)
    pub fn from_operations(operations: Vec<O>) -> Option<Self> {
        let operations: Vec<O> = operations.into_iter().filter(|op| !op.is_noop()).collect();

        if operations.is_empty() {
            None
        } else {
            Some(Self { operations })
        }
    }

    /// Operations in application order
    pub fn operations(&self) -> &[O] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Always false; empty batches are never constructed
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn into_operations(self) -> Vec<O> {
        self.operations
    }

    /// Replay every operation onto a snapshot
    pub fn apply_to(&self, snapshot: &mut O::Snapshot) {
        for operation in &self.operations {
            operation.apply(snapshot);
        }
    }

    /// Fold a causally-following operation into the batch.
    ///
    /// The newest compatible entry absorbs `next`; the entries after it are
    /// incompatible with `next` and therefore commute with it. With no
    /// compatible entry `next` is appended. Returns `None` when the result
    /// cancels out completely.
    pub fn compose(&self, next: O) -> SyncResult<Option<Self>> {
        let mut operations = self.operations.clone();

        match operations
            .iter()
            .rposition(|existing| existing.is_compatible(&next))
        {
            Some(index) => {
                let merged = operations[index]
                    .compose(&next)
                    .ok_or_else(|| missing(&operations[index], &next, Capability::Compose))?;

                debug!(existing = ?operations[index], next = ?next, merged = ?merged, "composed");

                if merged.is_noop() {
                    debug!(index, "composition cancelled out, pruning");
                    operations.remove(index);
                } else {
                    operations[index] = merged;
                }
            }
            None => operations.push(next),
        }

        Ok(Self::from_operations(operations))
    }

    /// Rebase the batch onto a causally-preceding operation.
    ///
    /// Walks the batch oldest-first. Each compatible entry is transformed
    /// against `incoming`, and `incoming` is replaced by its own transformed
    /// form before it meets the next entry. Returns the surviving batch and
    /// what remains of `incoming` once it has been pushed past every entry.
    pub fn transform(&self, incoming: O) -> SyncResult<(Option<Self>, O)> {
        let mut incoming = incoming;
        let mut operations = Vec::with_capacity(self.operations.len());

        for pending in &self.operations {
            if incoming.is_noop() || !pending.is_compatible(&incoming) {
                operations.push(pending.clone());
                continue;
            }

            let (pending_prime, incoming_prime) = pending
                .transform(&incoming)
                .ok_or_else(|| missing(pending, &incoming, Capability::Transform))?;

            debug!(
                pending = ?pending,
                incoming = ?incoming,
                pending_prime = ?pending_prime,
                incoming_prime = ?incoming_prime,
                "transformed"
            );

            operations.push(pending_prime);
            incoming = incoming_prime;
        }

        Ok((Self::from_operations(operations), incoming))
    }
}

fn missing<O: Operation>(operation: &O, other: &O, capability: Capability) -> SyncError {
    SyncError::UnknownCapability {
        operation: format!("{:?}", operation),
        other: format!("{:?}", other),
        capability,
    }
}
