//! # Document References
//!
//! A reference is one client's view of one document, split into three tiers:
//!
//! ```text
//! canonical ──► in-flight ──► buffer
//! (acked)       (sent)        (unsent local edits)
//! ```
//!
//! The buffered snapshot (canonical with in-flight then buffer replayed on
//! top) is what the user sees. Reconciliation lives in `reconcile.rs` and the
//! save transitions in `lifecycle.rs`; this module owns the tiers and the
//! read-side accessors.

use crate::batch::Batch;
use crate::events::{EventKind, Notifier, NullNotifier, SyncEvent};
use crate::operation::Operation;
use docsync_common::Snapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of a tracked document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey {
    pub kind: String,
    pub id: String,
}

impl DocumentKey {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Optimistic, locally-editable view of a remotely-owned document
pub struct Reference<O: Operation> {
    key: DocumentKey,

    /// Last state acknowledged by the authority
    pub(crate) canonical: O::Snapshot,

    /// Sent to the authority, not yet acknowledged
    pub(crate) in_flight: Option<Batch<O>>,

    /// Local edits not yet sent
    pub(crate) buffer: Option<Batch<O>>,

    notifier: Arc<dyn Notifier<O>>,
}

impl<O: Operation> Reference<O> {
    /// Create a reference whose canonical starts empty
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self
    where
        O::Snapshot: Default,
    {
        Self::with_seed(kind, id, O::Snapshot::default())
    }

    /// Create a reference whose canonical starts at `seed`
    pub fn with_seed(kind: impl Into<String>, id: impl Into<String>, seed: O::Snapshot) -> Self {
        Self {
            key: DocumentKey::new(kind, id),
            canonical: seed,
            in_flight: None,
            buffer: None,
            notifier: Arc::new(NullNotifier),
        }
    }

    /// Route this reference's events to `notifier`
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier<O>>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    pub fn kind(&self) -> &str {
        &self.key.kind
    }

    pub fn id(&self) -> &str {
        &self.key.id
    }

    /// The acknowledged snapshot itself; borrowed, so callers cannot mutate it
    pub fn canonical_snapshot(&self) -> &O::Snapshot {
        &self.canonical
    }

    /// Copy of canonical with the in-flight batch applied
    pub fn in_flight_snapshot(&self) -> O::Snapshot {
        let mut snapshot = self.canonical.copy();
        if let Some(batch) = &self.in_flight {
            batch.apply_to(&mut snapshot);
        }
        snapshot
    }

    /// Copy of the in-flight snapshot with the buffer applied
    pub fn buffered_snapshot(&self) -> O::Snapshot {
        let mut snapshot = self.in_flight_snapshot();
        if let Some(batch) = &self.buffer {
            batch.apply_to(&mut snapshot);
        }
        snapshot
    }

    pub fn in_flight(&self) -> Option<&Batch<O>> {
        self.in_flight.as_ref()
    }

    pub fn buffer(&self) -> Option<&Batch<O>> {
        self.buffer.as_ref()
    }

    /// Anything not yet acknowledged
    pub fn is_dirty(&self) -> bool {
        self.buffer.is_some() || self.in_flight.is_some()
    }

    /// A save is awaiting acknowledgment
    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub(crate) fn emit(&self, kind: EventKind, operation: Option<&O>) {
        self.notifier.notify(&SyncEvent {
            kind,
            key: &self.key,
            operation,
        });
    }
}

impl<O: Operation> fmt::Debug for Reference<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("key", &self.key)
            .field("canonical", &self.canonical)
            .field("in_flight", &self.in_flight)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}
