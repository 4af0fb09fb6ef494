//! Error types for the sync engine

use crate::operation::Capability;
use crate::reference::DocumentKey;
use std::fmt;
use thiserror::Error;

/// Snapshot tier an operation was checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Canonical,
    Buffered,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Canonical => write!(f, "canonical"),
            Tier::Buffered => write!(f, "buffered"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// The operation's precondition does not hold; nothing was applied.
    ///
    /// Against the canonical tier this means the authority and the client
    /// disagree and the reference must be resynchronized.
    #[error("Precondition failed: {operation} against the {tier} snapshot of {key}")]
    PreconditionViolation {
        key: DocumentKey,
        tier: Tier,
        operation: String,
    },

    #[error("Cannot save {0}: the buffer is empty")]
    EmptyBuffer(DocumentKey),

    #[error("Cannot save {0}: an in-flight save has not been acknowledged")]
    SaveInProgress(DocumentKey),

    #[error("Cannot acknowledge {0}: nothing is in flight")]
    NothingInFlight(DocumentKey),

    #[error("{operation} is compatible with {other} but does not support {capability}")]
    UnknownCapability {
        operation: String,
        other: String,
        capability: Capability,
    },
}

/// Result type for engine operations
pub type SyncResult<T> = Result<T, SyncError>;
