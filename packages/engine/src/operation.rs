use docsync_common::Snapshot;
use std::fmt;

/// Capability contract for a unit of change applied to a snapshot
///
/// Only `apply` is required. Every other capability has a default meaning
/// "unsupported" or "always satisfied":
/// - `test`: precondition against a snapshot (default: always satisfied)
/// - `is_compatible`: gate for `transform`/`compose` (default: never compatible)
/// - `transform`: rebase onto a causally-preceding operation (default: unsupported)
/// - `compose`: merge a causally-following operation (default: unsupported)
/// - `is_noop`: the operation no longer has any effect (default: false)
///
/// Incompatible operations must be independent: applying them in either
/// order yields the same snapshot. The engine relies on this when it scans a
/// batch for a composition partner and when it skips entries during transform.
pub trait Operation: Clone + fmt::Debug {
    /// Document state this operation applies to
    type Snapshot: Snapshot;

    /// Mutate the snapshot to reflect this operation
    fn apply(&self, snapshot: &mut Self::Snapshot);

    /// Precondition checked before `apply`
    fn test(&self, _snapshot: &Self::Snapshot) -> bool {
        true
    }

    /// Whether `other` targets the same thing and can be transformed or composed with this one
    fn is_compatible(&self, _other: &Self) -> bool {
        false
    }

    /// Given a causally-preceding compatible operation `prev`, return
    /// `(self', prev')` such that `prev` then `self'` equals `self` then `prev'`.
    ///
    /// `None` means the capability is missing.
    fn transform(&self, _prev: &Self) -> Option<(Self, Self)> {
        None
    }

    /// Merge a causally-following compatible operation into one equivalent operation.
    ///
    /// `None` means the capability is missing.
    fn compose(&self, _next: &Self) -> Option<Self> {
        None
    }

    /// Whether the operation has been reduced to nothing and should be pruned
    fn is_noop(&self) -> bool {
        false
    }
}

/// Optional capabilities the engine may need from a compatible pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Transform,
    Compose,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Transform => write!(f, "transform"),
            Capability::Compose => write!(f, "compose"),
        }
    }
}
