use std::fmt;

/// Document state held by a reference tier.
///
/// Snapshots handed out to callers are always produced with [`Snapshot::copy`],
/// so mutating them never reaches engine-owned state. The copy strategy is the
/// type's own `Clone`.
pub trait Snapshot: fmt::Debug + Sized {
    /// Produce an independent copy of this snapshot
    fn copy(&self) -> Self;
}

impl<T> Snapshot for T
where
    T: Clone + fmt::Debug,
{
    fn copy(&self) -> Self {
        self.clone()
    }
}
