//! The per-stage cursor every stage in the pipeline carries, and the update
//! contract that lets a downstream stage detect when its upstream neighbor has
//! moved on, or reorged, since the last time it looked.

use crate::{
    errors::{PipelineResult, ResetError},
    types::block::L1BlockRef,
};

/// A stage's cursor over the L1 chain: which block it is synchronized to, and
/// whether it has finished ingesting everything associated with that block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// The L1 block this stage is currently synchronized to.
    pub origin: L1BlockRef,
    /// `true` once all data from `origin` has been ingested; the stage is then
    /// safe to advance to the next block.
    pub closed: bool,
}

impl Progress {
    /// Creates a freshly-opened `Progress` at the given origin.
    pub const fn new(origin: L1BlockRef) -> Self {
        Self { origin, closed: false }
    }

    /// Reconciles this stage's progress against its upstream neighbor's current
    /// `outer` progress.
    ///
    /// - If `self` is closed and `outer.origin` differs from `self.origin`: adopts
    ///   the new origin, reopens (`closed = false`), and returns `Ok(true)`.
    /// - If `self` is *not* closed and `outer.origin` differs: the upstream jumped
    ///   out from under unclosed work — a reorg. Returns
    ///   `Err(ResetError::UnclosedOriginChange)`.
    /// - Otherwise nothing changed: returns `Ok(false)`.
    pub fn update(&mut self, outer: Progress) -> PipelineResult<bool> {
        if outer.origin == self.origin {
            return Ok(false);
        }
        if self.closed {
            self.origin = outer.origin;
            self.closed = false;
            return Ok(true);
        }
        Err(ResetError::UnclosedOriginChange(self.origin.hash, outer.origin.hash).reset())
    }
}
