//! Error taxonomy shared by every stage.
//!
//! The derivation core recognizes exactly four kinds of failure (see `spec.md` §7):
//! temporary (retry later), reset (the pipeline must walk back to a consistent
//! origin), critical (abort), and invalid-action (a programmer error, expressed as
//! an assertion rather than a variant here — see `ChannelBank::ingest_data`).

use alloy_primitives::B256;
use thiserror::Error;

/// Convenience alias for the result type every stage operation returns.
///
/// `Ok(())` means made-progress. `Err` carries which of the three retryable/fatal
/// kinds occurred, with [`PipelineError::Eof`] wrapped in [`PipelineErrorKind::Temporary`]
/// standing in for "end-of-input" (no work until upstream advances).
pub type PipelineResult<T> = Result<T, PipelineErrorKind>;

/// Severity wrapper around a [`PipelineError`] or [`ResetError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineErrorKind {
    /// A transient failure. The same operation may succeed if retried later.
    #[error("temporary error: {0}")]
    Temporary(#[source] PipelineError),
    /// An unrecoverable internal-consistency violation. The driver should abort.
    #[error("critical error: {0}")]
    Critical(#[source] PipelineError),
    /// An invariant break observable only globally (e.g. an L1 reorg). The driver
    /// must run the reset protocol end-to-end before retrying.
    #[error("pipeline reset: {0}")]
    Reset(#[from] ResetError),
}

impl PipelineErrorKind {
    /// Returns `true` for the sentinel "nothing to do yet" condition
    /// (`Temporary(Eof)`), as distinct from every other temporary failure.
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Temporary(PipelineError::Eof))
    }
}

/// A temporary- or critical-severity error raised by a stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// There is nothing new to read; try again once upstream has advanced.
    #[error("end of input")]
    Eof,
    /// A stage consumed its buffered input without producing output and needs
    /// another call once more data has been ingested.
    #[error("not enough data")]
    NotEnoughData,
    /// A channel referenced by the queue is missing from the channel map, or
    /// vice versa. Invariant 1 of `spec.md` §8 has been violated.
    #[error("channel bank state inconsistent: {0}")]
    InconsistentState(&'static str),
    /// The upstream stage has no L1 origin yet.
    #[error("missing L1 origin from previous stage")]
    MissingOrigin,
    /// The L1 fetcher could not find the requested block (by number or by hash).
    #[error("L1 block not found")]
    NotFound,
    /// The L1 fetcher failed for a reason that may clear up on retry.
    #[error("L1 fetcher transport error: {0}")]
    Provider(String),
}

impl PipelineError {
    /// Wraps `self` as [`PipelineErrorKind::Critical`].
    pub const fn crit(self) -> PipelineErrorKind {
        PipelineErrorKind::Critical(self)
    }

    /// Wraps `self` as [`PipelineErrorKind::Temporary`].
    pub const fn temp(self) -> PipelineErrorKind {
        PipelineErrorKind::Temporary(self)
    }
}

/// A reset-severity error: something only observable by comparing stage state
/// against the wider world (an L1 reorg, an upstream origin jump while unclosed).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResetError {
    /// The upstream stage's origin changed while this stage still had unclosed
    /// work pending against the old origin.
    #[error("origin changed from {0:?} to {1:?} while unclosed")]
    UnclosedOriginChange(B256, B256),
    /// `L1Traversal` detected a reorg: the next block's parent hash does not
    /// match the current origin's hash.
    #[error("L1 reorg detected: expected parent {0}, got {1}")]
    ReorgDetected(B256, B256),
}

impl ResetError {
    /// Wraps `self` as [`PipelineErrorKind::Reset`].
    pub const fn reset(self) -> PipelineErrorKind {
        PipelineErrorKind::Reset(self)
    }
}
