//! External collaborators the pipeline core depends on but does not implement:
//! the L1 data source, and whatever consumes assembled channel payloads.

use crate::{context::StageContext, errors::PipelineError, progress::Progress, types::block::L1BlockRef};
use alloy_primitives::{Bytes, B256};
use async_trait::async_trait;
use thiserror::Error;

/// An error fetching a block from the L1 source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum L1FetchError {
    /// No block exists at the requested number or hash.
    #[error("L1 block not found")]
    NotFound,
    /// The underlying transport (RPC client, node embedding) failed. The
    /// message is opaque; callers should treat this as retryable.
    #[error("L1 transport error: {0}")]
    Transport(String),
}

/// Read-only access to L1 block headers, keyed by number or by hash.
///
/// Implementations are expected to be cheap to clone (an `Arc`-wrapped RPC
/// client, typically) since stages hold their own copy.
#[async_trait]
pub trait L1Provider: Send + Sync {
    /// Fetches the canonical L1 block at `number`, as seen by this provider
    /// right now. Two calls with the same `number` may return different
    /// blocks across a reorg.
    async fn block_by_number(&self, number: u64) -> Result<L1BlockRef, L1FetchError>;

    /// Fetches the L1 block with the given `hash`, if the provider still has
    /// it (it may have been reorged out).
    async fn block_by_hash(&self, hash: B256) -> Result<L1BlockRef, L1FetchError>;
}

/// Whatever consumes assembled channel payloads, downstream of the channel
/// bank: a batch queue, in the full derivation pipeline this crate is a slice
/// of.
#[async_trait]
pub trait Downstream: Send + Sync {
    /// The downstream stage's current [`Progress`], used by the channel bank
    /// to detect an upstream-origin advance or reorg.
    fn progress(&self) -> Progress;

    /// Hands a fully assembled channel's concatenated frame data to the
    /// downstream stage.
    async fn write_channel(&mut self, ctx: &StageContext, data: Bytes) -> Result<(), PipelineError>;
}
