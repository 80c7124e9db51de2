//! The [`L1BlockRef`] type: an opaque identifier of an L1 block.

use alloy_primitives::B256;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An opaque reference to an L1 block, sufficient to chain-walk (via
/// `parent_hash`) and to reason about timeouts (via `timestamp`).
///
/// Equality and hashing are defined over `hash` alone: two `L1BlockRef`s that
/// agree on `hash` are the same block, regardless of whether one was constructed
/// with stale `number`/`timestamp` bookkeeping.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default)]
pub struct L1BlockRef {
    /// The block hash.
    pub hash: B256,
    /// The block number.
    pub number: u64,
    /// The parent block's hash.
    pub parent_hash: B256,
    /// The block's timestamp, in seconds.
    pub timestamp: u64,
}

impl L1BlockRef {
    /// Creates a new `L1BlockRef`.
    pub const fn new(hash: B256, number: u64, parent_hash: B256, timestamp: u64) -> Self {
        Self { hash, number, parent_hash, timestamp }
    }
}

impl PartialEq for L1BlockRef {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for L1BlockRef {}

impl core::hash::Hash for L1BlockRef {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl core::fmt::Display for L1BlockRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.number, self.hash)
    }
}
