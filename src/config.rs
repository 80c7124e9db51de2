//! Configuration consumed by the channel bank and L1 traversal stages.

use crate::types::block::L1BlockRef;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Static parameters a pipeline embedding must supply. A trimmed-down
/// `RollupConfig`: only the fields the L1 traversal and channel bank stages
/// actually consult, since attribute-building and hardfork activation are out
/// of scope for this crate.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Number of L1 blocks a channel may remain open for, counted from the L1
    /// timestamp it was first observed at.
    pub channel_timeout: u64,
    /// Upper bound, in bytes, on the channel bank's total estimated size
    /// before the oldest channels are pruned.
    pub max_channel_bank_size: u64,
    /// The L1 block the L2 chain's genesis is anchored to. The reset protocol
    /// never walks the channel bank's origin back past this block.
    pub genesis_l1: L1BlockRef,
    /// The L1 chain ID, used only to disambiguate config mismatches between an
    /// embedding node and its configured L1 source.
    pub chain_id: u64,
}
