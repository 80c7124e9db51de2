//! The [`ChannelId`] type identifying a channel.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Byte length of a channel ID's wire encoding: an 8-byte big-endian timestamp
/// followed by an 8-byte opaque nonce.
pub const CHANNEL_ID_LENGTH: usize = 16;

/// Identifies a channel: the L1 timestamp at which it was opened, plus an opaque
/// nonce distinguishing channels opened in the same L1 block.
///
/// `Ord` is derived (by `time` then `nonce`) so a `ChannelId` can key a
/// `BTreeMap` if a caller wants channels in time order; the channel bank itself
/// uses a `HashMap` keyed by `ChannelId` plus a separate FIFO queue, matching
/// `spec.md`'s Data Model table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ChannelId {
    /// The L1 timestamp the channel was opened at.
    pub time: u64,
    /// An opaque uniquifier distinguishing channels opened at the same `time`.
    pub nonce: u64,
}

impl ChannelId {
    /// Creates a new `ChannelId`.
    pub const fn new(time: u64, nonce: u64) -> Self {
        Self { time, nonce }
    }

    /// Encodes the channel ID into its 16-byte wire form.
    pub fn to_bytes(self) -> [u8; CHANNEL_ID_LENGTH] {
        let mut out = [0u8; CHANNEL_ID_LENGTH];
        out[..8].copy_from_slice(&self.time.to_be_bytes());
        out[8..].copy_from_slice(&self.nonce.to_be_bytes());
        out
    }

    /// Decodes a channel ID from its 16-byte wire form.
    pub fn from_bytes(bytes: [u8; CHANNEL_ID_LENGTH]) -> Self {
        let time = u64::from_be_bytes(bytes[..8].try_into().expect("slice is 8 bytes"));
        let nonce = u64::from_be_bytes(bytes[8..].try_into().expect("slice is 8 bytes"));
        Self { time, nonce }
    }
}

impl core::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:016x}{:016x}", self.time, self.nonce)
    }
}
