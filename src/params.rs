//! Parameters shared across the derivation pipeline.

/// Fixed accounting overhead charged per frame against the channel bank's size
/// budget, on top of the frame's raw payload length. Mirrors the on-chain tagging
/// overhead (channel ID, frame number, length prefix, `is_last` byte) so that a
/// bank full of many small frames is pruned as aggressively as one full of a few
/// large ones.
pub const FRAME_OVERHEAD: usize = 200;

/// The version byte prefixing the on-chain serialization of a sequence of frames.
/// Only version 0 is understood; any other value makes the blob unparseable.
pub const DERIVATION_VERSION_0: u8 = 0;

/// Byte length of the base (fixed-size) portion of an encoded frame, i.e. every
/// field except the variable-length payload: `channel_id ++ frame_number ++
/// frame_data_length ++ is_last`.
pub const FRAME_BASE_LEN: usize = 16 + 2 + 4 + 1;

/// Upper bound on a single frame's payload length, used to reject corrupt length
/// prefixes before they cause an out-of-bounds slice.
pub const MAX_FRAME_DATA_LEN: usize = 1_000_000;
