//! The [`Frame`] type and its on-chain codec.
//!
//! *Encoding*: `frame = channel_id ++ frame_number ++ frame_data_length ++
//! frame_data ++ is_last`, where `channel_id` is 16 bytes, `frame_number` is a
//! big-endian `u16`, `frame_data_length` is a big-endian `u32`, and `is_last` is
//! a single byte. A blob of one or more frames is itself prefixed by a single
//! derivation-version byte.

use crate::{
    params::{DERIVATION_VERSION_0, FRAME_BASE_LEN, FRAME_OVERHEAD, MAX_FRAME_DATA_LEN},
    types::channel_id::{ChannelId, CHANNEL_ID_LENGTH},
};
use alloy_primitives::Bytes;
use thiserror::Error;

/// A channel frame is one transport-unit of a channel's data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    /// The channel this frame belongs to.
    pub id: ChannelId,
    /// This frame's position within the channel.
    pub frame_number: u16,
    /// Whether this is the last frame in the channel.
    pub is_last: bool,
    /// The frame's payload.
    pub data: Bytes,
}

/// A malformed frame or frame blob. The codec is all-or-nothing: any error here
/// means zero frames are returned, never a partial list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameDecodeError {
    /// The blob was empty.
    #[error("empty frame blob")]
    EmptyBlob,
    /// The blob's version byte was not [`DERIVATION_VERSION_0`].
    #[error("unsupported derivation version {0}")]
    UnsupportedVersion(u8),
    /// Fewer bytes remained than a frame's fixed-size header requires.
    #[error("frame too short to decode")]
    FrameTooShort,
    /// The frame's declared payload length exceeds [`MAX_FRAME_DATA_LEN`], or
    /// claims more bytes than remain in the blob.
    #[error("frame payload length {0} out of bounds")]
    PayloadLenOutOfBounds(usize),
    /// Bytes remained after the last frame was decoded, or none did.
    #[error("frame data length mismatch")]
    TrailingOrMissingData,
}

impl Frame {
    /// Encodes this frame into its wire form (without the blob-level version byte).
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FRAME_BASE_LEN + self.data.len());
        out.extend_from_slice(&self.id.to_bytes());
        out.extend_from_slice(&self.frame_number.to_be_bytes());
        out.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.data);
        out.push(self.is_last as u8);
        out
    }

    /// Decodes a single frame from the front of `encoded`, returning the number
    /// of bytes consumed and the frame.
    pub fn decode(encoded: &[u8]) -> Result<(usize, Self), FrameDecodeError> {
        if encoded.len() < FRAME_BASE_LEN {
            return Err(FrameDecodeError::FrameTooShort);
        }

        let mut id_bytes = [0u8; CHANNEL_ID_LENGTH];
        id_bytes.copy_from_slice(&encoded[..CHANNEL_ID_LENGTH]);
        let id = ChannelId::from_bytes(id_bytes);

        let mut cursor = CHANNEL_ID_LENGTH;
        let frame_number = u16::from_be_bytes([encoded[cursor], encoded[cursor + 1]]);
        cursor += 2;

        let data_len = u32::from_be_bytes(encoded[cursor..cursor + 4].try_into().unwrap()) as usize;
        cursor += 4;

        if data_len > MAX_FRAME_DATA_LEN || encoded.len() < cursor + data_len + 1 {
            return Err(FrameDecodeError::PayloadLenOutOfBounds(data_len));
        }

        let data = Bytes::copy_from_slice(&encoded[cursor..cursor + data_len]);
        cursor += data_len;
        let is_last = encoded[cursor] == 1;
        cursor += 1;

        Ok((cursor, Self { id, frame_number, is_last, data }))
    }

    /// Parses the on-chain serialization of one or more frames packed into a
    /// single L1 transaction's payload. All frames must decode without error and
    /// no bytes may be left over; otherwise, zero frames are returned.
    pub fn parse_frames(encoded: &[u8]) -> Result<Vec<Self>, FrameDecodeError> {
        let (version, rest) = encoded.split_first().ok_or(FrameDecodeError::EmptyBlob)?;
        if *version != DERIVATION_VERSION_0 {
            return Err(FrameDecodeError::UnsupportedVersion(*version));
        }

        let mut frames = Vec::new();
        let mut offset = 0;
        while offset < rest.len() {
            let (consumed, frame) = Self::decode(&rest[offset..])?;
            frames.push(frame);
            offset += consumed;
        }

        if offset != rest.len() || frames.is_empty() {
            return Err(FrameDecodeError::TrailingOrMissingData);
        }

        Ok(frames)
    }

    /// The frame's contribution to a channel's size budget: its payload length
    /// plus the fixed per-frame bookkeeping overhead.
    pub fn size(&self) -> usize {
        self.data.len() + FRAME_OVERHEAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: ChannelId, number: u16, data: &[u8], is_last: bool) -> Frame {
        Frame { id, frame_number: number, is_last, data: Bytes::copy_from_slice(data) }
    }

    #[test]
    fn encode_decode_roundtrip() {
        let f = frame(ChannelId::new(10, 1), 0xEE, &[0xDD; 50], true);
        let (consumed, decoded) = Frame::decode(&f.encode()).unwrap();
        assert_eq!(consumed, f.encode().len());
        assert_eq!(decoded, f);
    }

    #[test]
    fn parse_frames_decodes_concatenated_blob() {
        let f = frame(ChannelId::new(10, 1), 0, &[0xAA; 4], false);
        let g = frame(ChannelId::new(10, 1), 1, &[0xBB; 4], true);
        let mut bytes = vec![DERIVATION_VERSION_0];
        bytes.extend(f.encode());
        bytes.extend(g.encode());

        let frames = Frame::parse_frames(&bytes).unwrap();
        assert_eq!(frames, vec![f, g]);
    }

    #[test]
    fn parse_frames_rejects_wrong_version() {
        let err = Frame::parse_frames(&[7, 0, 0]).unwrap_err();
        assert_eq!(err, FrameDecodeError::UnsupportedVersion(7));
    }

    #[test]
    fn parse_frames_rejects_trailing_garbage() {
        let f = frame(ChannelId::new(10, 1), 0, &[0xAA; 4], true);
        let mut bytes = vec![DERIVATION_VERSION_0];
        bytes.extend(f.encode());
        bytes.push(0xFF); // one extra, meaningless byte

        assert_eq!(Frame::parse_frames(&bytes).unwrap_err(), FrameDecodeError::FrameTooShort);
    }

    #[test]
    fn parse_frames_rejects_empty_blob() {
        assert_eq!(Frame::parse_frames(&[]).unwrap_err(), FrameDecodeError::EmptyBlob);
    }

    #[test]
    fn all_or_nothing_one_bad_frame_drops_all() {
        let good = frame(ChannelId::new(10, 1), 0, &[0xAA; 4], false);
        let mut bytes = vec![DERIVATION_VERSION_0];
        bytes.extend(good.encode());
        // A second, truncated frame header.
        bytes.extend_from_slice(&[0u8; 5]);

        assert!(Frame::parse_frames(&bytes).is_err());
    }
}
