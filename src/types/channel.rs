//! The [`Channel`] type: accumulated frame state for a single channel ID.

use crate::{
    params::FRAME_OVERHEAD,
    types::{channel_id::ChannelId, frame::Frame},
};
use alloy_primitives::Bytes;
use std::collections::BTreeMap;
use thiserror::Error;

/// A frame rejected by [`Channel::add_frame`]. None of these mutate the channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelFrameError {
    /// The frame's `id` does not match this channel's ID.
    #[error("frame id does not match channel id")]
    WrongChannel,
    /// A closing frame arrived for a channel that is already closed.
    #[error("channel already closed by frame {0}")]
    AlreadyClosed(u16),
    /// This frame number has already been ingested.
    #[error("duplicate frame number {0}")]
    DuplicateFrameNumber(u16),
    /// The channel is closed and this frame's number is at or past the closing
    /// frame's number.
    #[error("frame number {0} at or past closing frame number {1}")]
    PastClosingFrame(u16, u16),
}

/// A channel is the reassembly buffer for the frames belonging to one
/// [`ChannelId`]. Frames may arrive out of order; the channel is ready for
/// reading once the closing frame has arrived and every frame number in
/// `0..=last_frame_number` has been buffered.
#[derive(Debug, Clone)]
pub struct Channel {
    id: ChannelId,
    estimated_size: usize,
    closed: bool,
    highest_frame_number: u16,
    last_frame_number: u16,
    inputs: BTreeMap<u16, Frame>,
}

impl Channel {
    /// Creates a new, empty channel.
    pub fn new(id: ChannelId) -> Self {
        Self {
            id,
            estimated_size: 0,
            closed: false,
            highest_frame_number: 0,
            last_frame_number: 0,
            inputs: BTreeMap::new(),
        }
    }

    /// The channel's ID.
    pub const fn id(&self) -> ChannelId {
        self.id
    }

    /// Buffers `frame`.
    ///
    /// Rejects, without mutating any state, a frame that: belongs to a
    /// different channel, closes an already-closed channel, repeats a frame
    /// number already seen, or sits at or past a previously-seen closing
    /// frame's number.
    pub fn add_frame(&mut self, frame: Frame) -> Result<(), ChannelFrameError> {
        if frame.id != self.id {
            return Err(ChannelFrameError::WrongChannel);
        }
        if frame.is_last && self.closed {
            return Err(ChannelFrameError::AlreadyClosed(self.last_frame_number));
        }
        if self.inputs.contains_key(&frame.frame_number) {
            return Err(ChannelFrameError::DuplicateFrameNumber(frame.frame_number));
        }
        if self.closed && frame.frame_number >= self.last_frame_number {
            return Err(ChannelFrameError::PastClosingFrame(
                frame.frame_number,
                self.last_frame_number,
            ));
        }

        if frame.is_last {
            self.last_frame_number = frame.frame_number;
            self.closed = true;

            // A closing frame may arrive after higher-numbered frames that are now
            // known to be garbage; drop them and reclaim their size.
            if self.last_frame_number < self.highest_frame_number {
                let last = self.last_frame_number;
                let mut reclaimed = 0usize;
                self.inputs.retain(|&number, frame| {
                    let keep = number < last;
                    if !keep {
                        reclaimed += frame.size();
                    }
                    keep
                });
                self.estimated_size -= reclaimed;
                self.highest_frame_number = self.last_frame_number;
            }
        }

        if frame.frame_number > self.highest_frame_number {
            self.highest_frame_number = frame.frame_number;
        }

        self.estimated_size += frame.size();
        self.inputs.insert(frame.frame_number, frame);
        Ok(())
    }

    /// The channel's estimated in-memory footprint: the sum of each buffered
    /// frame's payload length plus [`FRAME_OVERHEAD`].
    pub const fn size(&self) -> usize {
        self.estimated_size
    }

    /// `true` once the closing frame has arrived and every frame number from
    /// `0` to `last_frame_number` has been buffered.
    pub fn is_ready(&self) -> bool {
        if !self.closed {
            return false;
        }
        if self.inputs.len() != self.last_frame_number as usize + 1 {
            return false;
        }
        (0..=self.last_frame_number).all(|i| self.inputs.contains_key(&i))
    }

    /// Concatenates the contiguous run of buffered frames starting at frame
    /// `0`, stopping at the first gap.
    ///
    /// When [`Channel::is_ready`] is `true` this is exactly the channel's full
    /// payload. When the channel has merely timed out, this is whatever
    /// prefix of the payload happened to arrive before the timeout; it is up
    /// to the caller (the channel bank's consumer) to decide whether a
    /// partial payload is useful.
    pub fn frame_data(&self) -> Bytes {
        let mut data = Vec::new();
        let mut i = 0u16;
        while let Some(frame) = self.inputs.get(&i) {
            data.extend_from_slice(&frame.data);
            match i.checked_add(1) {
                Some(next) => i = next,
                None => break,
            }
        }
        data.into()
    }
}
