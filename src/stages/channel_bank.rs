//! The [`ChannelBank`] stage: aggregates frames into channels, prunes the
//! bank when it grows too large, and hands finished channel payloads to the
//! next stage.
//!
//! Note: pruning happens before ingest, not after. The bank is never allowed
//! to exceed its size budget between successive calls to `ingest_data`; it
//! may briefly exceed the budget between an ingest and the read that follows
//! it.

use crate::{
    config::Config,
    context::StageContext,
    errors::{PipelineError, PipelineResult},
    progress::Progress,
    traits::{Downstream, L1Provider},
    types::{channel::Channel, channel_id::ChannelId, frame::Frame},
};
use alloy_primitives::Bytes;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, trace, warn};

/// Buffers channel frames ingested from L1 data, and emits full (or
/// timed-out) channel payloads to the next stage.
#[derive(Debug)]
pub struct ChannelBank<D: Downstream> {
    cfg: Config,
    channels: HashMap<ChannelId, Channel>,
    channel_queue: VecDeque<ChannelId>,
    progress: Progress,
    resetting: bool,
    next: D,
}

impl<D: Downstream> ChannelBank<D> {
    /// Creates a new `ChannelBank`. Must be reset (via [`ChannelBank::reset_step`])
    /// before use.
    pub fn new(cfg: Config, next: D) -> Self {
        Self {
            cfg,
            channels: HashMap::new(),
            channel_queue: VecDeque::new(),
            progress: Progress::default(),
            resetting: false,
            next,
        }
    }

    /// The stage's current progress.
    pub const fn progress(&self) -> Progress {
        self.progress
    }

    /// Total estimated size across every buffered channel.
    pub fn size(&self) -> usize {
        self.channels.values().map(Channel::size).sum()
    }

    /// Evicts channels from the front of the FIFO queue until the bank's
    /// total size is back under [`Config::max_channel_bank_size`].
    pub fn prune(&mut self) -> PipelineResult<()> {
        let mut total_size = self.size() as u64;
        while total_size > self.cfg.max_channel_bank_size {
            let id = self
                .channel_queue
                .pop_front()
                .ok_or(PipelineError::InconsistentState("queue empty while over size budget").crit())?;
            let channel = self
                .channels
                .remove(&id)
                .ok_or(PipelineError::InconsistentState("queued channel missing from map").crit())?;
            total_size -= channel.size() as u64;
        }
        Ok(())
    }

    /// Adds new L1 frame data to the channel bank.
    ///
    /// Callers must have drained every ready channel via
    /// [`ChannelBank::read`] before calling this again; ingesting while the
    /// stage's origin is closed is a caller bug, not a runtime error.
    pub fn ingest_data(&mut self, data: &[u8]) -> PipelineResult<()> {
        assert!(!self.progress.closed, "write data to channel bank while closed");
        debug!(
            target: "channel-bank",
            origin = %self.progress.origin,
            data_len = data.len(),
            "channel bank got new data",
        );

        self.prune()?;

        let frames = match Frame::parse_frames(data) {
            Ok(frames) => frames,
            Err(err) => {
                warn!(target: "channel-bank", %err, "malformed frame data, dropping");
                return Ok(());
            }
        };

        for frame in frames {
            self.ingest_frame(frame)?;
        }
        Ok(())
    }

    fn ingest_frame(&mut self, frame: Frame) -> PipelineResult<()> {
        let origin = self.progress.origin;

        if frame.id.time + self.cfg.channel_timeout < origin.timestamp {
            warn!(
                target: "channel-bank",
                channel = %frame.id,
                frame_number = frame.frame_number,
                "channel is timed out, ignoring frame",
            );
            return Ok(());
        }
        if frame.id.time > origin.timestamp {
            warn!(
                target: "channel-bank",
                channel = %frame.id,
                frame_number = frame.frame_number,
                "channel claims to be from the future, ignoring frame",
            );
            return Ok(());
        }

        if !self.channels.contains_key(&frame.id) {
            self.channels.insert(frame.id, Channel::new(frame.id));
            self.channel_queue.push_back(frame.id);
        }

        trace!(
            target: "channel-bank",
            channel = %frame.id,
            frame_number = frame.frame_number,
            length = frame.data.len(),
            "ingesting frame",
        );

        let channel = self.channels.get_mut(&frame.id).expect("just inserted above");
        let frame_id = frame.id;
        let frame_number = frame.frame_number;
        if channel.add_frame(frame).is_err() {
            warn!(
                target: "channel-bank",
                channel = %frame_id,
                frame_number,
                "failed to add frame to channel",
            );
        }

        Ok(())
    }

    /// Reads the raw payload of the first channel in FIFO order, if it is
    /// either ready or timed out. Returns [`PipelineError::Eof`] if there is
    /// nothing new to read.
    pub fn read(&mut self) -> PipelineResult<Bytes> {
        let &first = self.channel_queue.front().ok_or(PipelineError::Eof.temp())?;
        let channel = self
            .channels
            .get(&first)
            .ok_or(PipelineError::InconsistentState("queued channel missing from map").crit())?;

        let timed_out = channel.id().time + self.cfg.channel_timeout < self.progress.origin.timestamp;
        if timed_out {
            debug!(target: "channel-bank", channel = %first, "channel timed out");
        }
        if !timed_out && !channel.is_ready() {
            return Err(PipelineError::Eof.temp());
        }
        if channel.is_ready() {
            debug!(target: "channel-bank", channel = %first, "channel ready");
        }

        self.channel_queue.pop_front();
        let channel = self.channels.remove(&first).expect("presence just checked above");
        Ok(channel.frame_data())
    }

    /// Advances the channel bank by one step: reconciles progress against the
    /// next stage's origin, then either replays stale data (if the bank is
    /// behind) or emits the next ready/timed-out channel downstream.
    pub async fn step(&mut self, ctx: &StageContext, outer: Progress) -> PipelineResult<()> {
        if self.progress.update(outer)? {
            return Ok(());
        }

        if self.next.progress().origin.number > self.progress.origin.number {
            self.read()?;
            return Ok(());
        }

        let data = self.read()?;
        self.next.write_channel(ctx, data).await.map_err(PipelineError::temp)?;
        Ok(())
    }

    /// Walks the L1 chain backward from the next stage's current origin to
    /// find a safe reset origin for the channel bank: far enough back that
    /// any channel data before it would already have timed out by the time
    /// the bank catches back up, so it is safe not to replay it.
    ///
    /// Must be called repeatedly until it returns `Err` with
    /// [`PipelineErrorKind::is_eof`] true.
    pub async fn reset_step(&mut self, ctx: &StageContext, l1: &impl L1Provider) -> PipelineResult<()> {
        if !self.resetting {
            self.progress = self.next.progress();
            self.resetting = true;
            return Ok(());
        }

        let next_origin = self.next.progress().origin;
        if self.progress.origin.timestamp + self.cfg.channel_timeout < next_origin.timestamp
            || self.progress.origin.number <= self.cfg.genesis_l1.number
        {
            debug!(target: "channel-bank", origin = %self.progress.origin, "found reset origin for channel bank");
            self.resetting = false;
            return Err(PipelineError::Eof.temp());
        }

        if ctx.is_cancelled() {
            return Err(PipelineError::Eof.temp());
        }

        debug!(target: "channel-bank", origin = %self.progress.origin, "walking back to find reset origin for channel bank");
        let parent = l1
            .block_by_hash(self.progress.origin.parent_hash)
            .await
            .map_err(|e| PipelineError::Provider(e.to_string()).temp())?;
        self.progress.origin = parent;
        Ok(())
    }
}
