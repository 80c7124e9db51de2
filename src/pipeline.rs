//! The minimal driver wiring [`L1Traversal`] and [`ChannelBank`] together per
//! the pull-stage contract: the downstream-most stage's [`Progress`] is
//! compared against its upstream neighbor's, and a step either makes
//! progress, reports end-of-input, or escalates to a reset.

use crate::{
    config::Config,
    context::StageContext,
    errors::{PipelineError, PipelineErrorKind, PipelineResult},
    stages::{channel_bank::ChannelBank, l1_traversal::L1Traversal},
    traits::{Downstream, L1Provider},
};
use std::time::Duration;
use tracing::warn;

/// Drives the L1 traversal and channel bank stages together.
///
/// A single [`Driver::step`] call makes progress on exactly one stage: it asks
/// the channel bank to step, and only falls through to advancing L1 traversal
/// once the channel bank reports end-of-input (nothing left to read until a
/// new L1 block is ingested).
#[derive(Debug)]
pub struct Driver<P: L1Provider, D: Downstream> {
    l1_traversal: L1Traversal<P>,
    channel_bank: ChannelBank<D>,
}

impl<P: L1Provider, D: Downstream> Driver<P, D> {
    /// Creates a new driver. Must be [`Driver::reset`] before the first
    /// [`Driver::step`] call.
    pub fn new(l1: P, cfg: Config, next: D) -> Self {
        Self { l1_traversal: L1Traversal::new(l1), channel_bank: ChannelBank::new(cfg, next) }
    }

    /// Advances the pipeline by one step.
    ///
    /// Returns `Ok(())` on made-progress, `Err` carrying
    /// [`PipelineError::Eof`] when both stages are caught up and there is
    /// nothing to do until new L1 data arrives, or a reset/critical error that
    /// the caller must act on before calling `step` again.
    pub async fn step(&mut self, ctx: &StageContext) -> PipelineResult<()> {
        match self.channel_bank.step(ctx, self.l1_traversal.progress()).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_eof() => self.l1_traversal.next_l1_block(ctx).await,
            Err(err) => Err(err),
        }
    }

    /// Runs the two-phase reset protocol to completion: walks the channel
    /// bank's reset_step until it finds a safe origin, then resets L1
    /// traversal to that origin.
    pub async fn reset(&mut self, ctx: &StageContext) -> PipelineResult<()> {
        loop {
            if ctx.is_cancelled() {
                return Err(PipelineError::Eof.temp());
            }
            match self.channel_bank.reset_step(ctx, self.l1_traversal.l1()).await {
                Ok(()) => continue,
                Err(err) if err.is_eof() => break,
                Err(err) => return Err(err),
            }
        }

        match self.l1_traversal.reset(self.channel_bank.progress()) {
            Err(err) if err.is_eof() => Ok(()),
            other => other,
        }
    }

    /// Drives the pipeline until end-of-input or a critical error: calls
    /// [`Driver::step`] in a loop, running [`Driver::reset`] whenever a
    /// reset-error is reported and backing off with an increasing delay after
    /// each temporary error (other than end-of-input, which is returned to
    /// the caller so it can decide when to look for new L1 data).
    pub async fn run(&mut self, ctx: &StageContext) -> PipelineResult<()> {
        let mut attempt = 0usize;
        loop {
            if ctx.is_cancelled() {
                return Err(PipelineError::Eof.temp());
            }
            match self.step(ctx).await {
                Ok(()) => attempt = 0,
                Err(err) if err.is_eof() => return Err(err),
                Err(PipelineErrorKind::Reset(_)) => {
                    self.reset(ctx).await?;
                    attempt = 0;
                }
                Err(PipelineErrorKind::Temporary(inner)) => {
                    attempt += 1;
                    let delay = backoff_delay(attempt);
                    warn!(target: "pipeline", %inner, attempt, ?delay, "temporary error, backing off");
                    tokio::time::sleep(delay).await;
                }
                Err(err @ PipelineErrorKind::Critical(_)) => return Err(err),
            }
        }
    }
}

/// Exponential backoff with a 30 second cap.
fn backoff_delay(attempt: usize) -> Duration {
    let secs = 2u64.saturating_pow(attempt.min(5) as u32);
    Duration::from_secs(secs.min(30))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        progress::Progress,
        test_utils::{MockDownstream, MockL1Provider},
        types::block::L1BlockRef,
    };
    use alloy_primitives::B256;

    fn block(number: u64, timestamp: u64, hash: u8, parent_hash: u8) -> L1BlockRef {
        L1BlockRef::new(B256::repeat_byte(hash), number, B256::repeat_byte(parent_hash), timestamp)
    }

    fn cfg(genesis: L1BlockRef) -> Config {
        Config { channel_timeout: 10, max_channel_bank_size: 100_000, genesis_l1: genesis, chain_id: 1 }
    }

    #[tokio::test]
    async fn reset_settles_both_stages_at_genesis() {
        let genesis = block(0, 0, 0, 0);
        let provider = MockL1Provider::default();
        let downstream = MockDownstream { progress: Progress::new(genesis), ..Default::default() };
        let mut driver = Driver::new(provider, cfg(genesis), downstream);

        driver.reset(&StageContext::new()).await.unwrap();
        assert_eq!(driver.channel_bank.progress().origin, genesis);
        assert_eq!(driver.l1_traversal.progress().origin, genesis);
        assert!(driver.l1_traversal.progress().closed);
    }

    #[test]
    fn backoff_delay_grows_then_caps_at_thirty_seconds() {
        assert_eq!(backoff_delay(0), std::time::Duration::from_secs(1));
        assert_eq!(backoff_delay(1), std::time::Duration::from_secs(2));
        assert_eq!(backoff_delay(5), std::time::Duration::from_secs(30));
        assert_eq!(backoff_delay(50), std::time::Duration::from_secs(30));
    }

    #[tokio::test]
    async fn run_returns_eof_once_no_new_l1_blocks_are_available() {
        let genesis = block(0, 0, 0, 0);
        let provider = MockL1Provider::default(); // no further blocks registered
        let downstream = MockDownstream { progress: Progress::new(genesis), ..Default::default() };
        let mut driver = Driver::new(provider, cfg(genesis), downstream);
        driver.reset(&StageContext::new()).await.unwrap();

        let err = driver.run(&StageContext::new()).await.unwrap_err();
        assert!(err.is_eof());
    }

    #[tokio::test]
    async fn step_falls_through_to_l1_traversal_on_eof() {
        let genesis = block(0, 0, 0, 0);
        let next_block = block(1, 1, 1, 0);
        let provider = MockL1Provider::default();
        provider.insert(next_block);

        let downstream = MockDownstream { progress: Progress::new(genesis), ..Default::default() };
        let mut driver = Driver::new(provider, cfg(genesis), downstream);
        driver.reset(&StageContext::new()).await.unwrap();

        // Channel bank has nothing to read, so the step must fall through and
        // advance L1 traversal instead of reporting Eof itself. The genesis
        // origin was already closed by reset, so this step fetches the block
        // after it.
        driver.step(&StageContext::new()).await.unwrap();
        assert_eq!(driver.l1_traversal.progress().origin, next_block);
        assert!(!driver.l1_traversal.progress().closed);
    }
}
