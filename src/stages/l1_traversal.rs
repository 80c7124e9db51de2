//! The [`L1Traversal`] stage: a cursor that walks the L1 chain one block at a
//! time, detecting reorgs as it goes.

use crate::{
    context::StageContext,
    errors::{PipelineError, PipelineResult, ResetError},
    progress::Progress,
    traits::L1Provider,
    types::block::L1BlockRef,
};
use tracing::{debug, info};

/// Fetches the next L1 block and exposes it through [`Progress`].
///
/// This is the most upstream stage: it has no previous stage of its own, and
/// every other stage's [`Progress`] is ultimately downstream of this one's.
#[derive(Debug)]
pub struct L1Traversal<P: L1Provider> {
    l1: P,
    progress: Progress,
}

impl<P: L1Provider> L1Traversal<P> {
    /// Creates a new `L1Traversal`. Must be [`L1Traversal::reset`] before use.
    pub fn new(l1: P) -> Self {
        Self { l1, progress: Progress::default() }
    }

    /// The stage's current progress.
    pub const fn progress(&self) -> Progress {
        self.progress
    }

    /// A handle to the underlying L1 data source, for stages that need to walk
    /// the chain themselves (the channel bank's reset protocol).
    pub const fn l1(&self) -> &P {
        &self.l1
    }

    /// Advances to the next L1 block.
    ///
    /// The first call after the origin becomes closed elsewhere in the
    /// pipeline just closes this stage's own progress, giving the rest of the
    /// pipeline a chance to sweep the now-closed origin before traversal moves
    /// on. Only the following call actually fetches a new block.
    ///
    /// A reorg &mdash; the fetched block's parent hash disagreeing with the
    /// current origin &mdash; surfaces as [`ResetError::ReorgDetected`] and
    /// leaves `self.progress` untouched.
    pub async fn next_l1_block(&mut self, ctx: &StageContext) -> PipelineResult<()> {
        if !self.progress.closed {
            self.progress.closed = true;
            return Ok(());
        }

        if ctx.is_cancelled() {
            return Err(PipelineError::Eof.temp());
        }

        let origin = self.progress.origin;
        let next = self.l1.block_by_number(origin.number + 1).await;
        let next = match next {
            Ok(block) => block,
            Err(crate::traits::L1FetchError::NotFound) => {
                debug!(
                    target: "l1-traversal",
                    number = origin.number + 1,
                    %origin,
                    "can't find next L1 block info (yet)",
                );
                return Err(PipelineError::Eof.temp());
            }
            Err(crate::traits::L1FetchError::Transport(msg)) => {
                return Err(PipelineError::Provider(msg).temp());
            }
        };

        if origin.hash != next.parent_hash {
            return Err(ResetError::ReorgDetected(origin.hash, next.parent_hash).reset());
        }

        self.progress.origin = next;
        self.progress.closed = false;
        Ok(())
    }

    /// Resets this stage's progress to `inner`, closed. Always ends the reset
    /// sweep by reporting end-of-input, matching every other stage's
    /// `reset_step` contract.
    pub fn reset(&mut self, inner: Progress) -> PipelineResult<()> {
        self.progress.origin = inner.origin;
        self.progress.closed = true;
        info!(target: "l1-traversal", origin = %self.progress.origin, "completed reset of derivation pipeline");
        Err(PipelineError::Eof.temp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockL1Provider;
    use alloy_primitives::B256;

    fn block(number: u64, hash: u8, parent_hash: u8) -> L1BlockRef {
        L1BlockRef::new(B256::repeat_byte(hash), number, B256::repeat_byte(parent_hash), number * 2)
    }

    #[tokio::test]
    async fn first_call_after_open_only_closes() {
        let mut stage = L1Traversal::new(MockL1Provider::default());
        stage.progress = Progress::new(block(0, 0, 0));
        assert!(!stage.progress.closed);

        stage.next_l1_block(&StageContext::new()).await.unwrap();
        assert!(stage.progress.closed);
        assert_eq!(stage.progress.origin, block(0, 0, 0));
    }

    #[tokio::test]
    async fn advances_to_next_block_when_closed() {
        let next = block(1, 1, 0);
        let provider = MockL1Provider::default();
        provider.insert(next);

        let mut stage = L1Traversal::new(provider);
        stage.progress = Progress { origin: block(0, 0, 0), closed: true };

        stage.next_l1_block(&StageContext::new()).await.unwrap();
        assert_eq!(stage.progress.origin, next);
        assert!(!stage.progress.closed);
    }

    #[tokio::test]
    async fn detects_reorg_via_mismatched_parent_hash() {
        let conflicting = block(1, 1, 9); // parent_hash byte 9, not 0
        let provider = MockL1Provider::default();
        provider.insert(conflicting);

        let mut stage = L1Traversal::new(provider);
        stage.progress = Progress { origin: block(0, 0, 0), closed: true };

        let err = stage.next_l1_block(&StageContext::new()).await.unwrap_err();
        assert!(matches!(err, crate::errors::PipelineErrorKind::Reset(_)));
        // Progress must not have mutated.
        assert_eq!(stage.progress.origin, block(0, 0, 0));
    }

    #[tokio::test]
    async fn reports_eof_when_next_block_not_found_yet() {
        let provider = MockL1Provider::default();
        let mut stage = L1Traversal::new(provider);
        stage.progress = Progress { origin: block(0, 0, 0), closed: true };

        let err = stage.next_l1_block(&StageContext::new()).await.unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn reset_closes_at_inner_origin_and_reports_eof() {
        let mut stage = L1Traversal::new(MockL1Provider::default());
        let inner = Progress::new(block(5, 5, 4));
        let err = stage.reset(inner).unwrap_err();
        assert!(err.is_eof());
        assert_eq!(stage.progress.origin, inner.origin);
        assert!(stage.progress.closed);
    }
}
