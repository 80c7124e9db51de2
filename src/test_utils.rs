//! Test doubles for the traits in [`crate::traits`], shared by the stage unit
//! tests.

use crate::{
    context::StageContext,
    errors::PipelineError,
    progress::Progress,
    traits::{Downstream, L1FetchError, L1Provider},
    types::block::L1BlockRef,
};
use alloy_primitives::Bytes;
use async_trait::async_trait;
use std::{collections::HashMap, sync::Mutex};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{layer::Context, Layer};

/// An in-memory [`L1Provider`] keyed by block number, with reorgs modeled by
/// simply overwriting the entry at a number with a new hash/parent.
#[derive(Debug, Default)]
pub(crate) struct MockL1Provider {
    by_number: Mutex<HashMap<u64, L1BlockRef>>,
}

impl MockL1Provider {
    /// Inserts or overwrites the block at `block.number`.
    pub(crate) fn insert(&self, block: L1BlockRef) {
        self.by_number.lock().unwrap().insert(block.number, block);
    }
}

#[async_trait]
impl L1Provider for MockL1Provider {
    async fn block_by_number(&self, number: u64) -> Result<L1BlockRef, L1FetchError> {
        self.by_number.lock().unwrap().get(&number).copied().ok_or(L1FetchError::NotFound)
    }

    async fn block_by_hash(&self, hash: alloy_primitives::B256) -> Result<L1BlockRef, L1FetchError> {
        self.by_number
            .lock()
            .unwrap()
            .values()
            .find(|b| b.hash == hash)
            .copied()
            .ok_or(L1FetchError::NotFound)
    }
}

/// A [`Downstream`] double that records every channel payload it was handed.
#[derive(Debug, Default)]
pub(crate) struct MockDownstream {
    pub(crate) progress: Progress,
    pub(crate) received: Vec<Bytes>,
    pub(crate) reject_next: bool,
}

#[async_trait]
impl Downstream for MockDownstream {
    fn progress(&self) -> Progress {
        self.progress
    }

    async fn write_channel(&mut self, _ctx: &StageContext, data: Bytes) -> Result<(), PipelineError> {
        if self.reject_next {
            self.reject_next = false;
            return Err(PipelineError::NotEnoughData);
        }
        self.received.push(data);
        Ok(())
    }
}

/// Shared storage backing [`CollectingLayer`], queryable by level after a test
/// has run a stage operation.
#[derive(Debug, Default, Clone)]
pub(crate) struct TraceStorage(std::sync::Arc<Mutex<Vec<(Level, String)>>>);

impl TraceStorage {
    /// Returns every collected message at the given level, in emission order.
    pub(crate) fn get_by_level(&self, level: Level) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(l, message)| (*l == level).then(|| message.clone()))
            .collect()
    }
}

/// A `tracing_subscriber::Layer` that records every event into a [`TraceStorage`],
/// so a test can assert a stage logged (or didn't log) something, without
/// installing a global subscriber.
#[derive(Debug, Default)]
pub(crate) struct CollectingLayer {
    pub(crate) storage: TraceStorage,
}

impl<S: Subscriber> Layer<S> for CollectingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        let message = format!("{event:?}");
        self.storage.0.lock().unwrap().push((level, message));
    }
}
