//! Core of a rollup derivation pipeline: the L1 traversal stage, the channel bank
//! stage, and the stage/progress framework they share.
//!
//! This crate deliberately stops short of a full derivation pipeline. Frame
//! bytewise-encoding beyond what the channel bank's state machine needs, the
//! L1 source (RPC/node embedding), and everything downstream of the channel bank
//! (batch queue, attributes builder, engine driver) are treated as external
//! collaborators and are not implemented here.

pub mod config;
pub mod context;
pub mod errors;
pub mod params;
pub mod pipeline;
pub mod progress;
pub mod stages;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

/// Commonly used types and traits, re-exported for downstream crates.
pub mod prelude {
    pub use crate::{
        config::Config,
        context::StageContext,
        errors::{PipelineError, PipelineErrorKind, PipelineResult, ResetError},
        pipeline::Driver,
        progress::Progress,
        stages::{channel_bank::ChannelBank, l1_traversal::L1Traversal},
        traits::{Downstream, L1FetchError, L1Provider},
        types::{block::L1BlockRef, channel::Channel, channel_id::ChannelId, frame::Frame},
    };
}
