//! Core data types of the derivation pipeline.

pub mod block;
pub mod channel;
pub mod channel_id;
pub mod frame;
