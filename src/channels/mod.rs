//! Transport adapters for feeding the pipeline.
//!
//! Adapters are pure I/O. Validation and enrichment live in `Pipeline`;
//! `relay` is the caller that decides what happens to rejected messages.

pub mod lines;
pub mod relay;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::pipeline::types::{EnrichedMessage, RawMessage};

pub use lines::{JsonLinesSink, JsonLinesSource};
pub use relay::{RelayStats, relay};

/// Supplies raw messages one at a time.
#[async_trait]
pub trait MessageSource: Send {
    /// Channel name for logging (e.g. "stdin").
    fn name(&self) -> &str;

    /// Next raw message, or `None` once the source is exhausted.
    ///
    /// A malformed message yields `Some(Err(ChannelError::Malformed { .. }))`
    /// and the source stays usable.
    async fn next_message(&mut self) -> Option<Result<RawMessage, ChannelError>>;
}

/// Consumes enriched messages.
#[async_trait]
pub trait MessageSink: Send {
    fn name(&self) -> &str;

    async fn send(&mut self, message: &EnrichedMessage) -> Result<(), ChannelError>;
}
