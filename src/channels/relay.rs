//! Relay loop — source → pipeline → sink.
//!
//! Rejected and malformed messages are logged and counted, never retried.
//! I/O failures on either side stop the relay.

use tracing::{error, info, warn};

use crate::channels::{MessageSink, MessageSource};
use crate::error::ChannelError;
use crate::pipeline::Pipeline;

/// Counters for one relay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Lines decoded into raw messages.
    pub received: u64,
    /// Messages enriched and written to the sink.
    pub enriched: u64,
    /// Messages the pipeline rejected.
    pub rejected: u64,
    /// Lines that were not a JSON object.
    pub malformed: u64,
}

/// Drive messages from `source` through `pipeline` into `sink` until the source ends.
pub async fn relay(
    pipeline: &Pipeline,
    source: &mut dyn MessageSource,
    sink: &mut dyn MessageSink,
) -> Result<RelayStats, ChannelError> {
    info!(source = source.name(), sink = sink.name(), "Relay started");

    let mut stats = RelayStats::default();
    while let Some(next) = source.next_message().await {
        let raw = match next {
            Ok(raw) => raw,
            Err(ChannelError::Malformed { name, reason }) => {
                stats.malformed += 1;
                warn!(channel = %name, reason = %reason, "Skipping malformed message");
                continue;
            }
            Err(e) => {
                error!(error = %e, "Source failed, stopping relay");
                return Err(e);
            }
        };
        stats.received += 1;

        match pipeline.process(raw) {
            Ok(enriched) => {
                sink.send(&enriched).await?;
                stats.enriched += 1;
            }
            Err(e) => {
                stats.rejected += 1;
                warn!(kind = e.label(), error = %e, "Message rejected");
            }
        }
    }

    info!(
        received = stats.received,
        enriched = stats.enriched,
        rejected = stats.rejected,
        malformed = stats.malformed,
        "Relay finished"
    );
    Ok(stats)
}
