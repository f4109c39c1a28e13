use beta_signal::channels::{self, JsonLinesSink, JsonLinesSource};
use beta_signal::config::{ChannelConfig, SchemaConfig};
use beta_signal::pipeline::{MessageSchema, MessageValidator, Pipeline};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries enriched messages only.
    // Block instead of dropping log lines when the writer falls behind.
    let (log_writer, _log_guard) = tracing_appender::non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(log_writer)
        .with_target(false)
        .init();

    let schema_config = SchemaConfig::from_env()?;
    let channel_config = ChannelConfig::from_env()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        symbol_pattern = %schema_config.symbol_pattern,
        max_symbol_len = schema_config.max_symbol_len,
        max_line_bytes = channel_config.max_line_bytes,
        "Beta signal relay starting"
    );

    let pipeline = Pipeline::new(MessageValidator::new(MessageSchema::new(schema_config)));

    let mut source = JsonLinesSource::new("stdin", BufReader::new(tokio::io::stdin()))
        .with_max_line_bytes(channel_config.max_line_bytes);
    let mut sink = JsonLinesSink::new("stdout", tokio::io::stdout());

    let stats = channels::relay(&pipeline, &mut source, &mut sink).await?;
    if stats.rejected + stats.malformed > 0 {
        tracing::warn!(
            rejected = stats.rejected,
            malformed = stats.malformed,
            "Some messages were not enriched"
        );
    }

    Ok(())
}
