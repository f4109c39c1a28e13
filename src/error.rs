//! Error types for the beta signal pipeline.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Transport errors raised while reading raw messages or writing enriched ones.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Malformed message on channel {name}: {reason}")]
    Malformed { name: String, reason: String },

    #[error("Failed to encode message for channel {name}: {reason}")]
    Encode { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A raw message that does not satisfy the schema contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("field `{field}` must be {expected}, found {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid symbol {symbol:?}: {reason}")]
    InvalidSymbol { symbol: String, reason: String },

    #[error("invalid timestamp {value}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("{0}")]
    Rejected(String),
}

/// Pipeline-related errors. Both variants are terminal for the current message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid message format: {0}")]
    Schema(#[from] SchemaError),

    #[error("Message is missing required key: {0}")]
    MissingField(String),
}

impl PipelineError {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Schema(_) => "schema",
            Self::MissingField(_) => "missing_field",
        }
    }
}
