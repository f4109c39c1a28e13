//! Schema contract for raw messages.
//!
//! The schema only constrains keys that are present. Whether the mandatory
//! keys exist at all is the validator's second step, so a message that is
//! both mistyped and incomplete is reported as a schema failure.

use chrono::DateTime;
use serde_json::Value;

use crate::config::SchemaConfig;
use crate::error::SchemaError;
use crate::pipeline::types::RawMessage;

/// Structural/type check applied to every raw message before key checks.
pub trait SchemaValidator: Send + Sync {
    /// Accept or reject the raw mapping.
    fn check(&self, raw: &RawMessage) -> Result<(), SchemaError>;
}

/// Default schema for market data messages.
///
/// - `symbol`: non-empty string matching the configured pattern and length
/// - `timestamp`: non-negative epoch number or RFC 3339 string
/// - `data`: object
#[derive(Debug, Clone, Default)]
pub struct MessageSchema {
    config: SchemaConfig,
}

impl MessageSchema {
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }

    fn check_symbol(&self, value: &Value) -> Result<(), SchemaError> {
        let Value::String(symbol) = value else {
            return Err(wrong_type("symbol", "a string", value));
        };

        let reason = if symbol.is_empty() {
            Some("must not be empty".to_string())
        } else if symbol.chars().count() > self.config.max_symbol_len {
            Some(format!(
                "longer than {} characters",
                self.config.max_symbol_len
            ))
        } else if !self.config.symbol_pattern.is_match(symbol) {
            Some(format!(
                "does not match pattern {}",
                self.config.symbol_pattern.as_str()
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(SchemaError::InvalidSymbol {
                symbol: symbol.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

impl SchemaValidator for MessageSchema {
    fn check(&self, raw: &RawMessage) -> Result<(), SchemaError> {
        if let Some(symbol) = raw.get("symbol") {
            self.check_symbol(symbol)?;
        }
        if let Some(timestamp) = raw.get("timestamp") {
            check_timestamp(timestamp)?;
        }
        if let Some(data) = raw.get("data")
            && !data.is_object()
        {
            return Err(wrong_type("data", "an object", data));
        }
        Ok(())
    }
}

/// Any closure over the raw mapping can stand in as a schema.
impl<F> SchemaValidator for F
where
    F: Fn(&RawMessage) -> Result<(), SchemaError> + Send + Sync,
{
    fn check(&self, raw: &RawMessage) -> Result<(), SchemaError> {
        self(raw)
    }
}

fn check_timestamp(value: &Value) -> Result<(), SchemaError> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(secs) if secs >= 0.0 => Ok(()),
            _ => Err(SchemaError::InvalidTimestamp {
                value: n.to_string(),
                reason: "epoch timestamp must be non-negative".into(),
            }),
        },
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|_| ())
            .map_err(|e| SchemaError::InvalidTimestamp {
                value: s.clone(),
                reason: format!("not RFC 3339: {e}"),
            }),
        other => Err(wrong_type("timestamp", "a number or an RFC 3339 string", other)),
    }
}

pub(crate) fn wrong_type(field: &str, expected: &'static str, found: &Value) -> SchemaError {
    SchemaError::WrongType {
        field: field.to_string(),
        expected,
        found: json_kind(found),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
