//! Message validator — the only way to obtain a `ValidatedMessage`.
//!
//! Two gates, in order:
//! 1. Schema check (delegated to a `SchemaValidator`)
//! 2. Required keys: `symbol`, `timestamp`, `data`

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::PipelineError;
use crate::pipeline::schema::{MessageSchema, SchemaValidator, wrong_type};
use crate::pipeline::types::{RawMessage, ValidatedMessage};

/// Keys every message must carry, in reporting order.
pub const REQUIRED_KEYS: [&str; 3] = ["symbol", "timestamp", "data"];

/// Validates raw messages against a schema and the required-key contract.
pub struct MessageValidator {
    schema: Box<dyn SchemaValidator>,
}

impl MessageValidator {
    pub fn new(schema: impl SchemaValidator + 'static) -> Self {
        Self {
            schema: Box::new(schema),
        }
    }

    /// Check a raw message and tag it as validated.
    ///
    /// No values are copied or rewritten; keys other than the required three
    /// are kept in `ValidatedMessage::extra`.
    pub fn validate(&self, mut raw: RawMessage) -> Result<ValidatedMessage, PipelineError> {
        debug!(keys = raw.len(), "Validating message schema");

        if let Err(e) = self.schema.check(&raw) {
            error!(error = %e, payload = %payload_json(&raw), "Message schema invalid");
            return Err(e.into());
        }

        // A custom schema may let a present key through with the wrong JSON type.
        // Still a schema failure, so it is reported before missing keys.
        let mistyped = match (raw.get("symbol"), raw.get("data")) {
            (Some(symbol), _) if !symbol.is_string() => {
                Some(wrong_type("symbol", "a string", symbol))
            }
            (_, Some(data)) if !data.is_object() => {
                Some(wrong_type("data", "an object", data))
            }
            _ => None,
        };
        if let Some(e) = mistyped {
            error!(error = %e, payload = %payload_json(&raw), "Message schema invalid");
            return Err(e.into());
        }

        if let Some(key) = REQUIRED_KEYS.iter().find(|key| !raw.contains_key(**key)) {
            error!(
                missing = %key,
                payload = %payload_json(&raw),
                "Missing required keys in message"
            );
            return Err(PipelineError::MissingField(key.to_string()));
        }

        let symbol = match raw.remove("symbol") {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        let timestamp = raw.remove("timestamp").unwrap_or(Value::Null);
        let data = match raw.remove("data") {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        Ok(ValidatedMessage::new(symbol, timestamp, data, raw))
    }
}

impl Default for MessageValidator {
    fn default() -> Self {
        Self::new(MessageSchema::default())
    }
}

/// Compact JSON rendering of a payload for error traces.
pub(crate) fn payload_json(map: &Map<String, Value>) -> String {
    serde_json::to_string(map).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}
