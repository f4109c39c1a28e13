//! Shared types for the signal pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Raw message ─────────────────────────────────────────────────────

/// Untyped message as received from the transport. No guarantees.
pub type RawMessage = Map<String, Value>;

// ── Validated message ───────────────────────────────────────────────

/// A message that passed the schema and required-key checks.
///
/// Only `MessageValidator` can build one. Values are moved out of the raw
/// mapping unchanged; downstream code gets read-only access.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMessage {
    symbol: String,
    timestamp: Value,
    data: Map<String, Value>,
    extra: Map<String, Value>,
}

impl ValidatedMessage {
    pub(in crate::pipeline) fn new(
        symbol: String,
        timestamp: Value,
        data: Map<String, Value>,
        extra: Map<String, Value>,
    ) -> Self {
        Self {
            symbol,
            timestamp,
            data,
            extra,
        }
    }

    /// Instrument identifier.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Timestamp exactly as it arrived (epoch number or RFC 3339 string).
    pub fn timestamp(&self) -> &Value {
        &self.timestamp
    }

    /// Nested feature payload.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Top-level keys beyond `symbol`, `timestamp` and `data`.
    ///
    /// The enriched output does not carry these. Callers that use
    /// `MessageValidator` directly can read envelope metadata (venue, source,
    /// sequence numbers) here before the message is enriched.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub(in crate::pipeline) fn into_data(self) -> (String, Value, Map<String, Value>) {
        (self.symbol, self.timestamp, self.data)
    }
}

// ── Signal result ───────────────────────────────────────────────────

/// Fields computed for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub symbol: String,
    pub timestamp: Value,
    pub beta_score: f64,
}

impl SignalResult {
    /// Flatten into JSON fields for merging into a payload.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("symbol".into(), Value::String(self.symbol));
        fields.insert("timestamp".into(), self.timestamp);
        fields.insert("beta_score".into(), Value::from(self.beta_score));
        fields
    }
}

// ── Enriched message ────────────────────────────────────────────────

/// Final output: the original payload plus the computed signal fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMessage {
    pub symbol: String,
    pub timestamp: Value,
    pub data: Map<String, Value>,
}

impl fmt::Display for EnrichedMessage {
    /// Compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
