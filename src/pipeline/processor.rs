//! Pipeline orchestrator — validate, compute, merge.
//!
//! Flow:
//! 1. `MessageValidator::validate()` → errors propagate unchanged
//! 2. `SignalComputer::compute()`
//! 3. Merge signal fields into the payload's `data` (computed fields win)

use tracing::{Dispatch, debug, info};

use crate::error::PipelineError;
use crate::pipeline::signal::{PlaceholderBeta, SignalComputer};
use crate::pipeline::types::{EnrichedMessage, RawMessage};
use crate::pipeline::validator::MessageValidator;

/// Stateless message pipeline. Safe to share across threads.
pub struct Pipeline {
    validator: MessageValidator,
    computer: Box<dyn SignalComputer>,
    /// Trace sink for every event the pipeline emits. `None` uses the ambient default.
    dispatch: Option<Dispatch>,
}

impl Pipeline {
    /// Create a pipeline with the placeholder beta computer.
    pub fn new(validator: MessageValidator) -> Self {
        Self {
            validator,
            computer: Box::new(PlaceholderBeta),
            dispatch: None,
        }
    }

    /// Swap the signal computer.
    pub fn with_signal_computer(mut self, computer: impl SignalComputer + 'static) -> Self {
        self.computer = Box::new(computer);
        self
    }

    /// Route all pipeline traces to `dispatch` instead of the global subscriber.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Process a single raw message into an enriched one.
    pub fn process(&self, raw: RawMessage) -> Result<EnrichedMessage, PipelineError> {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, || self.run(raw)),
            None => self.run(raw),
        }
    }

    fn run(&self, raw: RawMessage) -> Result<EnrichedMessage, PipelineError> {
        info!("Processing new message");

        let validated = self.validator.validate(raw)?;
        let signal = self.computer.compute(&validated);
        if !validated.extra().is_empty() {
            let dropped: Vec<&str> = validated.extra().keys().map(String::as_str).collect();
            debug!(keys = ?dropped, "Top-level keys outside symbol/timestamp/data are not forwarded");
        }

        let (symbol, timestamp, mut data) = validated.into_data();
        for (key, value) in signal.into_fields() {
            if data.contains_key(&key) {
                debug!(key = %key, "Computed field overrides payload field");
            }
            data.insert(key, value);
        }

        let enriched = EnrichedMessage {
            symbol,
            timestamp,
            data,
        };
        debug!(payload = %enriched, "Final enriched message");
        Ok(enriched)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(MessageValidator::default())
    }
}
