//! Beta signal pipeline.
//!
//! Every raw message flows through:
//! 1. `MessageValidator::validate()` — schema check, then required keys
//! 2. `SignalComputer::compute()` — placeholder beta score
//! 3. `Pipeline::process()` — merge signal fields into the payload
//!
//! Invalid input is returned as a `PipelineError`; no partial output.

pub mod processor;
pub mod schema;
pub mod signal;
pub mod types;
pub mod validator;

pub use processor::Pipeline;
pub use schema::{MessageSchema, SchemaValidator};
pub use signal::{PLACEHOLDER_BETA_SCORE, PlaceholderBeta, SignalComputer, compute_beta_signal};
pub use types::{EnrichedMessage, RawMessage, SignalResult, ValidatedMessage};
pub use validator::{MessageValidator, REQUIRED_KEYS};
