//! Beta signal computation.
//!
//! The score is a fixed placeholder. Nothing here reads the feature payload.

use tracing::debug;

use crate::pipeline::types::{SignalResult, ValidatedMessage};

/// Score emitted for every message until a real beta model exists.
///
/// TODO: replace with a regression of the symbol's returns against a
/// benchmark index once a returns series is carried in `data`.
pub const PLACEHOLDER_BETA_SCORE: f64 = 0.85;

/// Derives signal fields from a validated message. Must be pure and infallible.
pub trait SignalComputer: Send + Sync {
    fn compute(&self, message: &ValidatedMessage) -> SignalResult;
}

/// The placeholder beta computer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderBeta;

impl SignalComputer for PlaceholderBeta {
    fn compute(&self, message: &ValidatedMessage) -> SignalResult {
        compute_beta_signal(message)
    }
}

/// Compute the beta signal for one message.
pub fn compute_beta_signal(message: &ValidatedMessage) -> SignalResult {
    debug!(symbol = %message.symbol(), "Computing beta signal");

    SignalResult {
        symbol: message.symbol().to_string(),
        timestamp: message.timestamp().clone(),
        beta_score: PLACEHOLDER_BETA_SCORE,
    }
}
