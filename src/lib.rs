//! Beta Signal — validate market messages, attach a beta score, emit enriched output.

pub mod channels;
pub mod config;
pub mod error;
pub mod pipeline;
