//! Configuration types.

use regex::Regex;

use crate::error::ConfigError;

/// Default symbol pattern: one leading alphanumeric, then alphanumerics and `._:/-`.
pub const DEFAULT_SYMBOL_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._:/\-]*$";

/// Default maximum symbol length in characters.
pub const DEFAULT_MAX_SYMBOL_LEN: usize = 32;

/// Default cap on a single transport line, newline excluded (1 MiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

const SYMBOL_PATTERN_VAR: &str = "BETA_SIGNAL_SYMBOL_PATTERN";
const MAX_SYMBOL_LEN_VAR: &str = "BETA_SIGNAL_MAX_SYMBOL_LEN";
const MAX_LINE_BYTES_VAR: &str = "BETA_SIGNAL_MAX_LINE_BYTES";

/// Rules for the default message schema.
#[derive(Debug, Clone)]
pub struct SchemaConfig {
    /// Pattern every `symbol` must match.
    pub symbol_pattern: Regex,
    /// Maximum `symbol` length in characters.
    pub max_symbol_len: usize,
}

impl SchemaConfig {
    /// Load from `BETA_SIGNAL_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup (env, file, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let symbol_pattern = match lookup(SYMBOL_PATTERN_VAR) {
            Some(raw) => Regex::new(&raw).map_err(|e| ConfigError::InvalidValue {
                key: SYMBOL_PATTERN_VAR.to_string(),
                message: e.to_string(),
            })?,
            None => default_symbol_pattern(),
        };

        let max_symbol_len =
            positive_or_default(&lookup, MAX_SYMBOL_LEN_VAR, DEFAULT_MAX_SYMBOL_LEN)?;

        Ok(Self {
            symbol_pattern,
            max_symbol_len,
        })
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            symbol_pattern: default_symbol_pattern(),
            max_symbol_len: DEFAULT_MAX_SYMBOL_LEN,
        }
    }
}

/// Transport limits for the line-delimited channels.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Longest accepted input line in bytes; longer lines are reported as malformed.
    pub max_line_bytes: usize,
}

impl ChannelConfig {
    /// Load from `BETA_SIGNAL_MAX_LINE_BYTES`, falling back to the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            max_line_bytes: positive_or_default(&lookup, MAX_LINE_BYTES_VAR, DEFAULT_MAX_LINE_BYTES)?,
        })
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

fn positive_or_default<F>(lookup: &F, key: &str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected a positive integer, got {raw:?}"),
            }),
        },
        None => Ok(default),
    }
}

fn default_symbol_pattern() -> Regex {
    Regex::new(DEFAULT_SYMBOL_PATTERN).expect("default symbol pattern is a valid regex")
}
