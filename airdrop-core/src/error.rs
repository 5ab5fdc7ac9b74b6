//! # Core Error Types
//!
//! Centralized error definitions for the airdrop-core crate.
//! Busy-flag conflicts and wrong-status commands are not errors here: they
//! come back as [`crate::Outcome::Ignored`]. Only malformed input is an error.

use thiserror::Error;

/// Unified error type for airdrop-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error(transparent)]
    Validation(ValidationError),

    #[error(transparent)]
    Config(ConfigError),
}

impl From<ValidationError> for CoreError {
    fn from(e: ValidationError) -> Self {
        CoreError::Validation(e)
    }
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

/// Input rejected before any state change
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid destination address '{address}': expected 0x followed by 40 hex characters")]
    InvalidAddress { address: String },
}

/// Configuration-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to load configuration: {msg}")]
    Load { msg: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
