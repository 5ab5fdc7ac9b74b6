//! # Utilities Module
//!
//! Internal utility modules for the airdrop-core crate.

pub(crate) mod logger;

pub use logger::{setup_logger, setup_logger_with_file};
