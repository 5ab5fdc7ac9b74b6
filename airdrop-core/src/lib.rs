//! # Airdrop Core - Simulated Airdrop Session
//!
//! This crate holds the state machine behind the airdrop dashboard: wallets
//! connected by an external provider, mock airdrops discovered for them, and
//! the claim / sell / transfer commands that move those airdrops through
//! their statuses. Nothing here talks to a chain; every network round trip is
//! a fixed simulated latency on an injectable [`Clock`].
//!
//! ## Modules
//!
//! - [`address`] - EVM address validation
//! - [`clock`] - Real and virtual clocks for simulated latency
//! - [`config`] - Latency and scan tuning
//! - [`error`] - Typed error handling with thiserror
//! - [`model`] - Wallet, Airdrop, ScanProgress and stats types
//! - [`session`] - The session state machine
//! - [`source`] - Pluggable airdrop data sources

pub mod address;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod source;
pub(crate) mod utils;

pub use address::{is_valid_evm_address, shorten_address, validate_evm_address};
pub use clock::{Clock, InstantClock, SystemClock};
pub use config::{LatencyConfig, SessionConfig, SessionConfigToml};
pub use error::{ConfigError, CoreError, CoreResult, ValidationError};
pub use model::{Airdrop, AirdropStatus, ScanProgress, SessionSnapshot, SessionStats, Wallet};
pub use session::{AirdropSession, IgnoreReason, Outcome};
pub use source::{
    chain_name, AirdropSource, FixtureSource, FixtureToken, MockSource, TokenSpec,
    SUPPORTED_CHAINS, TOKEN_CATALOG,
};

pub use utils::{setup_logger, setup_logger_with_file};
