//! # Session Configuration
//!
//! Simulated latencies and scan tuning. Chain binaries read these from the
//! `[session]` table of their TOML config through [`SessionConfigToml`].

use crate::error::ConfigError;
use crate::source::TOKEN_CATALOG;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed waits standing in for network round trips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencyConfig {
    pub scan_ms: u64,
    pub claim_ms: u64,
    pub sell_ms: u64,
    pub claim_all_ms: u64,
    pub sell_all_ms: u64,
    pub transfer_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            scan_ms: 1500,
            claim_ms: 2000,
            sell_ms: 1500,
            claim_all_ms: 2500,
            sell_all_ms: 2000,
            transfer_ms: 3000,
        }
    }
}

impl LatencyConfig {
    pub fn zero() -> Self {
        Self {
            scan_ms: 0,
            claim_ms: 0,
            sell_ms: 0,
            claim_all_ms: 0,
            sell_all_ms: 0,
            transfer_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    pub latency: LatencyConfig,
    pub min_airdrops_per_wallet: usize,
    pub max_airdrops_per_wallet: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            latency: LatencyConfig::default(),
            min_airdrops_per_wallet: 1,
            max_airdrops_per_wallet: 3,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default tuning with every wait removed.
    pub fn instant() -> Self {
        Self {
            latency: LatencyConfig::zero(),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: LatencyConfig) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_airdrops_per_wallet(mut self, min: usize, max: usize) -> Self {
        self.min_airdrops_per_wallet = min;
        self.max_airdrops_per_wallet = max;
        self
    }

    pub fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.latency.scan_ms)
    }

    pub fn claim_delay(&self) -> Duration {
        Duration::from_millis(self.latency.claim_ms)
    }

    pub fn sell_delay(&self) -> Duration {
        Duration::from_millis(self.latency.sell_ms)
    }

    pub fn claim_all_delay(&self) -> Duration {
        Duration::from_millis(self.latency.claim_all_ms)
    }

    pub fn sell_all_delay(&self) -> Duration {
        Duration::from_millis(self.latency.sell_all_ms)
    }

    pub fn transfer_delay(&self) -> Duration {
        Duration::from_millis(self.latency.transfer_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_airdrops_per_wallet == 0 {
            return Err(ConfigError::InvalidValue {
                field: "min_airdrops_per_wallet".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.min_airdrops_per_wallet > self.max_airdrops_per_wallet {
            return Err(ConfigError::InvalidValue {
                field: "min_airdrops_per_wallet".to_string(),
                reason: format!(
                    "{} exceeds max_airdrops_per_wallet ({})",
                    self.min_airdrops_per_wallet, self.max_airdrops_per_wallet
                ),
            });
        }
        if self.max_airdrops_per_wallet > TOKEN_CATALOG.len() {
            return Err(ConfigError::InvalidValue {
                field: "max_airdrops_per_wallet".to_string(),
                reason: format!(
                    "{} exceeds the token catalog size ({})",
                    self.max_airdrops_per_wallet,
                    TOKEN_CATALOG.len()
                ),
            });
        }
        Ok(())
    }
}

/// Deserialize helper for SessionConfig from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfigToml {
    pub scan_delay_ms: Option<u64>,
    pub claim_delay_ms: Option<u64>,
    pub sell_delay_ms: Option<u64>,
    pub claim_all_delay_ms: Option<u64>,
    pub sell_all_delay_ms: Option<u64>,
    pub transfer_delay_ms: Option<u64>,
    pub min_airdrops_per_wallet: Option<usize>,
    pub max_airdrops_per_wallet: Option<usize>,
}

impl From<SessionConfigToml> for SessionConfig {
    fn from(toml: SessionConfigToml) -> Self {
        let defaults = SessionConfig::default();
        let latency = defaults.latency;
        Self {
            latency: LatencyConfig {
                scan_ms: toml.scan_delay_ms.unwrap_or(latency.scan_ms),
                claim_ms: toml.claim_delay_ms.unwrap_or(latency.claim_ms),
                sell_ms: toml.sell_delay_ms.unwrap_or(latency.sell_ms),
                claim_all_ms: toml.claim_all_delay_ms.unwrap_or(latency.claim_all_ms),
                sell_all_ms: toml.sell_all_delay_ms.unwrap_or(latency.sell_all_ms),
                transfer_ms: toml.transfer_delay_ms.unwrap_or(latency.transfer_ms),
            },
            min_airdrops_per_wallet: toml
                .min_airdrops_per_wallet
                .unwrap_or(defaults.min_airdrops_per_wallet),
            max_airdrops_per_wallet: toml
                .max_airdrops_per_wallet
                .unwrap_or(defaults.max_airdrops_per_wallet),
        }
    }
}
