use airdrop_core::{chain_name, SessionConfig, SessionConfigToml};
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;

pub const DEFAULT_CHAIN: &str = "ethereum";
pub const DEFAULT_CONNECTOR: &str = "Connected Wallet";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AirdropConfig {
    /// Chain label given to every connected wallet
    pub chain: Option<String>,
    /// EVM chain id, resolved to a label when `chain` is not set
    pub chain_id: Option<u64>,
    /// Connector display name shown for new wallets
    pub connector: Option<String>,
    /// Fixed seed for the mock scanner
    pub seed: Option<u64>,
    #[serde(default)]
    pub wallets: Vec<String>,
    /// One address per line, `#` comments allowed
    pub address_file: Option<String>,
    #[serde(default)]
    pub session: SessionConfigToml,
}

impl AirdropConfig {
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))
    }

    /// Like [`AirdropConfig::load`] but falls back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load(path).with_context(|| format!("Failed to parse config {}", path))
        } else {
            Ok(Self::default())
        }
    }

    pub fn chain(&self) -> &str {
        self.chain
            .as_deref()
            .or(self.chain_id.map(chain_name))
            .unwrap_or(DEFAULT_CHAIN)
    }

    pub fn connector(&self) -> &str {
        self.connector.as_deref().unwrap_or(DEFAULT_CONNECTOR)
    }

    pub fn to_session_config(&self) -> Result<SessionConfig> {
        let config = SessionConfig::from(self.session.clone());
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_full_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
chain = "arbitrum"
seed = 7
wallets = ["0x1111111111111111111111111111111111111111"]

[session]
claim_delay_ms = 5
max_airdrops_per_wallet = 2
"#
        )
        .unwrap();

        let config = AirdropConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.chain(), "arbitrum");
        assert_eq!(config.connector(), DEFAULT_CONNECTOR);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.wallets.len(), 1);

        let session = config.to_session_config().unwrap();
        assert_eq!(session.latency.claim_ms, 5);
        assert_eq!(session.latency.scan_ms, 1500);
        assert_eq!(session.max_airdrops_per_wallet, 2);
    }

    #[test]
    fn test_invalid_session_range_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[session]\nmin_airdrops_per_wallet = 4\nmax_airdrops_per_wallet = 2"
        )
        .unwrap();

        let config = AirdropConfig::load(file.path().to_str().unwrap()).unwrap();
        assert!(config.to_session_config().is_err());
    }

    #[test]
    fn test_chain_id_resolves_to_label() {
        let by_id = AirdropConfig {
            chain_id: Some(8453),
            ..Default::default()
        };
        assert_eq!(by_id.chain(), "base");

        let unknown = AirdropConfig {
            chain_id: Some(999_999),
            ..Default::default()
        };
        assert_eq!(unknown.chain(), DEFAULT_CHAIN);

        let explicit = AirdropConfig {
            chain: Some("polygon".to_string()),
            chain_id: Some(56),
            ..Default::default()
        };
        assert_eq!(explicit.chain(), "polygon");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "seed = \"not a number\"\n[session").unwrap();

        let err = AirdropConfig::load_or_default(file.path().to_str().unwrap()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AirdropConfig::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(config.chain(), DEFAULT_CHAIN);
        assert!(config.wallets.is_empty());
        assert_eq!(config.to_session_config().unwrap(), SessionConfig::default());
    }
}
