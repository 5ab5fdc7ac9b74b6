//! # Session Data Model
//!
//! Plain data carried by an [`crate::AirdropSession`]: connected wallets,
//! discovered airdrops, scan progress and the derived statistics view.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A wallet connected through the external wallet provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// `"{address}-{connected_at_ms}"`
    pub id: String,
    pub address: String,
    /// Connector display name, e.g. "MetaMask"
    pub name: String,
    pub chain: String,
    /// Written only by the balance collaborator.
    #[serde(default)]
    pub balance: f64,
}

impl Wallet {
    pub fn new(address: &str, chain: &str, name: &str, connected_at_ms: i64) -> Self {
        Self {
            id: format!("{}-{}", address, connected_at_ms),
            address: address.to_string(),
            name: name.to_string(),
            chain: chain.to_string(),
            balance: 0.0,
        }
    }

    pub fn matches_address(&self, address: &str) -> bool {
        self.address.eq_ignore_ascii_case(address)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AirdropStatus {
    Pending,
    /// Shared in-flight state for both claiming and selling.
    Claiming,
    Claimed,
    Sold,
    Failed,
}

impl fmt::Display for AirdropStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AirdropStatus::Pending => "PENDING",
            AirdropStatus::Claiming => "CLAIMING",
            AirdropStatus::Claimed => "CLAIMED",
            AirdropStatus::Sold => "SOLD",
            AirdropStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// A mock token distribution owned by one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airdrop {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub amount: u64,
    /// Estimated USD value
    pub value: f64,
    pub wallet_id: String,
    pub wallet_address: String,
    pub chain: String,
    pub status: AirdropStatus,
}

impl Airdrop {
    /// Builds a pending record for `wallet`. The id is unique per
    /// wallet, token and scan generation.
    pub fn pending_for(
        wallet: &Wallet,
        name: &str,
        symbol: &str,
        amount: u64,
        value: f64,
        generation: u64,
    ) -> Self {
        Self {
            id: format!("{}-{}-{}", wallet.id, symbol, generation),
            name: name.to_string(),
            symbol: symbol.to_string(),
            amount,
            value,
            wallet_id: wallet.id.clone(),
            wallet_address: wallet.address.clone(),
            chain: wallet.chain.clone(),
            status: AirdropStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub is_scanning: bool,
    pub current_wallet: usize,
    pub total_wallets: usize,
    pub airdrops_found: usize,
}

/// Aggregates derived from the current wallets and airdrops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub total_wallets: usize,
    pub total_airdrops: usize,
    pub total_value: f64,
    pub pending_claims: usize,
    pub sold_value: f64,
    pub total_wallet_balance: f64,
}

impl SessionStats {
    pub fn compute(wallets: &[Wallet], airdrops: &[Airdrop]) -> Self {
        Self {
            total_wallets: wallets.len(),
            total_airdrops: airdrops.len(),
            total_value: airdrops.iter().map(|a| a.value).sum(),
            pending_claims: airdrops
                .iter()
                .filter(|a| a.status == AirdropStatus::Pending)
                .count(),
            sold_value: airdrops
                .iter()
                .filter(|a| a.status == AirdropStatus::Sold)
                .map(|a| a.value)
                .sum(),
            total_wallet_balance: wallets.iter().map(|w| w.balance).sum(),
        }
    }
}

/// Everything a renderer needs, cloned out of the session after a write.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub wallets: Vec<Wallet>,
    pub airdrops: Vec<Airdrop>,
    pub scan_progress: ScanProgress,
    pub stats: SessionStats,
    pub is_batch_processing: bool,
    pub is_transferring: bool,
}
