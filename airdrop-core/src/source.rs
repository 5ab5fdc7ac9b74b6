//! # Airdrop Data Sources
//!
//! The session never generates airdrops itself; it asks an [`AirdropSource`]
//! for each wallet it scans. [`MockSource`] draws random records from a fixed
//! token catalog, [`FixtureSource`] returns canned records for tests.

use crate::model::{Airdrop, Wallet};
use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpec {
    pub name: &'static str,
    pub symbol: &'static str,
    /// Inclusive lower bound of the USD value
    pub min_value: u64,
    /// Exclusive upper bound of the USD value
    pub max_value: u64,
}

pub const TOKEN_CATALOG: [TokenSpec; 8] = [
    TokenSpec { name: "Arbitrum", symbol: "ARB", min_value: 100, max_value: 500 },
    TokenSpec { name: "Optimism", symbol: "OP", min_value: 50, max_value: 300 },
    TokenSpec { name: "Blur", symbol: "BLUR", min_value: 200, max_value: 1000 },
    TokenSpec { name: "Eigen Layer", symbol: "EIGEN", min_value: 500, max_value: 2000 },
    TokenSpec { name: "LayerZero", symbol: "ZRO", min_value: 150, max_value: 600 },
    TokenSpec { name: "Starknet", symbol: "STRK", min_value: 80, max_value: 400 },
    TokenSpec { name: "zkSync", symbol: "ZK", min_value: 100, max_value: 450 },
    TokenSpec { name: "Scroll", symbol: "SCR", min_value: 60, max_value: 250 },
];

/// EVM chain ids a wallet may be connected on, with their chain labels.
pub const SUPPORTED_CHAINS: [(u64, &str); 6] = [
    (1, "ethereum"),
    (137, "polygon"),
    (42161, "arbitrum"),
    (10, "optimism"),
    (8453, "base"),
    (56, "bsc"),
];

/// Chain label for `chain_id`; unknown ids fall back to `ethereum`.
pub fn chain_name(chain_id: u64) -> &'static str {
    SUPPORTED_CHAINS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, name)| *name)
        .unwrap_or("ethereum")
}

#[async_trait]
pub trait AirdropSource: Send + Sync {
    /// Returns the name of the source
    fn name(&self) -> &str;

    /// Finds the airdrops available to `wallet`. `generation` is the scan
    /// counter and keeps ids unique across rescans. The session resets each
    /// returned record to pending, owned by `wallet`, with a unique id.
    async fn discover(&self, wallet: &Wallet, generation: u64) -> Result<Vec<Airdrop>>;
}

/// Random mock generator over [`TOKEN_CATALOG`].
pub struct MockSource {
    rng: Mutex<StdRng>,
    min_per_wallet: usize,
    max_per_wallet: usize,
}

impl MockSource {
    pub fn new(min_per_wallet: usize, max_per_wallet: usize) -> Self {
        Self::with_rng(StdRng::from_entropy(), min_per_wallet, max_per_wallet)
    }

    /// Reproducible sequence of airdrops for a given seed.
    pub fn seeded(seed: u64, min_per_wallet: usize, max_per_wallet: usize) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), min_per_wallet, max_per_wallet)
    }

    fn with_rng(rng: StdRng, min_per_wallet: usize, max_per_wallet: usize) -> Self {
        let max_per_wallet = max_per_wallet.clamp(1, TOKEN_CATALOG.len());
        Self {
            rng: Mutex::new(rng),
            min_per_wallet: min_per_wallet.clamp(1, max_per_wallet),
            max_per_wallet,
        }
    }

    fn generate(&self, wallet: &Wallet, generation: u64) -> Vec<Airdrop> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        let count = rng.gen_range(self.min_per_wallet..=self.max_per_wallet);
        let tokens: Vec<TokenSpec> = TOKEN_CATALOG
            .choose_multiple(&mut *rng, count)
            .copied()
            .collect();

        tokens
            .into_iter()
            .map(|token| {
                let value = rng.gen_range(token.min_value..token.max_value) as f64;
                let amount = (value * rng.gen_range(5.0..15.0)).floor() as u64;
                Airdrop::pending_for(wallet, token.name, token.symbol, amount, value, generation)
            })
            .collect()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new(1, 3)
    }
}

#[async_trait]
impl AirdropSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn discover(&self, wallet: &Wallet, generation: u64) -> Result<Vec<Airdrop>> {
        Ok(self.generate(wallet, generation))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureToken {
    pub name: String,
    pub symbol: String,
    pub amount: u64,
    pub value: f64,
}

impl FixtureToken {
    pub fn new(name: &str, symbol: &str, amount: u64, value: f64) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            amount,
            value,
        }
    }
}

/// Canned airdrops keyed by wallet address (case-insensitive).
/// Wallets without an entry get nothing.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    tokens: HashMap<String, Vec<FixtureToken>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wallet(mut self, address: &str, tokens: Vec<FixtureToken>) -> Self {
        self.tokens.insert(address.to_ascii_lowercase(), tokens);
        self
    }
}

#[async_trait]
impl AirdropSource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn discover(&self, wallet: &Wallet, generation: u64) -> Result<Vec<Airdrop>> {
        let tokens = match self.tokens.get(&wallet.address.to_ascii_lowercase()) {
            Some(t) => t,
            None => return Ok(Vec::new()),
        };

        Ok(tokens
            .iter()
            .map(|t| Airdrop::pending_for(wallet, &t.name, &t.symbol, t.amount, t.value, generation))
            .collect())
    }
}
