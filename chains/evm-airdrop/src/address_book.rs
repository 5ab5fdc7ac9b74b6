//! Wallet address list for the wallet-provider side of the simulation.
//!
//! Addresses come from the config file, repeated `--wallet` flags and an
//! optional address file. Duplicates (case-insensitive) are dropped while
//! keeping first-seen order, since the session upserts by address anyway.

use airdrop_core::is_valid_evm_address;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default, Clone)]
pub struct AddressBook {
    addresses: Vec<String>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("address file not found at: {}", path);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read address file: {}", path))?;

        let mut book = Self::new();
        for (i, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if !book.push(trimmed) {
                warn!(
                    "Invalid address at line {} in {}: '{}'",
                    i + 1,
                    path,
                    trimmed
                );
            }
        }

        info!("Loaded {} addresses from {}", book.len(), path);
        Ok(book)
    }

    /// Adds a valid address. Returns false for malformed input; a duplicate
    /// counts as accepted.
    pub fn push(&mut self, address: &str) -> bool {
        let address = address.trim();
        if !is_valid_evm_address(address) {
            return false;
        }
        if !self
            .addresses
            .iter()
            .any(|a| a.eq_ignore_ascii_case(address))
        {
            self.addresses.push(address.to_string());
        }
        true
    }

    pub fn extend<I, S>(&mut self, addresses: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rejected = 0;
        for address in addresses {
            if !self.push(address.as_ref()) {
                warn!("Skipping invalid wallet address '{}'", address.as_ref());
                rejected += 1;
            }
        }
        rejected
    }

    pub fn merge(&mut self, other: AddressBook) {
        self.extend(other.addresses);
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
