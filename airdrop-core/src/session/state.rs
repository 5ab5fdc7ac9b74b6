//! Synchronous state held behind the session lock. Every method here is a
//! single atomic write from the point of view of session observers.

use super::outcome::IgnoreReason;
use crate::model::{Airdrop, AirdropStatus, ScanProgress, SessionSnapshot, SessionStats, Wallet};
use std::collections::{HashMap, HashSet};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub(crate) struct SessionState {
    pub wallets: Vec<Wallet>,
    pub airdrops: Vec<Airdrop>,
    pub progress: ScanProgress,
    pub batch_processing: bool,
    pub transferring: bool,
    /// Bumped by every cancel; operations compare it after each wait
    pub epoch: u64,
    pub scan_generation: u64,
    pub cancel_token: CancellationToken,
    /// Airdrops currently `Claiming`, mapped to the status they came from
    in_flight: HashMap<String, AirdropStatus>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            wallets: Vec::new(),
            airdrops: Vec::new(),
            progress: ScanProgress::default(),
            batch_processing: false,
            transferring: false,
            epoch: 0,
            scan_generation: 0,
            cancel_token: CancellationToken::new(),
            in_flight: HashMap::new(),
        }
    }
}

impl SessionState {
    /// Returns the stored wallet and whether it was newly inserted.
    pub fn upsert_wallet(
        &mut self,
        address: &str,
        chain: &str,
        connector: &str,
        now_ms: i64,
    ) -> (Wallet, bool) {
        if let Some(existing) = self.wallets.iter_mut().find(|w| w.matches_address(address)) {
            existing.chain = chain.to_string();
            return (existing.clone(), false);
        }

        let wallet = Wallet::new(address, chain, connector, now_ms);
        self.wallets.push(wallet.clone());
        (wallet, true)
    }

    pub fn set_balance(&mut self, address: &str, balance: f64) -> bool {
        match self.wallets.iter_mut().find(|w| w.matches_address(address)) {
            Some(wallet) => {
                wallet.balance = balance;
                true
            }
            None => false,
        }
    }

    pub fn airdrop(&self, id: &str) -> Option<&Airdrop> {
        self.airdrops.iter().find(|a| a.id == id)
    }

    pub fn count_with(&self, status: AirdropStatus) -> usize {
        self.airdrops.iter().filter(|a| a.status == status).count()
    }

    /// Moves one airdrop from `from` into `Claiming`.
    pub fn begin_one(&mut self, id: &str, from: AirdropStatus) -> Result<(), IgnoreReason> {
        let airdrop = self
            .airdrops
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(IgnoreReason::NotFound)?;

        if airdrop.status != from {
            return Err(IgnoreReason::WrongStatus {
                expected: from,
                actual: airdrop.status,
            });
        }

        airdrop.status = AirdropStatus::Claiming;
        self.in_flight.insert(airdrop.id.clone(), from);
        Ok(())
    }

    /// Moves every airdrop in `from` into `Claiming` and returns their ids.
    pub fn begin_all(&mut self, from: AirdropStatus) -> Vec<String> {
        let mut ids = Vec::new();
        for airdrop in self.airdrops.iter_mut().filter(|a| a.status == from) {
            airdrop.status = AirdropStatus::Claiming;
            self.in_flight.insert(airdrop.id.clone(), from);
            ids.push(airdrop.id.clone());
        }
        ids
    }

    /// Lands the given in-flight airdrops on `to`. Ids that are no longer
    /// in flight (cleared, rescanned or rolled back) are skipped.
    pub fn finish(&mut self, ids: &[String], to: AirdropStatus) -> usize {
        let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut moved = 0;

        for airdrop in self
            .airdrops
            .iter_mut()
            .filter(|a| a.status == AirdropStatus::Claiming && ids.contains(a.id.as_str()))
        {
            if self.in_flight.remove(&airdrop.id).is_some() {
                airdrop.status = to;
                moved += 1;
            }
        }
        moved
    }

    /// Aborts every running operation: in-flight airdrops go back to the
    /// status they came from, busy flags drop, waiters are woken.
    pub fn cancel_all(&mut self) -> usize {
        let mut restored = 0;
        for airdrop in self.airdrops.iter_mut() {
            if let Some(origin) = self.in_flight.remove(&airdrop.id) {
                airdrop.status = origin;
                restored += 1;
            }
        }
        self.in_flight.clear();

        self.progress.is_scanning = false;
        self.batch_processing = false;
        self.transferring = false;

        self.epoch += 1;
        self.cancel_token.cancel();
        self.cancel_token = CancellationToken::new();
        restored
    }

    /// Appends what a source reported for `wallet`. Records are forced to
    /// `Pending`, re-owned by `wallet`, and any id already taken gets a
    /// numeric suffix so every record stays addressable.
    pub fn record_discovered(&mut self, wallet: &Wallet, found: Vec<Airdrop>) -> usize {
        let mut taken: HashSet<String> = self.airdrops.iter().map(|a| a.id.clone()).collect();
        let count = found.len();

        for mut airdrop in found {
            airdrop.status = AirdropStatus::Pending;
            airdrop.wallet_id = wallet.id.clone();
            airdrop.wallet_address = wallet.address.clone();
            airdrop.chain = wallet.chain.clone();

            if taken.contains(&airdrop.id) {
                let base = airdrop.id.clone();
                let mut n = 2;
                while taken.contains(&format!("{}-{}", base, n)) {
                    n += 1;
                }
                airdrop.id = format!("{}-{}", base, n);
            }
            taken.insert(airdrop.id.clone());
            self.airdrops.push(airdrop);
        }
        count
    }

    pub fn reset_for_scan(&mut self) -> u64 {
        self.airdrops.clear();
        self.in_flight.clear();
        self.scan_generation += 1;
        self.progress = ScanProgress {
            is_scanning: true,
            current_wallet: 0,
            total_wallets: self.wallets.len(),
            airdrops_found: 0,
        };
        self.scan_generation
    }

    pub fn clear(&mut self) {
        self.wallets.clear();
        self.airdrops.clear();
        self.in_flight.clear();
        self.progress = ScanProgress::default();
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats::compute(&self.wallets, &self.airdrops)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            wallets: self.wallets.clone(),
            airdrops: self.airdrops.clone(),
            scan_progress: self.progress,
            stats: self.stats(),
            is_batch_processing: self.batch_processing,
            is_transferring: self.transferring,
        }
    }
}
