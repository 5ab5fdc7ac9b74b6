//! # Airdrop Session
//!
//! The state machine behind the airdrop dashboard. One session owns the
//! connected wallets and the airdrops found for them, and moves airdrops
//! through `pending -> claiming -> claimed -> claiming -> sold`.
//!
//! Every command is an async task that suspends only at simulated latency
//! points (see [`Clock`]). Between those points all writes happen under one
//! lock, so observers never see a half-applied batch. Busy flags reject a
//! second invocation instead of queueing it.

mod outcome;
mod state;

pub use outcome::{IgnoreReason, Outcome};

use crate::address::{shorten_address, validate_evm_address};
use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::CoreResult;
use crate::model::{Airdrop, AirdropStatus, ScanProgress, SessionSnapshot, SessionStats, Wallet};
use crate::source::{AirdropSource, MockSource};
use state::SessionState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock, RwLockWriteGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const EVENT_TARGET: &str = "session_event";

pub struct AirdropSession {
    state: RwLock<SessionState>,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    source: Arc<dyn AirdropSource>,
    updates: watch::Sender<SessionSnapshot>,
}

/// Handle captured when an operation starts; used to detect a cancel that
/// happened while the operation was suspended.
struct Ticket {
    epoch: u64,
    token: CancellationToken,
}

impl AirdropSession {
    /// Real timers and the random mock source.
    pub fn new(config: SessionConfig) -> Self {
        let source = MockSource::new(
            config.min_airdrops_per_wallet,
            config.max_airdrops_per_wallet,
        );
        Self::with_parts(config, Arc::new(SystemClock), Arc::new(source))
    }

    pub fn with_parts(
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        source: Arc<dyn AirdropSource>,
    ) -> Self {
        let (updates, _) = watch::channel(SessionSnapshot::default());
        Self {
            state: RwLock::new(SessionState::default()),
            config,
            clock,
            source,
            updates,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_source(mut self, source: Arc<dyn AirdropSource>) -> Self {
        self.source = source;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // --- Reads ---

    /// Receives a fresh snapshot after every state write.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn wallets(&self) -> Vec<Wallet> {
        self.state.read().await.wallets.clone()
    }

    pub async fn airdrops(&self) -> Vec<Airdrop> {
        self.state.read().await.airdrops.clone()
    }

    pub async fn airdrop(&self, id: &str) -> Option<Airdrop> {
        self.state.read().await.airdrop(id).cloned()
    }

    pub async fn scan_progress(&self) -> ScanProgress {
        self.state.read().await.progress
    }

    pub async fn stats(&self) -> SessionStats {
        self.state.read().await.stats()
    }

    pub async fn is_scanning(&self) -> bool {
        self.state.read().await.progress.is_scanning
    }

    pub async fn is_batch_processing(&self) -> bool {
        self.state.read().await.batch_processing
    }

    pub async fn is_transferring(&self) -> bool {
        self.state.read().await.transferring
    }

    // --- Wallet provider / balance collaborator ---

    /// Upserts a wallet by address (case-insensitive). A known address only
    /// gets its chain label updated.
    pub async fn connect_wallet(&self, address: &str, chain: &str, connector: &str) -> Wallet {
        let now_ms = self.clock.now_millis();
        let mut state = self.state.write().await;
        let (wallet, inserted) = state.upsert_wallet(address, chain, connector, now_ms);
        self.publish(&state);
        drop(state);

        if inserted {
            info!(
                target: EVENT_TARGET,
                "Connected {} on {} via {}",
                shorten_address(address),
                chain,
                connector
            );
        } else {
            debug!("Wallet {} switched to {}", shorten_address(address), chain);
        }
        wallet
    }

    /// Clears wallets and airdrops and aborts anything in flight.
    pub async fn disconnect_all(&self) {
        let mut state = self.state.write().await;
        state.cancel_all();
        let wallets = state.wallets.len();
        state.clear();
        self.publish(&state);
        drop(state);

        info!(target: EVENT_TARGET, "Disconnected {} wallets", wallets);
    }

    /// Returns false when no wallet has that address.
    pub async fn set_wallet_balance(&self, address: &str, balance: f64) -> bool {
        let mut state = self.state.write().await;
        let updated = state.set_balance(address, balance);
        if updated {
            self.publish(&state);
        }
        updated
    }

    /// Aborts every in-flight wait. Airdrops a cancelled claim or sell had
    /// moved to `claiming` go back to where they came from; airdrops a
    /// cancelled scan already appended stay.
    pub async fn cancel(&self) {
        let mut state = self.state.write().await;
        let restored = state.cancel_all();
        self.publish(&state);
        drop(state);

        warn!(
            "Session operations cancelled ({} airdrops restored)",
            restored
        );
    }

    // --- Scanning ---

    /// Scans the connected wallets one at a time, in connection order.
    /// Progress is published after every wallet.
    pub async fn start_scan(&self) -> Outcome {
        let (wallets, generation, ticket) = {
            let mut state = self.state.write().await;
            if state.wallets.is_empty() {
                return self.ignored("start_scan", IgnoreReason::NoWallets);
            }
            if state.progress.is_scanning {
                return self.ignored("start_scan", IgnoreReason::ScanInProgress);
            }

            let generation = state.reset_for_scan();
            self.publish(&state);
            (state.wallets.clone(), generation, Self::ticket(&state))
        };

        info!(
            target: EVENT_TARGET,
            "Scanning {} wallets (source: {})",
            wallets.len(),
            self.source.name()
        );

        for (index, wallet) in wallets.iter().enumerate() {
            if !self.pause(self.config.scan_delay(), &ticket).await {
                return Outcome::Cancelled;
            }

            let found = match self.source.discover(wallet, generation).await {
                Ok(found) => found,
                Err(e) => {
                    warn!(
                        "Airdrop lookup FAILED for {}: {:#}",
                        shorten_address(&wallet.address),
                        e
                    );
                    Vec::new()
                }
            };

            let mut state = match self.resume(&ticket).await {
                Some(state) => state,
                None => return Outcome::Cancelled,
            };
            let count = state.record_discovered(wallet, found);
            state.progress.current_wallet = index + 1;
            state.progress.airdrops_found += count;
            self.publish(&state);
            drop(state);

            debug!(
                "Scanned wallet {}/{} ({}): {} airdrops",
                index + 1,
                wallets.len(),
                shorten_address(&wallet.address),
                count
            );
        }

        let mut state = match self.resume(&ticket).await {
            Some(state) => state,
            None => return Outcome::Cancelled,
        };
        state.progress.is_scanning = false;
        let found = state.progress.airdrops_found;
        let value: f64 = state.airdrops.iter().map(|a| a.value).sum();
        self.publish(&state);
        drop(state);

        info!(
            target: EVENT_TARGET,
            "Scan complete: {} airdrops worth ${:.2}", found, value
        );
        Outcome::Completed
    }

    // --- Single airdrop commands ---

    /// `pending -> claiming -> claimed`
    pub async fn claim(&self, airdrop_id: &str) -> Outcome {
        self.transition_one(
            "claim",
            airdrop_id,
            AirdropStatus::Pending,
            AirdropStatus::Claimed,
            self.config.claim_delay(),
        )
        .await
    }

    /// `claimed -> claiming -> sold`
    pub async fn sell(&self, airdrop_id: &str) -> Outcome {
        self.transition_one(
            "sell",
            airdrop_id,
            AirdropStatus::Claimed,
            AirdropStatus::Sold,
            self.config.sell_delay(),
        )
        .await
    }

    async fn transition_one(
        &self,
        op: &str,
        airdrop_id: &str,
        from: AirdropStatus,
        to: AirdropStatus,
        delay: Duration,
    ) -> Outcome {
        let ticket = {
            let mut state = self.state.write().await;
            if let Err(reason) = state.begin_one(airdrop_id, from) {
                return self.ignored(op, reason);
            }
            self.publish(&state);
            Self::ticket(&state)
        };

        if !self.pause(delay, &ticket).await {
            return Outcome::Cancelled;
        }

        let mut state = match self.resume(&ticket).await {
            Some(state) => state,
            None => return Outcome::Cancelled,
        };
        let moved = state.finish(&[airdrop_id.to_string()], to);
        self.publish(&state);
        drop(state);

        if moved > 0 {
            info!(target: EVENT_TARGET, "{} -> {}", airdrop_id, to);
        }
        Outcome::Completed
    }

    // --- Batch commands ---

    /// Claims every pending airdrop in one batch.
    pub async fn claim_all(&self) -> Outcome {
        self.run_batch("claim_all", AirdropStatus::Pending).await
    }

    /// Sells every claimed airdrop in one batch.
    pub async fn sell_all(&self) -> Outcome {
        self.run_batch("sell_all", AirdropStatus::Claimed).await
    }

    async fn run_batch(&self, op: &str, from: AirdropStatus) -> Outcome {
        let (ids, ticket) = {
            let mut state = self.state.write().await;
            if state.batch_processing {
                return self.ignored(op, IgnoreReason::BatchInProgress);
            }
            if state.count_with(from) == 0 {
                return self.ignored(op, IgnoreReason::NothingToProcess);
            }

            state.batch_processing = true;
            let ids = state.begin_all(from);
            self.publish(&state);
            (ids, Self::ticket(&state))
        };

        if self.batch_phase(from, ids, &ticket).await.is_none() {
            return Outcome::Cancelled;
        }
        self.end_batch(&ticket).await
    }

    /// Claims everything pending, then sells everything claimed, as one
    /// busy scope. Runs when there is at least one pending or claimed airdrop.
    pub async fn claim_and_sell_all(&self) -> Outcome {
        let (claim_ids, ticket) = {
            let mut state = self.state.write().await;
            if state.batch_processing {
                return self.ignored("claim_and_sell_all", IgnoreReason::BatchInProgress);
            }
            if state.count_with(AirdropStatus::Pending) == 0
                && state.count_with(AirdropStatus::Claimed) == 0
            {
                return self.ignored("claim_and_sell_all", IgnoreReason::NothingToProcess);
            }

            state.batch_processing = true;
            let ids = state.begin_all(AirdropStatus::Pending);
            self.publish(&state);
            (ids, Self::ticket(&state))
        };

        if !claim_ids.is_empty()
            && self
                .batch_phase(AirdropStatus::Pending, claim_ids, &ticket)
                .await
                .is_none()
        {
            return Outcome::Cancelled;
        }

        let sell_ids = {
            let mut state = match self.resume(&ticket).await {
                Some(state) => state,
                None => return Outcome::Cancelled,
            };
            let ids = state.begin_all(AirdropStatus::Claimed);
            self.publish(&state);
            ids
        };

        if !sell_ids.is_empty()
            && self
                .batch_phase(AirdropStatus::Claimed, sell_ids, &ticket)
                .await
                .is_none()
        {
            return Outcome::Cancelled;
        }

        self.end_batch(&ticket).await
    }

    /// Waits out one batch and lands the airdrops it started. `None` means
    /// the session was cancelled meanwhile.
    async fn batch_phase(
        &self,
        from: AirdropStatus,
        ids: Vec<String>,
        ticket: &Ticket,
    ) -> Option<usize> {
        let (to, delay) = match from {
            AirdropStatus::Pending => (AirdropStatus::Claimed, self.config.claim_all_delay()),
            _ => (AirdropStatus::Sold, self.config.sell_all_delay()),
        };

        if !self.pause(delay, ticket).await {
            return None;
        }

        let mut state = self.resume(ticket).await?;
        let moved = state.finish(&ids, to);
        let value: f64 = state
            .airdrops
            .iter()
            .filter(|a| a.status == to && ids.contains(&a.id))
            .map(|a| a.value)
            .sum();
        self.publish(&state);
        drop(state);

        info!(
            target: EVENT_TARGET,
            "Batch {}: {} airdrops worth ${:.2}", to, moved, value
        );
        Some(moved)
    }

    async fn end_batch(&self, ticket: &Ticket) -> Outcome {
        let mut state = match self.resume(ticket).await {
            Some(state) => state,
            None => return Outcome::Cancelled,
        };
        state.batch_processing = false;
        self.publish(&state);
        Outcome::Completed
    }

    // --- Transfer ---

    /// Simulated sweep of every wallet to `destination`. A malformed
    /// address is rejected before any state change; nothing is moved.
    pub async fn transfer_all(&self, destination: &str) -> CoreResult<Outcome> {
        validate_evm_address(destination)?;

        let (wallets, ticket) = {
            let mut state = self.state.write().await;
            if state.transferring {
                return Ok(self.ignored("transfer_all", IgnoreReason::TransferInProgress));
            }
            state.transferring = true;
            self.publish(&state);
            (state.wallets.len(), Self::ticket(&state))
        };

        info!(
            target: EVENT_TARGET,
            "Transferring from {} wallets to {}",
            wallets,
            shorten_address(destination)
        );

        if !self.pause(self.config.transfer_delay(), &ticket).await {
            return Ok(Outcome::Cancelled);
        }

        let mut state = match self.resume(&ticket).await {
            Some(state) => state,
            None => return Ok(Outcome::Cancelled),
        };
        state.transferring = false;
        self.publish(&state);
        drop(state);

        info!(
            target: EVENT_TARGET,
            "Transfer SUCCESS to {}",
            shorten_address(destination)
        );
        Ok(Outcome::Completed)
    }

    // --- Helpers ---

    fn ticket(state: &SessionState) -> Ticket {
        Ticket {
            epoch: state.epoch,
            token: state.cancel_token.clone(),
        }
    }

    /// Sleeps on the injected clock; false if cancelled first.
    async fn pause(&self, duration: Duration, ticket: &Ticket) -> bool {
        tokio::select! {
            biased;
            _ = ticket.token.cancelled() => false,
            _ = self.clock.sleep(duration) => true,
        }
    }

    /// Re-takes the write lock after a wait, unless a cancel happened since
    /// the ticket was issued.
    async fn resume(&self, ticket: &Ticket) -> Option<RwLockWriteGuard<'_, SessionState>> {
        let state = self.state.write().await;
        if state.epoch != ticket.epoch {
            return None;
        }
        Some(state)
    }

    fn publish(&self, state: &SessionState) {
        self.updates.send_replace(state.snapshot());
    }

    fn ignored(&self, op: &str, reason: IgnoreReason) -> Outcome {
        debug!("{} ignored: {}", op, reason);
        Outcome::Ignored(reason)
    }
}

impl Default for AirdropSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
