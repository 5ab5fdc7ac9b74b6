use airdrop_core::{shorten_address, AirdropSession, Outcome, SessionSnapshot};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// What to run after the wallets are connected.
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    /// Sell right after claiming (claim_and_sell_all)
    pub sell: bool,
    /// Simulated sweep destination
    pub transfer_to: Option<String>,
}

pub struct WorkflowRunner;

impl WorkflowRunner {
    /// Runs scan -> extraction -> optional transfer on `session`, printing
    /// progress as snapshots arrive. Ctrl+C cancels the session.
    pub async fn run(session: Arc<AirdropSession>, workflow: Workflow) -> Result<SessionSnapshot> {
        let token = CancellationToken::new();

        let ctrl_c_session = Arc::clone(&session);
        let ctrl_c_token = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                res = signal::ctrl_c() => match res {
                    Ok(()) => {
                        info!("🛑 Received Ctrl+C. Cancelling session...");
                        ctrl_c_session.cancel().await;
                    }
                    Err(err) => error!("Unable to listen for shutdown signal: {}", err),
                },
                _ = ctrl_c_token.cancelled() => {}
            }
        });

        let renderer = tokio::spawn(render_progress(session.subscribe(), token.clone()));

        let start_time = Instant::now();
        let result = Self::run_steps(&session, &workflow).await;

        token.cancel();
        renderer.await.ok();

        let snapshot = session.snapshot().await;
        let stats = snapshot.stats;
        info!(
            "Total Time: {:.1}s | Wallets: {} | Airdrops: {} | Value: ${:.2} | Sold: ${:.2}",
            start_time.elapsed().as_secs_f64(),
            stats.total_wallets,
            stats.total_airdrops,
            stats.total_value,
            stats.sold_value
        );

        result.map(|_| snapshot)
    }

    async fn run_steps(session: &AirdropSession, workflow: &Workflow) -> Result<()> {
        if !Self::step("scan", session.start_scan().await) {
            return Ok(());
        }

        let extraction = if workflow.sell {
            session.claim_and_sell_all().await
        } else {
            session.claim_all().await
        };
        if !Self::step("extraction", extraction) {
            return Ok(());
        }

        if let Some(destination) = &workflow.transfer_to {
            let outcome = session.transfer_all(destination).await?;
            if Self::step("transfer", outcome) {
                info!("Swept all wallets to {}", shorten_address(destination));
            }
        }
        Ok(())
    }

    /// Logs the outcome; false when the workflow should stop.
    fn step(name: &str, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Completed => true,
            Outcome::Ignored(reason) => {
                warn!("Skipped {}: {}", name, reason);
                true
            }
            Outcome::Cancelled => {
                warn!("Workflow cancelled during {}", name);
                false
            }
        }
    }
}

async fn render_progress(mut rx: watch::Receiver<SessionSnapshot>, token: CancellationToken) {
    let mut last = rx.borrow_and_update().scan_progress;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            _ = token.cancelled() => return,
        }

        let progress = rx.borrow_and_update().scan_progress;
        if progress.is_scanning && progress != last {
            println!(
                "Scanning wallet {}/{} | {} airdrops found",
                progress.current_wallet, progress.total_wallets, progress.airdrops_found
            );
        }
        last = progress;
    }
}
