use airdrop_core::{
    Airdrop, AirdropSession, AirdropSource, AirdropStatus, CoreError, FixtureSource, FixtureToken,
    IgnoreReason, InstantClock, MockSource, Outcome, SessionConfig, ValidationError, Wallet,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

const W1: &str = "0x1111111111111111111111111111111111111111";
const W2: &str = "0x2222222222222222222222222222222222222222";
const W3: &str = "0x3333333333333333333333333333333333333333";
const DESTINATION: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

fn fixture_session(source: FixtureSource) -> (AirdropSession, Arc<InstantClock>) {
    let clock = Arc::new(InstantClock::new());
    let session =
        AirdropSession::with_parts(SessionConfig::default(), clock.clone(), Arc::new(source));
    (session, clock)
}

fn two_token_fixture() -> FixtureSource {
    FixtureSource::new()
        .with_wallet(
            W1,
            vec![
                FixtureToken::new("Arbitrum", "ARB", 1200, 120.0),
                FixtureToken::new("Optimism", "OP", 900, 180.0),
            ],
        )
        .with_wallet(W2, vec![FixtureToken::new("Scroll", "SCR", 600, 75.0)])
}

async fn status_of(session: &AirdropSession, id: &str) -> AirdropStatus {
    session.airdrop(id).await.expect("airdrop exists").status
}

#[tokio::test]
async fn test_connect_wallet_is_case_insensitive_upsert() {
    let (session, _) = fixture_session(FixtureSource::new());
    let mixed = "0xAbCdEf0000000000000000000000000000000001";

    let first = session.connect_wallet(mixed, "ethereum", "MetaMask").await;
    session.connect_wallet(W2, "base", "Rabby").await;
    let again = session
        .connect_wallet(&mixed.to_lowercase(), "arbitrum", "WalletConnect")
        .await;
    session
        .connect_wallet(&mixed.to_uppercase().replace("0X", "0x"), "optimism", "x")
        .await;

    let wallets = session.wallets().await;
    assert_eq!(wallets.len(), 2);
    assert_eq!(wallets[0].address, mixed);
    assert_eq!(wallets[0].chain, "optimism");
    assert_eq!(wallets[0].name, "MetaMask");
    assert_eq!(wallets[0].balance, 0.0);
    assert_eq!(wallets[1].address, W2);
    assert_eq!(again.id, first.id);
}

#[tokio::test]
async fn test_disconnect_all_clears_everything() {
    let (session, _) = fixture_session(two_token_fixture());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.connect_wallet(W2, "ethereum", "MetaMask").await;
    assert_eq!(session.start_scan().await, Outcome::Completed);
    assert_eq!(session.airdrops().await.len(), 3);

    session.disconnect_all().await;

    assert!(session.wallets().await.is_empty());
    assert!(session.airdrops().await.is_empty());
    let stats = session.stats().await;
    assert_eq!(stats.total_wallets, 0);
    assert_eq!(stats.total_airdrops, 0);
    assert_eq!(stats.total_value, 0.0);
    assert!(!session.scan_progress().await.is_scanning);
}

#[tokio::test]
async fn test_scan_progress_matches_collection() {
    let (session, clock) = fixture_session(two_token_fixture());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.connect_wallet(W2, "arbitrum", "MetaMask").await;
    session.connect_wallet(W3, "base", "MetaMask").await;

    assert_eq!(session.start_scan().await, Outcome::Completed);

    let progress = session.scan_progress().await;
    assert!(!progress.is_scanning);
    assert_eq!(progress.current_wallet, 3);
    assert_eq!(progress.total_wallets, 3);

    let airdrops = session.airdrops().await;
    assert_eq!(progress.airdrops_found, airdrops.len());
    assert_eq!(airdrops.len(), 3);

    // appended in wallet order, stamped with the wallet's chain
    let wallets = session.wallets().await;
    assert_eq!(airdrops[0].wallet_id, wallets[0].id);
    assert_eq!(airdrops[1].wallet_id, wallets[0].id);
    assert_eq!(airdrops[2].wallet_id, wallets[1].id);
    assert_eq!(airdrops[2].chain, "arbitrum");
    assert!(airdrops.iter().all(|a| a.status == AirdropStatus::Pending));

    // one simulated latency per wallet
    assert_eq!(clock.total_slept(), Duration::from_millis(3 * 1500));
}

#[tokio::test]
async fn test_rescan_replaces_airdrops_with_new_ids() {
    let (session, _) = fixture_session(two_token_fixture());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;

    session.start_scan().await;
    let first: Vec<String> = session.airdrops().await.into_iter().map(|a| a.id).collect();
    session.claim_all().await;

    session.start_scan().await;
    let second = session.airdrops().await;
    assert_eq!(second.len(), 2);
    assert!(second.iter().all(|a| a.status == AirdropStatus::Pending));
    assert!(second.iter().all(|a| !first.contains(&a.id)));
}

#[tokio::test]
async fn test_scan_without_wallets_is_ignored() {
    let (session, clock) = fixture_session(FixtureSource::new());
    assert_eq!(
        session.start_scan().await,
        Outcome::Ignored(IgnoreReason::NoWallets)
    );
    assert_eq!(clock.sleep_count(), 0);
}

#[tokio::test]
async fn test_second_scan_is_rejected_while_running() {
    let (session, _) = fixture_session(two_token_fixture());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.connect_wallet(W2, "ethereum", "MetaMask").await;

    let (first, second) = tokio::join!(session.start_scan(), session.start_scan());

    assert_eq!(first, Outcome::Completed);
    assert_eq!(second, Outcome::Ignored(IgnoreReason::ScanInProgress));
    assert_eq!(session.airdrops().await.len(), 3);
}

#[tokio::test]
async fn test_claim_moves_pending_to_claimed_only() {
    let (session, clock) = fixture_session(two_token_fixture());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.start_scan().await;
    let airdrops = session.airdrops().await;
    let (a, b) = (&airdrops[0].id, &airdrops[1].id);

    let before = clock.total_slept();
    assert_eq!(session.claim(a).await, Outcome::Completed);
    assert_eq!(status_of(&session, a).await, AirdropStatus::Claimed);
    assert_eq!(clock.total_slept() - before, Duration::from_millis(2000));

    // claim on a non-pending airdrop leaves it alone
    assert_eq!(
        session.claim(a).await,
        Outcome::Ignored(IgnoreReason::WrongStatus {
            expected: AirdropStatus::Pending,
            actual: AirdropStatus::Claimed,
        })
    );
    assert_eq!(status_of(&session, a).await, AirdropStatus::Claimed);

    // sell needs claimed
    assert!(session.sell(b).await.is_ignored());
    assert_eq!(status_of(&session, b).await, AirdropStatus::Pending);

    assert_eq!(session.sell(a).await, Outcome::Completed);
    assert_eq!(status_of(&session, a).await, AirdropStatus::Sold);

    assert_eq!(
        session.claim("missing").await,
        Outcome::Ignored(IgnoreReason::NotFound)
    );
}

#[tokio::test]
async fn test_claim_passes_through_claiming() {
    let (session, _) = fixture_session(two_token_fixture());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.start_scan().await;
    let id = session.airdrops().await[0].id.clone();

    let mut rx = session.subscribe();
    rx.borrow_and_update();

    let (outcome, seen) = tokio::join!(session.claim(&id), async {
        rx.changed().await.expect("session alive");
        rx.borrow_and_update()
            .airdrops
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.status)
    });

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(seen, Some(AirdropStatus::Claiming));
}

#[tokio::test]
async fn test_claim_all_then_sell_all_sells_every_pending_airdrop() {
    let clock = Arc::new(InstantClock::new());
    let session = AirdropSession::with_parts(
        SessionConfig::default(),
        clock.clone(),
        Arc::new(MockSource::seeded(2024, 1, 3)),
    );
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.connect_wallet(W2, "ethereum", "MetaMask").await;
    session.connect_wallet(W3, "ethereum", "MetaMask").await;
    session.start_scan().await;

    let pending = session.airdrops().await;
    let expected_value: f64 = pending.iter().map(|a| a.value).sum();
    assert_eq!(session.stats().await.pending_claims, pending.len());

    assert_eq!(session.claim_all().await, Outcome::Completed);
    assert!(session
        .airdrops()
        .await
        .iter()
        .all(|a| a.status == AirdropStatus::Claimed));
    assert!(!session.is_batch_processing().await);

    assert_eq!(session.sell_all().await, Outcome::Completed);
    let sold = session.airdrops().await;
    assert!(sold.iter().all(|a| a.status == AirdropStatus::Sold));

    let stats = session.stats().await;
    assert_eq!(stats.sold_value, expected_value);
    assert_eq!(stats.pending_claims, 0);
}

#[tokio::test]
async fn test_batches_ignore_when_nothing_eligible() {
    let (session, clock) = fixture_session(two_token_fixture());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;

    assert_eq!(
        session.claim_all().await,
        Outcome::Ignored(IgnoreReason::NothingToProcess)
    );
    assert_eq!(
        session.claim_and_sell_all().await,
        Outcome::Ignored(IgnoreReason::NothingToProcess)
    );

    session.start_scan().await;
    assert_eq!(
        session.sell_all().await,
        Outcome::Ignored(IgnoreReason::NothingToProcess)
    );
    assert!(!session.is_batch_processing().await);
    assert_eq!(clock.sleep_count(), 1);
}

#[tokio::test]
async fn test_batch_flag_rejects_concurrent_batches() {
    let (session, _) = fixture_session(two_token_fixture());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.start_scan().await;

    let (first, second, third) = tokio::join!(
        session.claim_all(),
        session.claim_all(),
        session.claim_and_sell_all()
    );

    assert_eq!(first, Outcome::Completed);
    assert_eq!(second, Outcome::Ignored(IgnoreReason::BatchInProgress));
    assert_eq!(third, Outcome::Ignored(IgnoreReason::BatchInProgress));
    assert!(session
        .airdrops()
        .await
        .iter()
        .all(|a| a.status == AirdropStatus::Claimed));
}

#[tokio::test]
async fn test_claim_all_does_not_capture_a_concurrent_sell() {
    let (session, _) = fixture_session(two_token_fixture());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.start_scan().await;
    let airdrops = session.airdrops().await;
    let (a, b) = (airdrops[0].id.clone(), airdrops[1].id.clone());
    session.claim(&a).await;

    let (sell, claim_all) = tokio::join!(session.sell(&a), session.claim_all());

    assert_eq!(sell, Outcome::Completed);
    assert_eq!(claim_all, Outcome::Completed);
    assert_eq!(status_of(&session, &a).await, AirdropStatus::Sold);
    assert_eq!(status_of(&session, &b).await, AirdropStatus::Claimed);
}

#[tokio::test]
async fn test_claim_and_sell_all_sells_previously_claimed() {
    let (session, clock) = fixture_session(two_token_fixture());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.start_scan().await;
    session.claim_all().await;

    let before = clock.total_slept();
    assert_eq!(session.claim_and_sell_all().await, Outcome::Completed);
    // no pending airdrops, so only the sell phase waited
    assert_eq!(clock.total_slept() - before, Duration::from_millis(2000));
    assert_eq!(session.stats().await.sold_value, 300.0);
}

#[tokio::test]
async fn test_extraction_scenario_three_hundred_dollars() {
    let source = FixtureSource::new().with_wallet(
        W1,
        vec![
            FixtureToken::new("Arbitrum", "ARB", 1000, 120.0),
            FixtureToken::new("Optimism", "OP", 1500, 180.0),
        ],
    );
    let (session, _) = fixture_session(source);
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.start_scan().await;

    let stats = session.stats().await;
    assert_eq!(stats.total_airdrops, 2);
    assert_eq!(stats.total_value, 300.0);

    assert_eq!(session.claim_and_sell_all().await, Outcome::Completed);

    let stats = session.stats().await;
    assert_eq!(stats.sold_value, 300.0);
    assert_eq!(stats.pending_claims, 0);
    assert!(!session.is_batch_processing().await);
}

#[tokio::test]
async fn test_transfer_all_rejects_malformed_destination() {
    let (session, clock) = fixture_session(two_token_fixture());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.start_scan().await;
    let before = session.snapshot().await;

    let err = session.transfer_all("not-an-address").await.unwrap_err();
    assert_eq!(
        err,
        CoreError::Validation(ValidationError::InvalidAddress {
            address: "not-an-address".to_string()
        })
    );

    assert!(!session.is_transferring().await);
    assert_eq!(session.snapshot().await, before);
    assert_eq!(clock.sleep_count(), 1);
}

#[tokio::test]
async fn test_transfer_all_is_a_guarded_placeholder() {
    let (session, clock) = fixture_session(two_token_fixture());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.start_scan().await;
    let airdrops = session.airdrops().await;
    let before = clock.total_slept();

    let (first, second) = tokio::join!(
        session.transfer_all(DESTINATION),
        session.transfer_all(DESTINATION)
    );

    assert_eq!(first.unwrap(), Outcome::Completed);
    assert_eq!(
        second.unwrap(),
        Outcome::Ignored(IgnoreReason::TransferInProgress)
    );
    assert!(!session.is_transferring().await);
    assert_eq!(clock.total_slept() - before, Duration::from_millis(3000));
    assert_eq!(session.airdrops().await, airdrops);
}

#[tokio::test]
async fn test_balance_collaborator_feeds_stats() {
    let (session, _) = fixture_session(FixtureSource::new());
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.connect_wallet(W2, "ethereum", "MetaMask").await;

    assert!(session.set_wallet_balance(&W1.to_uppercase().replace("0X", "0x"), 1.5).await);
    assert!(session.set_wallet_balance(W2, 0.25).await);
    assert!(!session.set_wallet_balance(W3, 9.0).await);

    assert_eq!(session.stats().await.total_wallet_balance, 1.75);
}

#[tokio::test]
async fn test_subscribers_see_every_write() {
    let (session, _) = fixture_session(two_token_fixture());
    let mut rx = session.subscribe();

    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().wallets.len(), 1);

    session.start_scan().await;
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.airdrops.len(), 2);
    assert_eq!(snapshot.stats.total_value, 300.0);
    assert!(!snapshot.scan_progress.is_scanning);
}

/// Fixture lookups, except one address whose lookup always errors.
struct FailingFor {
    inner: FixtureSource,
    address: &'static str,
}

#[async_trait]
impl AirdropSource for FailingFor {
    fn name(&self) -> &str {
        "failing-for"
    }

    async fn discover(&self, wallet: &Wallet, generation: u64) -> anyhow::Result<Vec<Airdrop>> {
        if wallet.matches_address(self.address) {
            anyhow::bail!("indexer timeout");
        }
        self.inner.discover(wallet, generation).await
    }
}

#[tokio::test]
async fn test_failed_lookup_skips_only_that_wallet() {
    let source = FailingFor {
        inner: two_token_fixture().with_wallet(
            W3,
            vec![FixtureToken::new("Starknet", "STRK", 500, 40.0)],
        ),
        address: W2,
    };
    let session = AirdropSession::with_parts(
        SessionConfig::default(),
        Arc::new(InstantClock::new()),
        Arc::new(source),
    );
    for address in [W1, W2, W3] {
        session.connect_wallet(address, "ethereum", "MetaMask").await;
    }

    assert_eq!(session.start_scan().await, Outcome::Completed);

    let progress = session.scan_progress().await;
    let airdrops = session.airdrops().await;
    assert!(!progress.is_scanning);
    assert_eq!(progress.current_wallet, progress.total_wallets);
    assert_eq!(progress.total_wallets, 3);
    assert_eq!(progress.airdrops_found, airdrops.len());

    let symbols: Vec<&str> = airdrops.iter().map(|a| a.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["ARB", "OP", "STRK"]);
    assert!(airdrops.iter().all(|a| !a.wallet_address.eq_ignore_ascii_case(W2)));
}

#[tokio::test]
async fn test_repeated_symbol_from_source_never_sticks_in_claiming() {
    let source = FixtureSource::new().with_wallet(
        W1,
        vec![
            FixtureToken::new("Arbitrum", "ARB", 1000, 100.0),
            FixtureToken::new("Arbitrum", "ARB", 2000, 200.0),
        ],
    );
    let (session, _) = fixture_session(source);
    session.connect_wallet(W1, "ethereum", "MetaMask").await;
    session.start_scan().await;

    let ids: HashSet<String> = session.airdrops().await.into_iter().map(|a| a.id).collect();
    assert_eq!(ids.len(), 2);

    assert_eq!(session.claim_all().await, Outcome::Completed);
    assert!(session
        .airdrops()
        .await
        .iter()
        .all(|a| a.status == AirdropStatus::Claimed));

    assert_eq!(session.sell_all().await, Outcome::Completed);
    let stats = session.stats().await;
    assert_eq!(stats.sold_value, 300.0);
    assert!(session
        .airdrops()
        .await
        .iter()
        .all(|a| a.status == AirdropStatus::Sold));
}
