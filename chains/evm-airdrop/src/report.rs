use airdrop_core::{shorten_address, SessionSnapshot};
use std::fmt::Write;

/// Plain-text table of the session, one airdrop per line.
pub fn render_table(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();

    writeln!(
        out,
        "{:<14} {:<10} {:<7} {:>10} {:>10}  STATUS",
        "WALLET", "CHAIN", "TOKEN", "AMOUNT", "VALUE"
    )
    .ok();
    for airdrop in &snapshot.airdrops {
        writeln!(
            out,
            "{:<14} {:<10} {:<7} {:>10} {:>10.2}  {}",
            shorten_address(&airdrop.wallet_address),
            airdrop.chain,
            airdrop.symbol,
            airdrop.amount,
            airdrop.value,
            airdrop.status
        )
        .ok();
    }

    let stats = &snapshot.stats;
    writeln!(
        out,
        "Wallets: {} | Airdrops: {} | Pending: {} | Total: ${:.2} | Sold: ${:.2}",
        stats.total_wallets,
        stats.total_airdrops,
        stats.pending_claims,
        stats.total_value,
        stats.sold_value
    )
    .ok();
    out
}

pub fn render_json(snapshot: &SessionSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrop_core::{Airdrop, SessionStats, Wallet};

    fn snapshot() -> SessionSnapshot {
        let wallet = Wallet::new(
            "0x1111111111111111111111111111111111111111",
            "ethereum",
            "Test",
            1,
        );
        let airdrops = vec![Airdrop::pending_for(&wallet, "Arbitrum", "ARB", 1500, 150.0, 1)];
        let wallets = vec![wallet];
        SessionSnapshot {
            stats: SessionStats::compute(&wallets, &airdrops),
            wallets,
            airdrops,
            ..Default::default()
        }
    }

    #[test]
    fn test_render_table_lists_airdrops_and_totals() {
        let table = render_table(&snapshot());
        assert!(table.contains("0x1111...1111"));
        assert!(table.contains("ARB"));
        assert!(table.contains("PENDING"));
        assert!(table.contains("Total: $150.00"));
    }

    #[test]
    fn test_render_json_uses_lowercase_status() {
        let json = render_json(&snapshot()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["airdrops"][0]["status"], "pending");
        assert_eq!(value["stats"]["total_airdrops"], 1);
    }
}
