use async_trait::async_trait;
use std::sync::Arc;

use SpreadInfra::detector::SpreadTracker;
use SpreadInfra::detector::engine::{DetectorPolicy, OpportunityDetector};
use SpreadInfra::error::Result;
use SpreadInfra::interfaces::metadata_source::MetadataSource;
use SpreadInfra::metadata::registry::MetadataRegistry;
use SpreadInfra::price_store::PriceStore;
use SpreadInfra::types::venue::MarketType;

struct EmptySource;

#[async_trait]
impl MetadataSource for EmptySource {
    async fn fetch(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

fn engine() -> (PriceStore, OpportunityDetector) {
    let registry = Arc::new(MetadataRegistry::new(
        Arc::new(EmptySource),
        vec!["exchangeA".to_string(), "exchangeB".to_string()],
        true,
    ));
    let detector = OpportunityDetector::new(
        registry,
        Arc::new(SpreadTracker::new()),
        DetectorPolicy::default(),
    );
    (PriceStore::new(), detector)
}

#[test]
fn ingest_to_detection_reports_one_spot_spot_opportunity() {
    let (store, detector) = engine();

    store.ingest("BTC", "exchangeA", MarketType::Spot, 100.0, 100.2, 5.0, 5.0, 100.1);
    store.ingest("BTC", "exchangeB", MarketType::Spot, 101.0, 101.2, 5.0, 5.0, 101.1);

    let analyses = detector.detect(&store);
    assert_eq!(analyses.len(), 1);

    let analysis = &analyses[0];
    assert_eq!(analysis.symbol, "BTC");
    assert_eq!(analysis.opportunities.len(), 1);

    let opportunity = &analysis.opportunities[0];
    assert_eq!(opportunity.buy_exchange, "exchangeA");
    assert_eq!(opportunity.sell_exchange, "exchangeB");

    // (101.0 - 100.2) / 100.2 * 100 with the demo fee-offset policy on top
    let expected_net = (101.0 - 100.2) / 100.2 * 100.0;
    assert!((opportunity.net_spread_pct - expected_net).abs() < 1e-9);
    assert!((expected_net - 0.8).abs() < 0.01);
    assert!((opportunity.gross_spread_pct - (expected_net + 0.2)).abs() < 1e-9);

    // both legs spot: contributes to the spot-spot bucket only
    assert!((analysis.best_spread_spot_spot - expected_net).abs() < 1e-9);
    assert_eq!(analysis.best_spread_perp_perp, 0.0);
    assert_eq!(analysis.best_spread_spot_perp, 0.0);

    // enrichment degrades to permissive defaults without metadata
    assert!(opportunity.buy_withdraw_enabled);
    assert!(opportunity.sell_deposit_enabled);
    assert!(!opportunity.networks_match);
    assert!((opportunity.buy_fee_taker - 0.1).abs() < 1e-12);
    assert_eq!(opportunity.funding_rate_buy, 0.0001);
    assert_eq!(opportunity.buy_liquidity_usd, 100.2 * 5.0);
    assert_eq!(opportunity.sell_liquidity_usd, 101.0 * 5.0);
}

#[test]
fn eviction_clears_the_symbol_and_its_tracked_pairings() {
    let registry = Arc::new(MetadataRegistry::new(
        Arc::new(EmptySource),
        vec!["exchangeA".to_string(), "exchangeB".to_string()],
        true,
    ));
    let tracker = Arc::new(SpreadTracker::new());
    let detector = OpportunityDetector::new(
        registry,
        tracker.clone(),
        DetectorPolicy::default(),
    );
    let store = PriceStore::new();

    store.ingest("BTC", "exchangeA", MarketType::Spot, 100.0, 100.2, 5.0, 5.0, 100.1);
    store.ingest("BTC", "exchangeB", MarketType::Spot, 101.0, 101.2, 5.0, 5.0, 101.1);

    assert_eq!(detector.detect(&store).len(), 1);
    assert_eq!(tracker.len(), 1);

    // far enough in the future that everything is stale
    let now = SpreadInfra::utils::helper::current_timestamp_ms() + 60_000;
    let outcome = store.evict_stale(now, std::time::Duration::from_millis(SpreadInfra::PRICE_TTL_MS));
    assert_eq!(outcome.symbols_removed, vec!["BTC".to_string()]);

    for symbol in &outcome.symbols_removed {
        tracker.forget_symbol(symbol);
    }

    assert!(detector.detect(&store).is_empty());
    assert!(tracker.is_empty());
}
