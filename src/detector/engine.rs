use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::detector::tracker::SpreadTracker;
use crate::detector::{Opportunity, SymbolAnalysis};
use crate::metadata::registry::MetadataRegistry;
use crate::price_store::{PriceSnapshot, PriceStore};
use crate::types::venue::VenueKey;
use crate::utils::helper::current_timestamp_ms;

/// Funding rate reported when a leg's rate is unknown.
const DEFAULT_FUNDING_RATE: f64 = 0.0001;

/// Next-funding horizon assumed when neither leg reports one.
const DEFAULT_NEXT_FUNDING_MS: u64 = 3_600_000;

/// Per-opportunity volume cap assumed when neither leg reports a max cost.
const DEFAULT_MAX_VOLUME_USD: f64 = 50_000.0;

/// Presentation offset between net and gross under the demo fee policy.
const DEMO_GROSS_OFFSET_PCT: f64 = 0.2;

/// How gross and net spread relate for a reported opportunity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeOffsetPolicy {
    /// Net equals the raw spread; gross adds a fixed presentation offset.
    DemoOffset,
    /// Gross equals the raw spread; net deducts both legs' taker fees.
    TakerFees,
}

/// Thresholds and policy knobs for a detection pass.
#[derive(Clone, Copy, Debug)]
pub struct DetectorPolicy {
    /// Spreads at or below this percentage are discarded outright.
    pub min_spread_pct: f64,
    pub fee_offset: FeeOffsetPolicy,
    /// Short-circuit to an empty result until identity data has loaded.
    pub require_metadata_ready: bool,
}

impl Default for DetectorPolicy {
    fn default() -> Self {
        DetectorPolicy {
            min_spread_pct: crate::MIN_SPREAD_TO_INCLUDE_PCT,
            fee_offset: FeeOffsetPolicy::DemoOffset,
            require_metadata_ready: false,
        }
    }
}

/// Joins a point-in-time price view with the metadata registry into the
/// ranked per-symbol result set the dashboard consumes.
///
/// The computation itself is stateless; the only state it touches is the
/// shared spread-duration tracker, written on first qualification of a
/// pairing.
pub struct OpportunityDetector {
    registry: Arc<MetadataRegistry>,
    tracker: Arc<SpreadTracker>,
    policy: DetectorPolicy,
}

impl OpportunityDetector {
    pub fn new(
        registry: Arc<MetadataRegistry>,
        tracker: Arc<SpreadTracker>,
        policy: DetectorPolicy,
    ) -> Self {
        OpportunityDetector {
            registry,
            tracker,
            policy,
        }
    }

    /// Rank every symbol's qualifying venue pairings.
    pub fn detect(&self, store: &PriceStore) -> Vec<SymbolAnalysis> {
        self.detect_at(store.snapshot_all(), current_timestamp_ms())
    }

    pub(crate) fn detect_at(
        &self,
        snapshot: HashMap<String, HashMap<VenueKey, PriceSnapshot>>,
        now: u64,
    ) -> Vec<SymbolAnalysis> {
        if self.policy.require_metadata_ready && !self.registry.is_ready() {
            return Vec::new();
        }

        let mut result: Vec<SymbolAnalysis> = Vec::new();

        for (symbol, venues) in &snapshot {
            // a single venue cannot spread against itself
            if venues.len() < 2 {
                continue;
            }

            let mut opportunities = self.find_opportunities(symbol, venues, now);
            if opportunities.is_empty() {
                continue;
            }

            let (best_perp_perp, best_spot_perp, best_spot_spot) =
                category_maxima(&opportunities);

            opportunities.sort_by(|a, b| {
                b.net_spread_pct
                    .partial_cmp(&a.net_spread_pct)
                    .unwrap_or(Ordering::Equal)
            });

            result.push(SymbolAnalysis {
                symbol: symbol.clone(),
                best_spread_perp_perp: best_perp_perp,
                best_spread_spot_perp: best_spot_perp,
                best_spread_spot_spot: best_spot_spot,
                opportunities,
            });
        }

        result.sort_by(|a, b| {
            b.best_spread_perp_perp
                .partial_cmp(&a.best_spread_perp_perp)
                .unwrap_or(Ordering::Equal)
        });

        result
    }

    /// Evaluate every directed pair of venues quoting `symbol`. (A, B) and
    /// (B, A) are distinct opportunities.
    fn find_opportunities(
        &self,
        symbol: &str,
        venues: &HashMap<VenueKey, PriceSnapshot>,
        now: u64,
    ) -> Vec<Opportunity> {
        let mut opportunities = Vec::new();

        for buy_key in venues.keys() {
            for sell_key in venues.keys() {
                if buy_key == sell_key {
                    continue;
                }

                // different exchanges may list different assets under one
                // ticker; unresolved identity kills the pairing
                if buy_key.exchange != sell_key.exchange
                    && !self
                        .registry
                        .are_identical(symbol, &buy_key.exchange, &sell_key.exchange)
                {
                    continue;
                }

                let buy = &venues[buy_key];
                let sell = &venues[sell_key];

                let raw_spread_pct = (sell.bid - buy.ask) / buy.ask * 100.0;
                if !(raw_spread_pct > self.policy.min_spread_pct) {
                    continue;
                }

                opportunities.push(self.build_opportunity(
                    symbol,
                    buy_key,
                    buy,
                    sell_key,
                    sell,
                    raw_spread_pct,
                    now,
                ));
            }
        }

        opportunities
    }

    #[allow(clippy::too_many_arguments)]
    fn build_opportunity(
        &self,
        symbol: &str,
        buy_key: &VenueKey,
        buy: &PriceSnapshot,
        sell_key: &VenueKey,
        sell: &PriceSnapshot,
        raw_spread_pct: f64,
        now: u64,
    ) -> Opportunity {
        let registry = &self.registry;

        let buy_taker = registry.get_taker_fee(&buy_key.exchange, symbol);
        let sell_taker = registry.get_taker_fee(&sell_key.exchange, symbol);

        let (gross_spread_pct, net_spread_pct) = match self.policy.fee_offset {
            FeeOffsetPolicy::DemoOffset => {
                (raw_spread_pct + DEMO_GROSS_OFFSET_PCT, raw_spread_pct)
            }
            FeeOffsetPolicy::TakerFees => (
                raw_spread_pct,
                raw_spread_pct - (buy_taker + sell_taker) * 100.0,
            ),
        };

        let funding_rate_buy = registry
            .get_funding_rate(&buy_key.exchange, symbol)
            .unwrap_or(DEFAULT_FUNDING_RATE);
        let funding_rate_sell = registry
            .get_funding_rate(&sell_key.exchange, symbol)
            .unwrap_or(DEFAULT_FUNDING_RATE);
        let next_funding_time = registry
            .get_next_funding_time(&buy_key.exchange, symbol)
            .or_else(|| registry.get_next_funding_time(&sell_key.exchange, symbol))
            .unwrap_or(now + DEFAULT_NEXT_FUNDING_MS);

        // the asset moves from the buy exchange to the sell exchange
        let common_networks =
            registry.find_common_networks(&buy_key.exchange, &sell_key.exchange, symbol);
        let networks_match = !common_networks.is_empty();
        let transfer_fee_usd = common_networks
            .first()
            .map(|network| {
                registry.get_network_withdraw_fee(&buy_key.exchange, symbol, network) * buy.ask
            })
            .unwrap_or(0.0);

        let max_volume_usd = match (
            registry.get_max_position_cost(&buy_key.exchange, symbol),
            registry.get_max_position_cost(&sell_key.exchange, symbol),
        ) {
            (Some(buy_cap), Some(sell_cap)) => buy_cap.min(sell_cap),
            (Some(cap), None) | (None, Some(cap)) => cap,
            (None, None) => DEFAULT_MAX_VOLUME_USD,
        };

        let pairing_key = SpreadTracker::pairing_key(symbol, buy_key, sell_key);
        let started_at = self.tracker.first_seen(&pairing_key, now);
        let duration_seconds = now.saturating_sub(started_at) / 1000;

        Opportunity {
            buy_exchange: buy_key.exchange.clone(),
            buy_type: buy_key.market_type,
            buy_price: buy.ask,
            buy_mark_price: buy.mark_price,
            buy_fee_taker: buy_taker * 100.0,

            sell_exchange: sell_key.exchange.clone(),
            sell_type: sell_key.market_type,
            sell_price: sell.bid,
            sell_mark_price: sell.mark_price,
            sell_fee_taker: sell_taker * 100.0,

            gross_spread_pct,
            net_spread_pct,

            funding_rate_buy,
            funding_rate_sell,
            next_funding_time,

            networks_match,
            common_networks,

            buy_withdraw_enabled: registry.is_withdrawal_enabled(&buy_key.exchange, symbol),
            buy_deposit_enabled: registry.is_deposit_enabled(&buy_key.exchange, symbol),
            sell_withdraw_enabled: registry.is_withdrawal_enabled(&sell_key.exchange, symbol),
            sell_deposit_enabled: registry.is_deposit_enabled(&sell_key.exchange, symbol),

            transfer_fee_usd,
            max_volume_usd,

            buy_liquidity_usd: buy.ask * buy.ask_size,
            sell_liquidity_usd: sell.bid * sell.bid_size,

            started_at,
            duration_seconds,
        }
    }
}

/// Best net spread per venue-type bucket: perp-perp, mixed spot/perp in
/// either direction, and spot-spot. Empty buckets report 0.0.
fn category_maxima(opportunities: &[Opportunity]) -> (f64, f64, f64) {
    let mut best_perp_perp = 0.0f64;
    let mut best_spot_perp = 0.0f64;
    let mut best_spot_spot = 0.0f64;

    for opportunity in opportunities {
        let spread = opportunity.net_spread_pct;
        match (
            opportunity.buy_type.is_spot(),
            opportunity.sell_type.is_spot(),
        ) {
            (false, false) => {
                if spread > best_perp_perp {
                    best_perp_perp = spread;
                }
            }
            (true, true) => {
                if spread > best_spot_spot {
                    best_spot_spot = spread;
                }
            }
            _ => {
                if spread > best_spot_perp {
                    best_spot_perp = spread;
                }
            }
        }
    }

    (best_perp_perp, best_spot_perp, best_spot_spot)
}
