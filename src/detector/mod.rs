pub mod engine;
pub mod tracker;

pub use engine::OpportunityDetector;
pub use tracker::SpreadTracker;

use serde::{Deserialize, Serialize};

use crate::types::venue::MarketType;

/// One directed buy/sell pairing for a symbol, enriched with the transfer
/// constraints between its two venues. Field names follow the dashboard
/// wire format.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub buy_exchange: String,
    pub buy_type: MarketType,
    pub buy_price: f64,
    pub buy_mark_price: f64,
    pub buy_fee_taker: f64,

    pub sell_exchange: String,
    pub sell_type: MarketType,
    pub sell_price: f64,
    pub sell_mark_price: f64,
    pub sell_fee_taker: f64,

    pub gross_spread_pct: f64,
    pub net_spread_pct: f64,

    pub funding_rate_buy: f64,
    pub funding_rate_sell: f64,
    pub next_funding_time: u64,

    pub networks_match: bool,
    pub common_networks: Vec<String>,

    pub buy_withdraw_enabled: bool,
    pub buy_deposit_enabled: bool,
    pub sell_withdraw_enabled: bool,
    pub sell_deposit_enabled: bool,

    pub transfer_fee_usd: f64,
    pub max_volume_usd: f64,

    pub buy_liquidity_usd: f64,
    pub sell_liquidity_usd: f64,

    pub started_at: u64,
    pub duration_seconds: u64,
}

/// Ranked view of one symbol's cross-venue spreads for a detection cycle,
/// with the best net spread seen per venue-type pairing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub best_spread_perp_perp: f64,
    pub best_spread_spot_perp: f64,
    pub best_spread_spot_spot: f64,
    pub opportunities: Vec<Opportunity>,
}
