pub mod consumer;

use serde::Deserialize;

use crate::types::venue::MarketType;

/// Compact quote frame published by the feed side. A missing market type
/// means spot; sizes and mark price default to zero.
#[derive(Debug, Deserialize)]
pub struct FeedFrame {
    #[serde(rename = "ex")]
    pub exchange: String,
    #[serde(rename = "mt", default = "default_market_type")]
    pub market_type: String,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "b")]
    pub bid: f64,
    #[serde(rename = "a")]
    pub ask: f64,
    #[serde(rename = "bl", default)]
    pub bid_size: f64,
    #[serde(rename = "al", default)]
    pub ask_size: f64,
    #[serde(rename = "mp", default)]
    pub mark_price: f64,
}

fn default_market_type() -> String {
    "spot".to_string()
}

impl FeedFrame {
    /// Parse and screen a raw frame. A frame without an exchange, a symbol,
    /// and a usable two-sided quote is malformed and must never reach the
    /// price store.
    pub fn parse(payload: &[u8]) -> Option<FeedFrame> {
        let frame: FeedFrame = serde_json::from_slice(payload).ok()?;
        if frame.exchange.is_empty() || frame.symbol.is_empty() {
            return None;
        }
        if !(frame.bid > 0.0) || !(frame.ask > 0.0) {
            return None;
        }
        Some(frame)
    }

    pub fn market_type(&self) -> MarketType {
        MarketType::parse(&self.market_type)
    }
}
