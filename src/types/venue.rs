use serde::{Deserialize, Serialize};
use std::fmt;

/// Market type a venue quotes a symbol on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Spot,
    Perp,
}

impl MarketType {
    /// Feed frames carry the market type as a free-form string; anything
    /// that is not a perpetual contract counts as spot.
    pub fn parse(raw: &str) -> MarketType {
        if raw.eq_ignore_ascii_case("perp") {
            MarketType::Perp
        } else {
            MarketType::Spot
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Spot => "spot",
            MarketType::Perp => "perp",
        }
    }

    pub fn is_spot(&self) -> bool {
        matches!(self, MarketType::Spot)
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Composite identifier of an exchange and the market type it quotes,
/// distinguishing sources that quote the same symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VenueKey {
    pub exchange: String,
    pub market_type: MarketType,
}

impl VenueKey {
    pub fn new(exchange: &str, market_type: MarketType) -> Self {
        VenueKey {
            exchange: exchange.to_string(),
            market_type,
        }
    }
}

impl fmt::Display for VenueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange, self.market_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_type_parse_is_case_insensitive() {
        assert_eq!(MarketType::parse("perp"), MarketType::Perp);
        assert_eq!(MarketType::parse("PERP"), MarketType::Perp);
        assert_eq!(MarketType::parse("spot"), MarketType::Spot);
        assert_eq!(MarketType::parse("anything-else"), MarketType::Spot);
    }

    #[test]
    fn venue_key_display_joins_exchange_and_type() {
        let key = VenueKey::new("binance", MarketType::Perp);
        assert_eq!(key.to_string(), "binance:perp");
    }
}
