use dashmap::DashMap;

use crate::types::venue::VenueKey;

/// First-qualification timestamps for directed venue pairings, keyed
/// `symbol:buyVenue-sellVenue`.
///
/// An entry survives cycles where its pairing stops qualifying; it is
/// reclaimed only when the symbol's price data is evicted outright, so a
/// short gap does not reset the age shown on the dashboard.
pub struct SpreadTracker {
    started: DashMap<String, u64>,
}

impl SpreadTracker {
    pub fn new() -> Self {
        SpreadTracker {
            started: DashMap::new(),
        }
    }

    pub fn pairing_key(symbol: &str, buy: &VenueKey, sell: &VenueKey) -> String {
        format!("{}:{}-{}", symbol, buy, sell)
    }

    /// Timestamp the pairing first qualified, inserting `now` on first sight.
    pub fn first_seen(&self, key: &str, now: u64) -> u64 {
        *self.started.entry(key.to_string()).or_insert(now)
    }

    /// Reclaim every pairing owned by a fully evicted symbol.
    pub fn forget_symbol(&self, symbol: &str) {
        let prefix = format!("{}:", symbol);
        self.started.retain(|key, _| !key.starts_with(&prefix));
    }

    pub fn len(&self) -> usize {
        self.started.len()
    }

    pub fn is_empty(&self) -> bool {
        self.started.is_empty()
    }
}

impl Default for SpreadTracker {
    fn default() -> Self {
        Self::new()
    }
}
