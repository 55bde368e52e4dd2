use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::types::venue::{MarketType, VenueKey};
use crate::utils::helper::current_timestamp_ms;

/// Latest observed quote for one symbol on one venue. Written whole on every
/// ingestion, never field-by-field.
#[derive(Clone, Debug, Serialize)]
pub struct PriceSnapshot {
    pub bid: f64,
    pub ask: f64,
    pub bid_size: f64,
    pub ask_size: f64,
    pub mark_price: f64,
    pub market_type: MarketType,
    pub observed_at: u64,
}

/// Result of one eviction pass.
#[derive(Debug, Default)]
pub struct Eviction {
    pub snapshots_removed: u64,
    /// Symbols whose venue map emptied and was dropped outright. The caller
    /// uses these to reclaim spread-duration entries.
    pub symbols_removed: Vec<String>,
}

/// Concurrently mutated cache of the freshest quote per (symbol, venue).
///
/// The venue map under each symbol is its own sharded map, so feed writers,
/// the eviction loop, and detection reads contend on single buckets and
/// never on the store as a whole.
pub struct PriceStore {
    prices: DashMap<String, DashMap<VenueKey, PriceSnapshot>>,
}

impl PriceStore {
    pub fn new() -> Self {
        PriceStore {
            prices: DashMap::new(),
        }
    }

    /// Upsert the snapshot for (symbol, exchange + market type), stamping it
    /// with the current wall clock.
    ///
    /// Input is trusted: feed parsing and screening happen upstream, and a
    /// malformed frame must never reach this call.
    #[allow(clippy::too_many_arguments)]
    pub fn ingest(
        &self,
        symbol: &str,
        exchange: &str,
        market_type: MarketType,
        bid: f64,
        ask: f64,
        bid_size: f64,
        ask_size: f64,
        mark_price: f64,
    ) {
        self.ingest_at(
            current_timestamp_ms(),
            symbol,
            exchange,
            market_type,
            bid,
            ask,
            bid_size,
            ask_size,
            mark_price,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn ingest_at(
        &self,
        now: u64,
        symbol: &str,
        exchange: &str,
        market_type: MarketType,
        bid: f64,
        ask: f64,
        bid_size: f64,
        ask_size: f64,
        mark_price: f64,
    ) {
        let venue = VenueKey::new(exchange, market_type);
        let snapshot = PriceSnapshot {
            bid,
            ask,
            bid_size,
            ask_size,
            mark_price,
            market_type,
            observed_at: now,
        };

        self.prices
            .entry(symbol.to_string())
            .or_insert_with(DashMap::new)
            .insert(venue, snapshot);
    }

    /// Owned point-in-time view, safe to iterate while ingestion continues.
    /// Consistency holds per venue map, not across symbols.
    pub fn snapshot_all(&self) -> HashMap<String, HashMap<VenueKey, PriceSnapshot>> {
        self.prices
            .iter()
            .map(|entry| {
                let venues = entry
                    .value()
                    .iter()
                    .map(|venue| (venue.key().clone(), venue.value().clone()))
                    .collect();
                (entry.key().clone(), venues)
            })
            .collect()
    }

    /// Remove snapshots observed more than `ttl` before `now`, then drop any
    /// symbol whose venue map emptied. Eviction is the only operation that
    /// deletes price data.
    pub fn evict_stale(&self, now: u64, ttl: Duration) -> Eviction {
        let ttl_ms = ttl.as_millis() as u64;
        let mut outcome = Eviction::default();

        for entry in self.prices.iter() {
            let venues = entry.value();
            let before = venues.len();
            venues.retain(|_, snapshot| now.saturating_sub(snapshot.observed_at) <= ttl_ms);
            outcome.snapshots_removed += (before - venues.len()) as u64;
        }

        self.prices.retain(|symbol, venues| {
            if venues.is_empty() {
                outcome.symbols_removed.push(symbol.clone());
                false
            } else {
                true
            }
        });

        outcome
    }

    pub fn symbol_count(&self) -> usize {
        self.prices.len()
    }
}

impl Default for PriceStore {
    fn default() -> Self {
        Self::new()
    }
}
