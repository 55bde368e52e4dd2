use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use crate::utils::helper::current_timestamp_ms;

/// Re-log a canonical-id mismatch for the same triple at most this often.
const MISMATCH_LOG_COOLDOWN_MS: u64 = 30 * 60 * 1000;

/// Resolves whether the same ticker on two exchanges denotes the same
/// underlying asset.
///
/// Two independent mappings, each replaced wholesale on refresh: canonical
/// asset ids keyed `"exchange:symbol"`, and display names keyed
/// `symbol -> exchange -> name`. The canonical map having loaded at least
/// one entry doubles as the registry's readiness signal.
pub struct IdentityResolver {
    canonical_ids: RwLock<HashMap<String, String>>,
    display_names: RwLock<HashMap<String, HashMap<String, String>>>,
    ready: AtomicBool,
    /// Treat listings as identical while the canonical-id map is empty.
    /// With this off the resolver fails closed until identity data loads.
    permissive_when_unmapped: bool,
    log_cooldown: DashMap<String, u64>,
}

impl IdentityResolver {
    pub fn new(permissive_when_unmapped: bool) -> Self {
        IdentityResolver {
            canonical_ids: RwLock::new(HashMap::new()),
            display_names: RwLock::new(HashMap::new()),
            ready: AtomicBool::new(false),
            permissive_when_unmapped,
            log_cooldown: DashMap::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Wholesale replace of the canonical-id map. `None` (the load failed)
    /// keeps the previous map usable but drops readiness; an empty-but-valid
    /// load changes nothing.
    pub fn replace_canonical_ids(&self, loaded: Option<HashMap<String, String>>) {
        match loaded {
            Some(map) if !map.is_empty() => {
                if let Ok(mut guard) = self.canonical_ids.write() {
                    *guard = map;
                    self.ready.store(true, Ordering::SeqCst);
                }
            }
            Some(_) => {}
            None => self.ready.store(false, Ordering::SeqCst),
        }
    }

    /// Wholesale replace of the name-identity map; a failed load keeps the
    /// previous map.
    pub fn replace_display_names(&self, loaded: Option<HashMap<String, HashMap<String, String>>>) {
        if let Some(map) = loaded {
            if let Ok(mut guard) = self.display_names.write() {
                *guard = map;
            }
        }
    }

    /// Decide whether `symbol` on `exchange_a` and on `exchange_b` is the
    /// same underlying asset.
    ///
    /// Canonical ids win when both sides have one. An empty canonical map
    /// falls back to the configured permissive policy; otherwise display
    /// names are compared case-sensitively, and a missing name means the
    /// listings cannot be confirmed identical.
    pub fn are_identical(&self, symbol: &str, exchange_a: &str, exchange_b: &str) -> bool {
        let key_a = format!("{}:{}", exchange_a.to_lowercase(), symbol);
        let key_b = format!("{}:{}", exchange_b.to_lowercase(), symbol);

        let (id_a, id_b, map_empty) = match self.canonical_ids.read() {
            Ok(ids) => (ids.get(&key_a).cloned(), ids.get(&key_b).cloned(), ids.is_empty()),
            Err(_) => return false,
        };

        if let (Some(id_a), Some(id_b)) = (&id_a, &id_b) {
            if id_a != id_b {
                self.note_mismatch(symbol, exchange_a, exchange_b);
                return false;
            }
            return true;
        }

        if map_empty {
            return self.permissive_when_unmapped;
        }

        let names = match self.display_names.read() {
            Ok(names) => names,
            Err(_) => return false,
        };
        let Some(per_exchange) = names.get(symbol) else {
            return false;
        };

        match (
            per_exchange.get(&exchange_a.to_lowercase()),
            per_exchange.get(&exchange_b.to_lowercase()),
        ) {
            (Some(name_a), Some(name_b)) => name_a == name_b,
            _ => false,
        }
    }

    fn note_mismatch(&self, symbol: &str, exchange_a: &str, exchange_b: &str) {
        let key = format!("{}:{}:{}", symbol, exchange_a, exchange_b);
        let now = current_timestamp_ms();

        let mut last_logged = self.log_cooldown.entry(key).or_insert(0);
        if now.saturating_sub(*last_logged) > MISMATCH_LOG_COOLDOWN_MS {
            *last_logged = now;
            warn!(
                symbol,
                exchange_a,
                exchange_b,
                "canonical ids disagree; treating listings as distinct assets"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn matching_canonical_ids_confirm_identity() {
        let resolver = IdentityResolver::new(true);
        resolver.replace_canonical_ids(Some(ids(&[
            ("binance:PEPE", "pepe"),
            ("bybit:PEPE", "pepe"),
        ])));

        assert!(resolver.are_identical("PEPE", "binance", "bybit"));
    }

    #[test]
    fn conflicting_canonical_ids_reject_identity() {
        let resolver = IdentityResolver::new(true);
        resolver.replace_canonical_ids(Some(ids(&[
            ("binance:NEIRO", "neiro-ethereum"),
            ("bybit:NEIRO", "first-neiro-on-ethereum"),
        ])));

        assert!(!resolver.are_identical("NEIRO", "binance", "bybit"));
    }

    #[test]
    fn empty_canonical_map_follows_the_configured_policy() {
        let permissive = IdentityResolver::new(true);
        assert!(permissive.are_identical("BTC", "binance", "bybit"));

        let strict = IdentityResolver::new(false);
        assert!(!strict.are_identical("BTC", "binance", "bybit"));
    }

    #[test]
    fn falls_back_to_display_names_when_one_id_is_missing() {
        let resolver = IdentityResolver::new(true);
        resolver.replace_canonical_ids(Some(ids(&[("binance:BTC", "bitcoin")])));

        let mut names = HashMap::new();
        names.insert("WIF".to_string(), {
            let mut per_exchange = HashMap::new();
            per_exchange.insert("binance".to_string(), "dogwifhat".to_string());
            per_exchange.insert("bybit".to_string(), "dogwifhat".to_string());
            per_exchange.insert("gate".to_string(), "WIF Token".to_string());
            per_exchange
        });
        resolver.replace_display_names(Some(names));

        assert!(resolver.are_identical("WIF", "binance", "bybit"));
        assert!(!resolver.are_identical("WIF", "binance", "gate"));
        // symbol absent from the name map entirely
        assert!(!resolver.are_identical("DOGE", "binance", "bybit"));
        // exchange absent from the symbol's entry
        assert!(!resolver.are_identical("WIF", "binance", "okx"));
    }

    #[test]
    fn readiness_follows_canonical_map_loads() {
        let resolver = IdentityResolver::new(true);
        assert!(!resolver.is_ready());

        // empty-but-valid load changes nothing
        resolver.replace_canonical_ids(Some(HashMap::new()));
        assert!(!resolver.is_ready());

        resolver.replace_canonical_ids(Some(ids(&[("binance:BTC", "bitcoin")])));
        assert!(resolver.is_ready());

        // a failed load drops readiness but keeps the map
        resolver.replace_canonical_ids(None);
        assert!(!resolver.is_ready());
        assert!(resolver.are_identical("BTC", "binance", "binance"));
    }
}
