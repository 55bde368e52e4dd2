use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::interfaces::metadata_source::MetadataSource;
use crate::metadata::ExchangeMetadata;
use crate::metadata::identity::IdentityResolver;
use crate::metadata::network::normalize_network;

pub const EXCHANGE_INFO_KEY_PREFIX: &str = "meta:info:";
pub const IDENTITY_MAP_KEY: &str = "meta:identity-map";
pub const CANONICAL_ID_MAP_KEY: &str = "meta:cg-map";

/// Taker fee assumed when an exchange has not published one.
const DEFAULT_TAKER_FEE: f64 = 0.001;

/// Read-mostly registry of per-(exchange, symbol) trading metadata, plus the
/// asset-identity resolution state.
///
/// Everything here is advisory: a venue whose blob fails to load keeps
/// serving its previously cached metadata, and every accessor degrades to a
/// documented permissive default rather than refusing to answer.
pub struct MetadataRegistry {
    source: Arc<dyn MetadataSource>,
    venues: Vec<String>,
    cache: DashMap<String, HashMap<String, ExchangeMetadata>>,
    identity: IdentityResolver,
}

impl MetadataRegistry {
    pub fn new(
        source: Arc<dyn MetadataSource>,
        venues: Vec<String>,
        permissive_identity: bool,
    ) -> Self {
        MetadataRegistry {
            source,
            venues,
            cache: DashMap::new(),
            identity: IdentityResolver::new(permissive_identity),
        }
    }

    /// Reload every venue blob, then both identity maps. Per-venue failures
    /// leave that venue's cached entry untouched; periodic refresh is the
    /// retry mechanism.
    pub async fn refresh(&self) {
        for venue in &self.venues {
            self.load_venue(venue).await;
        }
        self.load_identity_map().await;
        self.load_canonical_map().await;
    }

    async fn load_venue(&self, venue: &str) {
        let key = format!("{}{}", EXCHANGE_INFO_KEY_PREFIX, venue);
        match self.source.fetch(&key).await {
            Ok(Some(json)) => {
                match serde_json::from_str::<HashMap<String, ExchangeMetadata>>(&json) {
                    Ok(blob) => {
                        debug!(venue, symbols = blob.len(), "metadata blob loaded");
                        self.cache.insert(venue.to_string(), blob);
                    }
                    Err(e) => {
                        warn!(venue, error = %e, "metadata blob failed to parse; keeping cached entry");
                    }
                }
            }
            Ok(None) => debug!(venue, "no metadata blob published; keeping cached entry"),
            Err(e) => warn!(venue, error = %e, "metadata fetch failed; keeping cached entry"),
        }
    }

    async fn load_identity_map(&self) {
        let loaded = match self.source.fetch(IDENTITY_MAP_KEY).await {
            Ok(Some(json)) => serde_json::from_str(&json).ok(),
            _ => None,
        };
        self.identity.replace_display_names(loaded);
    }

    async fn load_canonical_map(&self) {
        let loaded = match self.source.fetch(CANONICAL_ID_MAP_KEY).await {
            Ok(Some(json)) => serde_json::from_str::<HashMap<String, String>>(&json).ok(),
            _ => None,
        };
        self.identity.replace_canonical_ids(loaded);
    }

    /// Whether the canonical-id map has ever loaded with at least one entry.
    /// Intended as the upstream gating signal for consuming detector output.
    pub fn is_ready(&self) -> bool {
        self.identity.is_ready()
    }

    /// Whether `symbol` on both exchanges denotes the same underlying asset.
    pub fn are_identical(&self, symbol: &str, exchange_a: &str, exchange_b: &str) -> bool {
        self.identity.are_identical(symbol, exchange_a, exchange_b)
    }

    fn metadata(&self, exchange: &str, symbol: &str) -> Option<ExchangeMetadata> {
        self.cache
            .get(exchange)
            .and_then(|blob| blob.get(symbol).cloned())
    }

    /// Taker fee for a venue; 0.001 when unknown.
    pub fn get_taker_fee(&self, exchange: &str, symbol: &str) -> f64 {
        self.metadata(exchange, symbol)
            .and_then(|meta| meta.fees)
            .and_then(|fees| fees.taker)
            .unwrap_or(DEFAULT_TAKER_FEE)
    }

    pub fn get_funding_rate(&self, exchange: &str, symbol: &str) -> Option<f64> {
        self.metadata(exchange, symbol)
            .and_then(|meta| meta.futures)
            .and_then(|futures| futures.funding_rate)
    }

    pub fn get_next_funding_time(&self, exchange: &str, symbol: &str) -> Option<u64> {
        self.metadata(exchange, symbol)
            .and_then(|meta| meta.futures)
            .and_then(|futures| futures.next_funding_time)
    }

    pub fn get_max_position_cost(&self, exchange: &str, symbol: &str) -> Option<f64> {
        self.metadata(exchange, symbol)
            .and_then(|meta| meta.futures)
            .and_then(|futures| futures.max_cost)
    }

    /// Withdraw fee for one of a venue's networks, under the venue's own
    /// network name; 0.0 when unknown.
    pub fn get_network_withdraw_fee(&self, exchange: &str, symbol: &str, network: &str) -> f64 {
        self.metadata(exchange, symbol)
            .and_then(|meta| meta.wallet)
            .and_then(|wallet| wallet.networks)
            .and_then(|networks| networks.get(network).cloned())
            .and_then(|detail| detail.withdraw_fee)
            .unwrap_or(0.0)
    }

    /// Permissive default: absent wallet metadata never hides a spread.
    pub fn is_withdrawal_enabled(&self, exchange: &str, symbol: &str) -> bool {
        self.metadata(exchange, symbol)
            .and_then(|meta| meta.wallet)
            .map(|wallet| wallet.withdraw)
            .unwrap_or(true)
    }

    pub fn is_deposit_enabled(&self, exchange: &str, symbol: &str) -> bool {
        self.metadata(exchange, symbol)
            .and_then(|meta| meta.wallet)
            .map(|wallet| wallet.deposit)
            .unwrap_or(true)
    }

    /// Networks usable to move `symbol` from `source_exchange` to
    /// `target_exchange`: withdraw-enabled on the source and, after
    /// canonicalization, deposit-enabled on the target. Returned under the
    /// source's original names, cheapest source withdraw fee first. Empty
    /// when either side lacks wallet metadata.
    pub fn find_common_networks(
        &self,
        source_exchange: &str,
        target_exchange: &str,
        symbol: &str,
    ) -> Vec<String> {
        let source_networks = match self
            .metadata(source_exchange, symbol)
            .and_then(|meta| meta.wallet)
            .and_then(|wallet| wallet.networks)
        {
            Some(networks) => networks,
            None => return Vec::new(),
        };
        let target_networks = match self
            .metadata(target_exchange, symbol)
            .and_then(|meta| meta.wallet)
            .and_then(|wallet| wallet.networks)
        {
            Some(networks) => networks,
            None => return Vec::new(),
        };

        let target_canonical: HashSet<String> = target_networks
            .iter()
            .filter(|(_, detail)| detail.deposit)
            .map(|(name, _)| normalize_network(name))
            .collect();

        let mut usable: Vec<String> = source_networks
            .iter()
            .filter(|(_, detail)| detail.withdraw)
            .filter(|(name, _)| target_canonical.contains(&normalize_network(name)))
            .map(|(name, _)| name.clone())
            .collect();

        usable.sort_by(|a, b| {
            let fee_a = self.get_network_withdraw_fee(source_exchange, symbol, a);
            let fee_b = self.get_network_withdraw_fee(source_exchange, symbol, b);
            fee_a
                .partial_cmp(&fee_b)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        usable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::RwLock;

    use crate::error::{Error, Result};

    /// In-memory stand-in for the Redis source.
    struct MapSource {
        entries: RwLock<HashMap<String, String>>,
        fail: RwLock<bool>,
    }

    impl MapSource {
        fn new() -> Self {
            MapSource {
                entries: RwLock::new(HashMap::new()),
                fail: RwLock::new(false),
            }
        }

        fn set(&self, key: &str, value: &str) {
            self.entries
                .write()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }

        fn remove(&self, key: &str) {
            self.entries.write().unwrap().remove(key);
        }

        fn set_failing(&self, fail: bool) {
            *self.fail.write().unwrap() = fail;
        }
    }

    #[async_trait]
    impl MetadataSource for MapSource {
        async fn fetch(&self, key: &str) -> Result<Option<String>> {
            if *self.fail.read().unwrap() {
                return Err(Error::RedisError("connection refused".to_string()));
            }
            Ok(self.entries.read().unwrap().get(key).cloned())
        }
    }

    fn registry_with(source: Arc<MapSource>, venues: &[&str]) -> MetadataRegistry {
        MetadataRegistry::new(
            source,
            venues.iter().map(|v| v.to_string()).collect(),
            true,
        )
    }

    const BINANCE_BLOB: &str = r#"{
        "BTC": {
            "s": "BTC",
            "w": {
                "deposit": true,
                "withdraw": true,
                "networks": {
                    "BTC": {"deposit": true, "withdraw": true, "withdrawFee": 0.0002},
                    "BEP20": {"deposit": true, "withdraw": true, "withdrawFee": 0.00001},
                    "ERC20": {"deposit": true, "withdraw": false, "withdrawFee": 0.00005},
                    "Lightning": {"deposit": true, "withdraw": true, "withdrawFee": 0.000001}
                }
            },
            "f": {"maxCost": 1000000.0, "fundingRate": 0.00013, "nextFundingTime": 1754600000000},
            "fees": {"taker": 0.00075, "maker": 0.0002},
            "ts": 1754553600000
        }
    }"#;

    const BYBIT_BLOB: &str = r#"{
        "BTC": {
            "s": "BTC",
            "w": {
                "deposit": true,
                "withdraw": true,
                "networks": {
                    "BSC (BEP20)": {"deposit": true, "withdraw": true, "withdrawFee": 0.00002},
                    "Ethereum": {"deposit": true, "withdraw": true, "withdrawFee": 0.0001},
                    "Tron": {"deposit": false, "withdraw": true, "withdrawFee": 0.0}
                }
            }
        }
    }"#;

    #[tokio::test]
    async fn refresh_loads_venue_blobs_and_serves_accessors() {
        let source = Arc::new(MapSource::new());
        source.set("meta:info:binance", BINANCE_BLOB);
        let registry = registry_with(source, &["binance"]);

        registry.refresh().await;

        assert_eq!(registry.get_taker_fee("binance", "BTC"), 0.00075);
        assert_eq!(registry.get_funding_rate("binance", "BTC"), Some(0.00013));
        assert_eq!(
            registry.get_next_funding_time("binance", "BTC"),
            Some(1754600000000)
        );
        assert_eq!(
            registry.get_max_position_cost("binance", "BTC"),
            Some(1000000.0)
        );
        assert!(registry.is_withdrawal_enabled("binance", "BTC"));
        assert_eq!(
            registry.get_network_withdraw_fee("binance", "BTC", "BEP20"),
            0.00001
        );
    }

    #[tokio::test]
    async fn accessors_fall_back_to_documented_defaults() {
        let registry = registry_with(Arc::new(MapSource::new()), &["binance"]);
        registry.refresh().await;

        assert_eq!(registry.get_taker_fee("binance", "BTC"), 0.001);
        assert_eq!(registry.get_funding_rate("binance", "BTC"), None);
        assert_eq!(registry.get_next_funding_time("binance", "BTC"), None);
        assert_eq!(registry.get_max_position_cost("binance", "BTC"), None);
        assert!(registry.is_withdrawal_enabled("binance", "BTC"));
        assert!(registry.is_deposit_enabled("binance", "BTC"));
        assert_eq!(
            registry.get_network_withdraw_fee("binance", "BTC", "BTC"),
            0.0
        );
    }

    #[tokio::test]
    async fn failed_or_missing_blob_keeps_the_cached_entry() {
        let source = Arc::new(MapSource::new());
        source.set("meta:info:binance", BINANCE_BLOB);
        let registry = registry_with(source.clone(), &["binance"]);
        registry.refresh().await;

        // blob disappears from the source
        source.remove("meta:info:binance");
        registry.refresh().await;
        assert_eq!(registry.get_taker_fee("binance", "BTC"), 0.00075);

        // blob comes back corrupted
        source.set("meta:info:binance", "{not json");
        registry.refresh().await;
        assert_eq!(registry.get_taker_fee("binance", "BTC"), 0.00075);

        // source goes down entirely
        source.set_failing(true);
        registry.refresh().await;
        assert_eq!(registry.get_taker_fee("binance", "BTC"), 0.00075);
    }

    #[tokio::test]
    async fn readiness_tracks_canonical_map_loads_across_refreshes() {
        let source = Arc::new(MapSource::new());
        let registry = registry_with(source.clone(), &[]);

        registry.refresh().await;
        assert!(!registry.is_ready());

        source.set("meta:cg-map", r#"{"binance:BTC": "bitcoin"}"#);
        registry.refresh().await;
        assert!(registry.is_ready());

        // an empty-but-valid load changes nothing
        source.set("meta:cg-map", "{}");
        registry.refresh().await;
        assert!(registry.is_ready());

        // the key vanishing is a failed load
        source.remove("meta:cg-map");
        registry.refresh().await;
        assert!(!registry.is_ready());
    }

    #[tokio::test]
    async fn identity_resolution_uses_loaded_maps() {
        let source = Arc::new(MapSource::new());
        source.set(
            "meta:cg-map",
            r#"{"binance:BTC": "bitcoin", "bybit:BTC": "bitcoin", "gate:VRA": "verasity", "mexc:VRA": "virtual-reality-asset"}"#,
        );
        source.set(
            "meta:identity-map",
            r#"{"TAO": {"binance": "Bittensor", "okx": "Bittensor"}}"#,
        );
        let registry = registry_with(source, &[]);
        registry.refresh().await;

        assert!(registry.are_identical("BTC", "binance", "bybit"));
        assert!(!registry.are_identical("VRA", "gate", "mexc"));
        // no canonical ids for TAO, falls back to display names
        assert!(registry.are_identical("TAO", "binance", "okx"));
        assert!(!registry.are_identical("TAO", "binance", "bybit"));
    }

    #[tokio::test]
    async fn common_networks_are_canonicalized_filtered_and_fee_sorted() {
        let source = Arc::new(MapSource::new());
        source.set("meta:info:binance", BINANCE_BLOB);
        source.set("meta:info:bybit", BYBIT_BLOB);
        let registry = registry_with(source, &["binance", "bybit"]);
        registry.refresh().await;

        // binance -> bybit: BEP20 matches "BSC (BEP20)", ERC20 is
        // withdraw-disabled at the source, Lightning/BTC have no deposit
        // rail on the target.
        let networks = registry.find_common_networks("binance", "bybit", "BTC");
        assert_eq!(networks, vec!["BEP20".to_string()]);

        // bybit -> binance: Tron is withdrawable but binance has no trx
        // rail; Ethereum maps to ERC20 (deposit-enabled on binance) and
        // "BSC (BEP20)" maps to BEP20. Cheapest source fee first.
        let networks = registry.find_common_networks("bybit", "binance", "BTC");
        assert_eq!(
            networks,
            vec!["BSC (BEP20)".to_string(), "Ethereum".to_string()]
        );

        // either side without wallet metadata yields nothing
        assert!(
            registry
                .find_common_networks("binance", "okx", "BTC")
                .is_empty()
        );
    }
}
