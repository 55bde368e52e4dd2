use serde::{Deserialize, Serialize};

pub mod loader;

use crate::detector::engine::FeeOffsetPolicy;

/// Cadences, thresholds, and policy knobs for the engine loops.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EngineConfig {
    pub price_ttl_ms: u64,
    pub eviction_interval_ms: u64,
    pub detection_interval_ms: u64,
    pub min_spread_pct: f64,
    pub fee_offset: FeeOffsetPolicy,
    /// Treat two listings as identical while the canonical-id map is empty.
    /// Turning this off fails closed until identity data has loaded.
    pub permissive_identity: bool,
    /// Gate detection on the identity data having loaded at least once.
    pub require_metadata_ready: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            price_ttl_ms: crate::PRICE_TTL_MS,        // 10 seconds
            eviction_interval_ms: 1_000,              // 1 second
            detection_interval_ms: 500,
            min_spread_pct: crate::MIN_SPREAD_TO_INCLUDE_PCT,  // 0.1%
            fee_offset: FeeOffsetPolicy::DemoOffset,
            permissive_identity: true,
            require_metadata_ready: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MetadataConfig {
    pub venues: Vec<String>,
    pub refresh_interval_ms: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        MetadataConfig {
            venues: ["binance", "bybit", "bitget", "gate", "mexc", "okx"]
                .iter()
                .map(|v| v.to_string())
                .collect(),
            refresh_interval_ms: 60_000,  // 1 minute
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            url: "redis://localhost:6379".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        KafkaConfig {
            brokers: "localhost:9092".to_string(),
            topic: "prices.quotes".to_string(),
            group_id: "spread-engine".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}
