use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, HistogramOpts, IntGauge, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Feed metrics
    pub static ref PRICE_UPDATES_INGESTED: Counter = Counter::new(
        "price_updates_ingested_total",
        "Total price frames ingested into the store"
    ).unwrap();

    pub static ref FRAMES_REJECTED: Counter = Counter::new(
        "feed_frames_rejected_total",
        "Total malformed feed frames dropped"
    ).unwrap();

    // Store metrics
    pub static ref SNAPSHOTS_EVICTED: Counter = Counter::new(
        "price_snapshots_evicted_total",
        "Total price snapshots removed by TTL eviction"
    ).unwrap();

    pub static ref ACTIVE_SYMBOLS: IntGauge = IntGauge::new(
        "active_symbols",
        "Symbols currently present in the price store"
    ).unwrap();

    // Metadata metrics
    pub static ref METADATA_REFRESHES: Counter = Counter::new(
        "metadata_refresh_cycles_total",
        "Total metadata refresh cycles"
    ).unwrap();

    // Detection metrics
    pub static ref DETECTION_CYCLES: Counter = Counter::new(
        "detection_cycles_total",
        "Total detection passes"
    ).unwrap();

    pub static ref OPPORTUNITIES_DETECTED: Counter = Counter::new(
        "opportunities_detected_total",
        "Total opportunities reported across all cycles"
    ).unwrap();

    pub static ref DETECTION_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "detection_latency_seconds",
            "Detection pass latency"
        ).buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1])
    ).unwrap();
}

pub fn register_metrics() {
    REGISTRY.register(Box::new(PRICE_UPDATES_INGESTED.clone())).unwrap();
    REGISTRY.register(Box::new(FRAMES_REJECTED.clone())).unwrap();
    REGISTRY.register(Box::new(SNAPSHOTS_EVICTED.clone())).unwrap();
    REGISTRY.register(Box::new(ACTIVE_SYMBOLS.clone())).unwrap();
    REGISTRY.register(Box::new(METADATA_REFRESHES.clone())).unwrap();
    REGISTRY.register(Box::new(DETECTION_CYCLES.clone())).unwrap();
    REGISTRY.register(Box::new(OPPORTUNITIES_DETECTED.clone())).unwrap();
    REGISTRY.register(Box::new(DETECTION_LATENCY.clone())).unwrap();
}
