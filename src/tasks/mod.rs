use std::sync::Arc;
use tokio::time::{Duration, interval};
use tracing::{Instrument, debug};

use crate::detector::{OpportunityDetector, SpreadTracker};
use crate::interfaces::snapshot_publisher::SnapshotPublisher;
use crate::metadata::registry::MetadataRegistry;
use crate::observability::metrics::{
    ACTIVE_SYMBOLS, DETECTION_CYCLES, DETECTION_LATENCY, METADATA_REFRESHES,
    OPPORTUNITIES_DETECTED, SNAPSHOTS_EVICTED,
};
use crate::observability::tracing::{trace_detection_pass, trace_metadata_refresh};
use crate::price_store::PriceStore;
use crate::utils::helper::current_timestamp_ms;

/// Purges stale price snapshots and reclaims the duration-tracker entries
/// of fully evicted symbols.
pub struct EvictionTicker {
    store: Arc<PriceStore>,
    tracker: Arc<SpreadTracker>,
    interval: Duration,
    ttl: Duration,
}

impl EvictionTicker {
    pub fn new(
        store: Arc<PriceStore>,
        tracker: Arc<SpreadTracker>,
        interval: Duration,
        ttl: Duration,
    ) -> Self {
        EvictionTicker {
            store,
            tracker,
            interval,
            ttl,
        }
    }

    pub async fn run(&self) {
        let mut ticker = interval(self.interval);

        loop {
            ticker.tick().await;

            let outcome = self.store.evict_stale(current_timestamp_ms(), self.ttl);
            for symbol in &outcome.symbols_removed {
                self.tracker.forget_symbol(symbol);
            }

            SNAPSHOTS_EVICTED.inc_by(outcome.snapshots_removed as f64);
            ACTIVE_SYMBOLS.set(self.store.symbol_count() as i64);

            if !outcome.symbols_removed.is_empty() {
                debug!(
                    symbols = outcome.symbols_removed.len(),
                    snapshots = outcome.snapshots_removed,
                    "evicted idle symbols"
                );
            }
        }
    }
}

/// Reloads the metadata registry on a fixed cadence. The refresh itself is
/// the retry mechanism: a failed cycle leaves stale-but-available data in
/// place until the next tick.
pub struct RefreshTicker {
    registry: Arc<MetadataRegistry>,
    interval: Duration,
    venues: usize,
}

impl RefreshTicker {
    pub fn new(registry: Arc<MetadataRegistry>, interval: Duration, venues: usize) -> Self {
        RefreshTicker {
            registry,
            interval,
            venues,
        }
    }

    pub async fn run(&self) {
        let mut ticker = interval(self.interval);

        loop {
            // first tick fires immediately, so metadata loads at startup
            ticker.tick().await;

            self.registry
                .refresh()
                .instrument(trace_metadata_refresh(self.venues))
                .await;
            METADATA_REFRESHES.inc();

            debug!(ready = self.registry.is_ready(), "metadata refreshed");
        }
    }
}

/// Runs a detection pass and hands non-empty result sets to the publisher.
pub struct DetectionTicker {
    store: Arc<PriceStore>,
    detector: OpportunityDetector,
    publisher: Arc<dyn SnapshotPublisher>,
    interval: Duration,
}

impl DetectionTicker {
    pub fn new(
        store: Arc<PriceStore>,
        detector: OpportunityDetector,
        publisher: Arc<dyn SnapshotPublisher>,
        interval: Duration,
    ) -> Self {
        DetectionTicker {
            store,
            detector,
            publisher,
            interval,
        }
    }

    pub async fn run(&self) {
        let mut ticker = interval(self.interval);

        loop {
            ticker.tick().await;

            let span = trace_detection_pass(self.store.symbol_count());
            let _guard = span.enter();

            let timer = DETECTION_LATENCY.start_timer();
            let analyses = self.detector.detect(&self.store);
            timer.observe_duration();

            DETECTION_CYCLES.inc();

            if analyses.is_empty() {
                continue;
            }

            let total: usize = analyses.iter().map(|a| a.opportunities.len()).sum();
            OPPORTUNITIES_DETECTED.inc_by(total as f64);

            self.publisher.publish(&analyses);
        }
    }
}
