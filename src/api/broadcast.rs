use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use crate::detector::SymbolAnalysis;
use crate::interfaces::snapshot_publisher::SnapshotPublisher;

/// Fans each detection cycle's analyses out to WebSocket subscribers and
/// keeps the latest copy for REST reads.
pub struct BroadcastPublisher {
    tx: broadcast::Sender<Arc<Vec<SymbolAnalysis>>>,
    latest: RwLock<Arc<Vec<SymbolAnalysis>>>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        BroadcastPublisher {
            tx,
            latest: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Vec<SymbolAnalysis>>> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> Arc<Vec<SymbolAnalysis>> {
        self.latest
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|_| Arc::new(Vec::new()))
    }
}

impl SnapshotPublisher for BroadcastPublisher {
    fn publish(&self, analyses: &[SymbolAnalysis]) {
        let payload = Arc::new(analyses.to_vec());

        if let Ok(mut guard) = self.latest.write() {
            *guard = payload.clone();
        }

        // send only fails when no subscriber is connected
        let _ = self.tx.send(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(symbol: &str) -> SymbolAnalysis {
        SymbolAnalysis {
            symbol: symbol.to_string(),
            best_spread_perp_perp: 0.9,
            best_spread_spot_perp: 0.0,
            best_spread_spot_spot: 0.0,
            opportunities: Vec::new(),
        }
    }

    #[tokio::test]
    async fn publish_reaches_subscribers_and_updates_latest() {
        let publisher = BroadcastPublisher::new(8);
        let mut rx = publisher.subscribe();

        publisher.publish(&[analysis("BTC")]);

        let received = rx.recv().await.expect("subscriber should receive");
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].symbol, "BTC");

        assert_eq!(publisher.latest()[0].symbol, "BTC");
    }

    #[test]
    fn publish_without_subscribers_still_updates_latest() {
        let publisher = BroadcastPublisher::new(8);
        publisher.publish(&[analysis("ETH")]);
        assert_eq!(publisher.latest()[0].symbol, "ETH");
    }
}
