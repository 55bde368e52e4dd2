use crate::detector::SymbolAnalysis;

/// Sink for each detection cycle's ranked result set. The detection loop
/// never publishes an empty set.
pub trait SnapshotPublisher: Send + Sync {
    fn publish(&self, analyses: &[SymbolAnalysis]);
}
