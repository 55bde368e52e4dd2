use tracing::Span;

pub fn trace_detection_pass(symbols: usize) -> Span {
    tracing::info_span!(
        "detection_pass",
        symbols,
    )
}

pub fn trace_metadata_refresh(venues: usize) -> Span {
    tracing::info_span!(
        "metadata_refresh",
        venues,
    )
}
