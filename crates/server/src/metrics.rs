//! Prometheus metrics for observability.
//!
//! Queue and gate gauges are sampled at scrape time from the dispatcher
//! status; run counters are bumped by the extract handlers.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Items waiting for extraction.
pub static EXTRACT_QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "libretto_extract_queue_depth",
        "Items waiting in the extraction queue",
    )
    .unwrap()
});

/// Items waiting for intro/credits analysis.
pub static ANALYSIS_QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "libretto_analysis_queue_depth",
        "Items waiting in the analysis queue",
    )
    .unwrap()
});

/// Current gate capacity.
pub static GATE_CAPACITY: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "libretto_gate_capacity",
        "Concurrency gate capacity",
    )
    .unwrap()
});

/// Permits currently held.
pub static GATE_HELD: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "libretto_gate_held",
        "Concurrency gate permits currently held",
    )
    .unwrap()
});

/// Batch runs started since startup.
pub static EXTRACT_RUNS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "libretto_extract_runs_total",
        "Extraction batch runs started",
    )
    .unwrap()
});

/// Batch runs cancelled since startup.
pub static EXTRACT_RUNS_CANCELLED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "libretto_extract_runs_cancelled_total",
        "Extraction batch runs cancelled",
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(EXTRACT_QUEUE_DEPTH.clone()))
        .unwrap();
    registry
        .register(Box::new(ANALYSIS_QUEUE_DEPTH.clone()))
        .unwrap();
    registry.register(Box::new(GATE_CAPACITY.clone())).unwrap();
    registry.register(Box::new(GATE_HELD.clone())).unwrap();
    registry
        .register(Box::new(EXTRACT_RUNS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(EXTRACT_RUNS_CANCELLED_TOTAL.clone()))
        .unwrap();
}

/// Render the registry in the Prometheus text format.
pub fn encode() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_registered_metrics() {
        EXTRACT_QUEUE_DEPTH.set(3);
        let output = encode();
        assert!(output.contains("libretto_extract_queue_depth"));
    }
}
