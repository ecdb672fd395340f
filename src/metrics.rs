use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all engine metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload for the embedding service.
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // Pre-register counters so they appear even before the first increment.
    counter!("picks_generated_total").absolute(0);
    counter!("picks_filtered_total").absolute(0);
    counter!("parlays_generated_total").absolute(0);
    counter!("parlay_candidates_rejected_total").absolute(0);
    counter!("picks_settled_total").absolute(0);
    counter!("parlays_settled_total").absolute(0);

    // Pre-register gauges at zero.
    gauge!("eligible_games").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("pick_generation_seconds").record(0.0);

    handle
}
