// src/metrics.rs
use axum::{routing::get, Router};
use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and register series descriptions.
    pub fn init(cache_ttl_secs: i64) -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        ensure_metrics_described();
        gauge!("translation_cache_ttl_secs").set(cache_ttl_secs as f64);

        Self { handle }
    }

    /// Router exposing `/metrics` in Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time registration so series show up on /metrics before first use.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("webhook_events_total", "Inbound webhook deliveries.");
        describe_counter!(
            "events_discarded_total",
            "Events dropped by topic/id/content gates."
        );
        describe_counter!(
            "dedup_suppressed_total",
            "Events suppressed as duplicates within the window."
        );
        describe_counter!(
            "translate_skipped_total",
            "Translations skipped for skip-list/target languages."
        );
        describe_counter!("translate_cache_hits_total", "Translation cache hits.");
        describe_counter!(
            "translate_accepted_total",
            "Provider responses accepted by the validator."
        );
        describe_counter!(
            "translate_rejected_total",
            "Provider responses rejected as garbage/echo."
        );
        describe_counter!(
            "translate_exhausted_total",
            "Inputs for which every provider failed."
        );
        describe_counter!("provider_errors_total", "Provider call failures.");
        describe_counter!("notes_posted_total", "Translation notes posted.");
        describe_counter!("note_errors_total", "Failed note posts (swallowed).");
    });
}
