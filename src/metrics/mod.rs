//! Metrics collection for observability

use prometheus::{
    CounterVec, Histogram, HistogramOpts, Opts, Registry,
    register_counter_vec_with_registry, register_histogram_with_registry,
};
use std::sync::Arc;
use once_cell::sync::Lazy;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Recognize endpoint
    pub recognize_requests: CounterVec,
    pub recognize_request_duration: Histogram,

    // Upstream models
    pub model_attempts: CounterVec,
    pub model_catalog_lookups: CounterVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let recognize_requests = register_counter_vec_with_registry!(
            Opts::new("recognize_requests_total", "Total handwriting recognition requests"),
            &["status"],
            registry
        )?;

        let recognize_request_duration = register_histogram_with_registry!(
            HistogramOpts::new(
                "recognize_request_duration_seconds",
                "Recognition request duration in seconds"
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
            registry
        )?;

        let model_attempts = register_counter_vec_with_registry!(
            Opts::new("model_attempts_total", "Recognition attempts per candidate model"),
            &["model", "outcome"],
            registry
        )?;

        let model_catalog_lookups = register_counter_vec_with_registry!(
            Opts::new("model_catalog_lookups_total", "Diagnostic model catalog lookups"),
            &["status"],
            registry
        )?;

        Ok(Self {
            registry,
            recognize_requests,
            recognize_request_duration,
            model_attempts,
            model_catalog_lookups,
        })
    }

    /// Record a finished recognize request
    pub fn record_recognize(&self, status: &str, elapsed_secs: f64) {
        self.recognize_requests.with_label_values(&[status]).inc();
        self.recognize_request_duration.observe(elapsed_secs);
    }

    /// Record one call against a candidate model
    pub fn record_model_attempt(&self, model: &str, success: bool) {
        let outcome = if success { "success" } else { "error" };
        self.model_attempts.with_label_values(&[model, outcome]).inc();
    }

    /// Record a diagnostic catalog lookup
    pub fn record_catalog_lookup(&self, success: bool) {
        let status = if success { "success" } else { "error" };
        self.model_catalog_lookups.with_label_values(&[status]).inc();
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}
