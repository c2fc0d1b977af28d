//! Metrics for versioned request handling.
//!
//! Prometheus counters for resolved and rejected requests, generated
//! documents, and a days-until-sunset gauge per declared version.

use prometheus::{IntCounterVec, IntGaugeVec, Opts, Registry};

/// Metrics collector for a versioned service.
#[derive(Clone)]
pub struct VersioningMetrics {
    /// Registry for all metrics
    registry: Registry,

    /// Counter for dispatched requests
    pub requests_total: IntCounterVec,

    /// Counter for rejected requests, by error code
    pub rejections_total: IntCounterVec,

    /// Counter for generated documentation documents
    pub documents_total: IntCounterVec,

    /// Gauge for days until sunset for each declared version
    pub days_until_sunset: IntGaugeVec,
}

impl VersioningMetrics {
    /// Create a new metrics collector with the given prefix.
    pub fn new(prefix: &str) -> Self {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(
                format!("{}_requests_total", prefix),
                "Total number of requests dispatched to versioned operations",
            ),
            &["version", "operation", "outcome"],
        )
        .expect("Failed to create requests_total metric");

        let rejections_total = IntCounterVec::new(
            Opts::new(
                format!("{}_rejections_total", prefix),
                "Total number of requests rejected before dispatch",
            ),
            &["reason"],
        )
        .expect("Failed to create rejections_total metric");

        let documents_total = IntCounterVec::new(
            Opts::new(
                format!("{}_documents_total", prefix),
                "Total number of generated API documents served",
            ),
            &["group"],
        )
        .expect("Failed to create documents_total metric");

        let days_until_sunset = IntGaugeVec::new(
            Opts::new(
                format!("{}_days_until_sunset", prefix),
                "Days until version sunset (negative if past)",
            ),
            &["version"],
        )
        .expect("Failed to create days_until_sunset metric");

        // Register all metrics
        registry
            .register(Box::new(requests_total.clone()))
            .expect("Failed to register requests_total");
        registry
            .register(Box::new(rejections_total.clone()))
            .expect("Failed to register rejections_total");
        registry
            .register(Box::new(documents_total.clone()))
            .expect("Failed to register documents_total");
        registry
            .register(Box::new(days_until_sunset.clone()))
            .expect("Failed to register days_until_sunset");

        Self {
            registry,
            requests_total,
            rejections_total,
            documents_total,
            days_until_sunset,
        }
    }

    /// Record a dispatched request.
    pub fn record_request(&self, version: &str, operation: &str, outcome: &str) {
        self.requests_total
            .with_label_values(&[version, operation, outcome])
            .inc();
    }

    /// Record a rejected request.
    pub fn record_rejection(&self, reason: &str) {
        self.rejections_total.with_label_values(&[reason]).inc();
    }

    /// Record a generated document being served.
    pub fn record_document(&self, group: &str) {
        self.documents_total.with_label_values(&[group]).inc();
    }

    /// Update the days until sunset gauge.
    pub fn set_days_until_sunset(&self, version: &str, days: i64) {
        self.days_until_sunset
            .with_label_values(&[version])
            .set(days);
    }

    /// Get the Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode metrics in Prometheus text format.
    pub fn encode(&self) -> String {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for VersioningMetrics {
    fn default() -> Self {
        Self::new("versioned_api")
    }
}
