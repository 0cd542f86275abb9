//! Metrics for tracking deprecated API version usage.
//!
//! Provides Prometheus metrics for monitoring requests to deprecated
//! versions and time remaining until sunset.

use prometheus::{IntCounterVec, IntGaugeVec, Opts, Registry};

/// Metrics collector for deprecated version usage.
#[derive(Clone)]
pub struct VersionMetrics {
    /// Registry for all metrics
    registry: Registry,

    /// Counter for requests to deprecated versions
    pub requests_total: IntCounterVec,

    /// Gauge for days until sunset for each version
    pub days_until_sunset: IntGaugeVec,
}

impl VersionMetrics {
    /// Create a new metrics collector with the given prefix.
    pub fn new(prefix: &str) -> Self {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(
                format!("{}_requests_total", prefix),
                "Total number of requests to deprecated API versions",
            ),
            &["version", "status"],
        )
        .expect("Failed to create requests_total metric");

        let days_until_sunset = IntGaugeVec::new(
            Opts::new(
                format!("{}_days_until_sunset", prefix),
                "Days until version sunset (negative if past)",
            ),
            &["version"],
        )
        .expect("Failed to create days_until_sunset metric");

        registry
            .register(Box::new(requests_total.clone()))
            .expect("Failed to register requests_total");
        registry
            .register(Box::new(days_until_sunset.clone()))
            .expect("Failed to register days_until_sunset");

        Self {
            registry,
            requests_total,
            days_until_sunset,
        }
    }

    /// Record a request to a deprecated version. Status is `deprecated` or
    /// `sunset` depending on whether the sunset date has passed.
    pub fn record_request(&self, version: &str, status: &str) {
        self.requests_total
            .with_label_values(&[version, status])
            .inc();
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
        encoder.encode(&metric_families, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }
}

impl Default for VersionMetrics {
    fn default() -> Self {
        Self::new("api_version_deprecation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = VersionMetrics::new("test");
        // Record a value to initialize the metric
        metrics.record_request("1.1", "deprecated");
        assert!(!metrics.encode().is_empty());
    }

    #[test]
    fn test_record_request() {
        let metrics = VersionMetrics::new("test");
        metrics.record_request("1.1", "deprecated");
        metrics.record_request("1.0", "sunset");

        let output = metrics.encode();
        assert!(output.contains("test_requests_total"));
        assert!(output.contains("1.1"));
        assert!(output.contains("sunset"));
    }

    #[test]
    fn test_days_until_sunset() {
        let metrics = VersionMetrics::new("test");
        metrics.set_days_until_sunset("1.1", 30);

        let output = metrics.encode();
        assert!(output.contains("test_days_until_sunset"));
        assert!(output.contains("30"));
    }
}
