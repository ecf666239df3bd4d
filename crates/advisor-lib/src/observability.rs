//! Observability infrastructure for the instance advisor
//!
//! Provides:
//! - Prometheus metrics (recommendation latency, table load latency, outcomes)
//! - Structured JSON logging of recommendation events with tracing

use crate::models::Recommendation;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Histogram, HistogramVec, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for engine latency (in seconds)
const ENGINE_LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1,
];

/// Histogram buckets for table fetch + decode latency (in seconds)
const LOAD_LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

/// Buckets for how many candidates a ranked recommendation returns
const CANDIDATE_BUCKETS: &[f64] = &[0.0, 1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 50.0];

static GLOBAL_METRICS: OnceLock<AdvisorMetricsInner> = OnceLock::new();

struct AdvisorMetricsInner {
    recommendation_latency_seconds: Histogram,
    table_load_latency_seconds: HistogramVec,
    recommendations_total: IntCounterVec,
    candidates_returned: Histogram,
    table_errors_total: IntCounter,
    requests_rejected_total: IntCounter,
}

impl AdvisorMetricsInner {
    fn new() -> Self {
        Self {
            recommendation_latency_seconds: register_histogram!(
                "instance_advisor_recommendation_latency_seconds",
                "Time spent ranking candidates for one recommendation",
                ENGINE_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register recommendation_latency_seconds"),

            table_load_latency_seconds: register_histogram_vec!(
                "instance_advisor_table_load_latency_seconds",
                "Time spent fetching and decoding lookup tables",
                &["source_kind"],
                LOAD_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register table_load_latency_seconds"),

            recommendations_total: register_int_counter_vec!(
                "instance_advisor_recommendations_total",
                "Recommendations served, by outcome",
                &["outcome"]
            )
            .expect("Failed to register recommendations_total"),

            candidates_returned: register_histogram!(
                "instance_advisor_candidates_returned",
                "Number of ranked candidates returned per recommendation",
                CANDIDATE_BUCKETS.to_vec()
            )
            .expect("Failed to register candidates_returned"),

            table_errors_total: register_int_counter!(
                "instance_advisor_table_errors_total",
                "Failures fetching or decoding lookup tables"
            )
            .expect("Failed to register table_errors_total"),

            requests_rejected_total: register_int_counter!(
                "instance_advisor_requests_rejected_total",
                "Requests rejected by validation before any table was loaded"
            )
            .expect("Failed to register requests_rejected_total"),
        }
    }
}

/// Handle to the process-wide advisor metrics
///
/// Clones share the same registered collectors.
#[derive(Clone)]
pub struct AdvisorMetrics {
    _private: (),
}

impl Default for AdvisorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AdvisorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AdvisorMetricsInner {
        GLOBAL_METRICS.get_or_init(AdvisorMetricsInner::new)
    }

    pub fn observe_recommendation_latency(&self, duration_secs: f64) {
        self.inner().recommendation_latency_seconds.observe(duration_secs);
    }

    /// `source_kind` is "fs" or "http"
    pub fn observe_table_load_latency(&self, source_kind: &str, duration_secs: f64) {
        self.inner()
            .table_load_latency_seconds
            .with_label_values(&[source_kind])
            .observe(duration_secs);
    }

    /// Count an outcome; `outcome` is a `Recommendation::outcome_label` or "unknown_source"
    pub fn inc_outcome(&self, outcome: &str) {
        self.inner()
            .recommendations_total
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn observe_candidates_returned(&self, count: usize) {
        self.inner().candidates_returned.observe(count as f64);
    }

    pub fn inc_table_errors(&self) {
        self.inner().table_errors_total.inc();
    }

    pub fn inc_requests_rejected(&self) {
        self.inner().requests_rejected_total.inc();
    }

    pub fn requests_rejected(&self) -> u64 {
        self.inner().requests_rejected_total.get()
    }

    pub fn outcome_count(&self, outcome: &str) -> u64 {
        self.inner()
            .recommendations_total
            .with_label_values(&[outcome])
            .get()
    }
}

/// Structured logger for advisor events
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn log_startup(&self, version: &str, listen_addr: &str) {
        info!(
            event = "advisor_started",
            service = %self.service_name,
            version = %version,
            listen_addr = %listen_addr,
            "Instance advisor started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "advisor_shutdown",
            service = %self.service_name,
            reason = %reason,
            "Instance advisor shutting down"
        );
    }

    pub fn log_tables_loaded(
        &self,
        location: &str,
        catalog_entries: usize,
        relation_rows: usize,
        elapsed_ms: f64,
    ) {
        info!(
            event = "tables_loaded",
            service = %self.service_name,
            location = %location,
            catalog_entries = catalog_entries,
            relation_rows = relation_rows,
            elapsed_ms = elapsed_ms,
            "Loaded catalog and interchangeability tables"
        );
    }

    /// Log the outcome of a recommendation that reached the engine
    pub fn log_recommendation(&self, recommendation: &Recommendation, limit: usize) {
        match recommendation {
            Recommendation::Ranked(result) => {
                info!(
                    event = "recommendation_ranked",
                    service = %self.service_name,
                    current = %result.source,
                    required_vcpus = result.requirement.vcpus,
                    required_memory_mib = result.requirement.memory_mib,
                    required_gpus = result.requirement.gpus,
                    best = %result.best.name,
                    best_score = result.best.score,
                    returned = result.top.len(),
                    limit = limit,
                    "Ranked replacement candidates"
                );
            }
            Recommendation::Empty(empty) => {
                info!(
                    event = "recommendation_empty",
                    service = %self.service_name,
                    current = %empty.source,
                    reason = %empty.reason.as_str(),
                    details = %empty.message,
                    "No replacement available"
                );
            }
        }
    }

    pub fn log_failure(&self, current: Option<&str>, error: &dyn std::error::Error) {
        warn!(
            event = "recommendation_failed",
            service = %self.service_name,
            current = current.unwrap_or("<none>"),
            error = %error,
            "Recommendation request failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmptyOutcome, EmptyReason, Requirement};

    #[test]
    fn test_advisor_metrics_observations() {
        let metrics = AdvisorMetrics::new();

        metrics.observe_recommendation_latency(0.0001);
        metrics.observe_table_load_latency("fs", 0.02);
        metrics.observe_candidates_returned(3);
        metrics.inc_table_errors();
        metrics.inc_requests_rejected();

        let before = metrics.outcome_count("observability_test");
        metrics.inc_outcome("observability_test");
        assert_eq!(metrics.outcome_count("observability_test"), before + 1);
    }

    #[test]
    fn test_metrics_handles_share_collectors() {
        let a = AdvisorMetrics::new();
        let b = a.clone();

        let before = a.outcome_count("shared_handle_test");
        b.inc_outcome("shared_handle_test");
        assert_eq!(a.outcome_count("shared_handle_test"), before + 1);
    }

    #[test]
    fn test_structured_logger_accepts_outcomes() {
        let logger = StructuredLogger::new("test-advisor");
        assert_eq!(logger.service_name, "test-advisor");

        logger.log_recommendation(
            &Recommendation::Empty(EmptyOutcome {
                message: "No interchangeable instances found for a.".to_string(),
                reason: EmptyReason::NoInterchangeableInstances,
                source: "a".to_string(),
                requirement: Requirement::default(),
            }),
            3,
        );
    }
}
