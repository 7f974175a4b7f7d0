//! Metrics for fetch and snapshot runs
//!
//! Recorded through the `metrics` facade. The run-once tools install no
//! exporter, so these are no-ops unless an embedding application provides a
//! recorder.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all votewatch metrics
pub const METRICS_PREFIX: &str = "votewatch";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_api_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total voting-records API requests"
    );

    describe_counter!(
        format!("{}_api_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Voting-records API requests that failed"
    );

    describe_histogram!(
        format!("{}_api_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Voting-records API latency in seconds"
    );

    describe_counter!(
        format!("{}_records_inserted_total", METRICS_PREFIX),
        Unit::Count,
        "Records newly added to a snapshot"
    );

    describe_counter!(
        format!("{}_records_skipped_total", METRICS_PREFIX),
        Unit::Count,
        "Records dropped from a batch with a diagnostic"
    );

    tracing::debug!("Metrics registered");
}

/// Tracks one upstream request
pub struct FetchMetrics {
    start: Instant,
    endpoint: &'static str,
}

impl FetchMetrics {
    /// Start tracking a request to `endpoint` (a route template, never a URL with the key)
    pub fn start(endpoint: &'static str) -> Self {
        Self {
            start: Instant::now(),
            endpoint,
        }
    }

    /// Record completion; `status` is `None` for connection failures
    pub fn finish(self, status: Option<u16>) {
        let duration = self.start.elapsed().as_secs_f64();
        let status_label = status.map(|s| s.to_string()).unwrap_or_else(|| "error".to_string());
        let success = status.map(|s| (200..300).contains(&s)).unwrap_or(false);

        counter!(
            format!("{}_api_requests_total", METRICS_PREFIX),
            "endpoint" => self.endpoint,
            "status" => status_label
        )
        .increment(1);

        if success {
            histogram!(
                format!("{}_api_request_duration_seconds", METRICS_PREFIX),
                "endpoint" => self.endpoint
            )
            .record(duration);
        } else {
            counter!(
                format!("{}_api_failures_total", METRICS_PREFIX),
                "endpoint" => self.endpoint
            )
            .increment(1);
        }
    }
}

/// Record the result of one snapshot merge
pub fn record_merge(snapshot: &str, inserted: usize, skipped: usize) {
    counter!(
        format!("{}_records_inserted_total", METRICS_PREFIX),
        "snapshot" => snapshot.to_string()
    )
    .increment(inserted as u64);

    counter!(
        format!("{}_records_skipped_total", METRICS_PREFIX),
        "snapshot" => snapshot.to_string()
    )
    .increment(skipped as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_metrics_without_recorder() {
        register_metrics();
        FetchMetrics::start("/divisions.json").finish(Some(200));
        FetchMetrics::start("/divisions/{id}.json").finish(None);
        record_merge("divisions", 3, 1);
    }
}
