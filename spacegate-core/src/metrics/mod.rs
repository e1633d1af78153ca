//! Metrics for the gateway and the Space creation flow
//!
//! Everything goes through the `metrics` facade; installing a recorder
//! (exporter) is left to the embedding binary.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

pub const GATEWAY_REQUESTS: &str = "gateway.requests.total";
pub const GATEWAY_REJECTED: &str = "gateway.requests.rejected";
pub const GATEWAY_DATA_ERRORS: &str = "gateway.data_errors.total";
pub const GATEWAY_DISPATCH_DURATION: &str = "gateway.dispatch.duration_ms";
pub const SPACES_CREATED: &str = "spaces.created.total";
pub const FORM_SUBMISSIONS: &str = "form.submissions.total";
pub const FORM_FAILURES: &str = "form.submissions.failed";

/// Initialize metrics with descriptions
pub fn init_metrics() {
    // Gateway metrics
    describe_counter!(GATEWAY_REQUESTS, "Model gateway requests that reached dispatch");
    describe_counter!(
        GATEWAY_REJECTED,
        "Model gateway requests rejected before touching storage"
    );
    describe_counter!(GATEWAY_DATA_ERRORS, "Data-layer failures by error code");
    describe_histogram!(
        GATEWAY_DISPATCH_DURATION,
        "Model gateway dispatch duration in milliseconds"
    );

    // Space metrics
    describe_counter!(SPACES_CREATED, "Spaces created through the gateway");

    // Form metrics
    describe_counter!(FORM_SUBMISSIONS, "Space creation form submissions");
    describe_counter!(FORM_FAILURES, "Space creation form submissions that failed");
}

/// Record a counter metric
pub fn record_counter(name: &'static str, value: u64) {
    counter!(name).increment(value);
}

/// Record a histogram metric
pub fn record_histogram(name: &'static str, value: f64) {
    histogram!(name).record(value);
}

/// Records elapsed milliseconds into a histogram when stopped or dropped
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    /// Create a new timer
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Record now instead of at the end of the scope
    pub fn stop(self) {}
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        histogram!(self.name).record(duration.as_secs_f64() * 1000.0);
    }
}
