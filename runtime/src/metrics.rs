//! Prometheus metrics for the session view.
//!
//! Counters cover the three places updates can be dropped or applied:
//! - Projector applications (per state kind)
//! - Record store polls (failures and empty results)
//! - Push payloads (rejected by the codec, per transport scope)
//!
//! Recording is always on; it is a no-op until a recorder is installed.
//!
//! # Example
//!
//! ```rust,no_run
//! use session_view_runtime::metrics::MetricsExporter;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut exporter = MetricsExporter::new();
//! exporter.install()?;
//!
//! // ... run sessions ...
//!
//! if let Some(text) = exporter.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use session_view_core::{StateKind, TransportScope};
use std::time::Duration;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus recorder for session metrics.
#[derive(Default)]
pub struct MetricsExporter {
    handle: Option<PrometheusHandle>,
}

impl MetricsExporter {
    /// Create an exporter that has not been installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] if the exporter cannot be built or installed.
    /// An already-installed global recorder is tolerated with a warning.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Render current metrics in Prometheus exposition format.
    ///
    /// Returns `None` if this exporter did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

fn register_metrics() {
    // Projector
    describe_counter!(
        "session_view_events_applied_total",
        "Update events that changed the snapshot, by state kind"
    );
    describe_counter!(
        "session_view_events_unchanged_total",
        "Update events identical to the current snapshot slot"
    );

    // Polling
    describe_counter!(
        "session_view_polls_total",
        "Record store polls performed"
    );
    describe_counter!(
        "session_view_poll_failures_total",
        "Record store polls that failed and were treated as empty"
    );
    describe_counter!(
        "session_view_poll_empty_total",
        "Record store polls that returned no records"
    );
    describe_histogram!(
        "session_view_poll_duration_seconds",
        "Record store list latency"
    );

    // Push
    describe_counter!(
        "session_view_payloads_received_total",
        "Raw payloads received from push transports, by scope"
    );
    describe_counter!(
        "session_view_payloads_rejected_total",
        "Payloads the codec could not decode, by scope"
    );
    describe_counter!(
        "session_view_payloads_ignored_total",
        "Well-formed payloads with an unrecognized type, by scope"
    );
    describe_counter!(
        "session_view_subscriptions_cancelled_total",
        "Transport subscriptions detached, by scope"
    );
}

/// Projector metrics recorder.
pub struct ProjectorMetrics;

impl ProjectorMetrics {
    /// Record an event that changed the snapshot.
    pub fn record_applied(kind: StateKind) {
        counter!("session_view_events_applied_total", "kind" => kind.as_str()).increment(1);
    }

    /// Record an event that left the snapshot as it was.
    pub fn record_unchanged(kind: StateKind) {
        counter!("session_view_events_unchanged_total", "kind" => kind.as_str()).increment(1);
    }
}

/// Polling metrics recorder.
pub struct PollMetrics;

impl PollMetrics {
    /// Record a completed poll.
    pub fn record_poll(duration: Duration) {
        counter!("session_view_polls_total").increment(1);
        histogram!("session_view_poll_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a failed poll.
    pub fn record_failure() {
        counter!("session_view_poll_failures_total").increment(1);
    }

    /// Record a poll with no records.
    pub fn record_empty() {
        counter!("session_view_poll_empty_total").increment(1);
    }
}

/// Push metrics recorder.
pub struct PushMetrics;

impl PushMetrics {
    /// Record a received payload.
    pub fn record_received(scope: TransportScope) {
        counter!("session_view_payloads_received_total", "scope" => scope.as_str()).increment(1);
    }

    /// Record a payload the codec rejected.
    pub fn record_rejected(scope: TransportScope) {
        counter!("session_view_payloads_rejected_total", "scope" => scope.as_str()).increment(1);
    }

    /// Record a payload with an unknown message type.
    pub fn record_ignored(scope: TransportScope) {
        counter!("session_view_payloads_ignored_total", "scope" => scope.as_str()).increment(1);
    }

    /// Record a subscription detach.
    pub fn record_cancelled(scope: TransportScope) {
        counter!("session_view_subscriptions_cancelled_total", "scope" => scope.as_str()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninstalled_exporter_renders_nothing() {
        let exporter = MetricsExporter::new();
        assert!(exporter.render().is_none());
    }

    #[test]
    fn test_recording_without_recorder_is_a_no_op() {
        ProjectorMetrics::record_applied(StateKind::Order);
        PollMetrics::record_poll(Duration::from_millis(3));
        PushMetrics::record_rejected(TransportScope::Window);
    }
}
