//! Record store polling adapter.
//!
//! On mount and then every `poll_interval`, the adapter lists the record
//! store and forwards the **last** record as an order update. Polling is
//! fail-soft: a store error or an empty list forwards nothing and is never
//! surfaced to the view. "No data" and "not ordered yet" look the same.

use crate::metrics::PollMetrics;
use crate::source::SourcedEvent;
use session_view_core::{RecordStore, UpdateEvent};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

/// Pulls the latest order from a [`RecordStore`] on a fixed cadence.
pub struct PollingAdapter {
    store: Arc<dyn RecordStore>,
    interval: Duration,
}

impl PollingAdapter {
    /// Create an adapter polling `store` every `interval`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// The polling interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch once and return the latest order, if any.
    ///
    /// Store errors are logged and treated as an empty result.
    pub async fn poll_once(&self) -> Option<UpdateEvent> {
        let started = Instant::now();
        let result = self.store.list().await;
        PollMetrics::record_poll(started.elapsed());

        match result {
            Ok(mut records) => {
                let count = records.len();
                let latest = records.pop();
                if latest.is_none() {
                    PollMetrics::record_empty();
                    tracing::trace!(store = self.store.name(), "Record store is empty");
                } else {
                    tracing::trace!(store = self.store.name(), records = count, "Polled record store");
                }
                latest.map(UpdateEvent::Order)
            }
            Err(e) => {
                PollMetrics::record_failure();
                tracing::warn!(
                    store = self.store.name(),
                    error = %e,
                    "Record store read failed, treating as empty"
                );
                None
            }
        }
    }

    /// Poll until shutdown, forwarding each latest order to `sink`.
    ///
    /// The first poll runs immediately. Missed ticks are delayed, not
    /// bursted. Returns when `shutdown` turns `true`, when its sender is
    /// dropped, or when the projector side of `sink` has gone away.
    pub async fn run(self, sink: mpsc::Sender<SourcedEvent>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(
            store = self.store.name(),
            interval_ms = self.interval.as_millis(),
            "Polling adapter started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }

                _ = ticker.tick() => {
                    // A slow store must not hold up teardown.
                    let event = tokio::select! {
                        biased;
                        _ = shutdown.changed() => break,
                        event = self.poll_once() => event,
                    };
                    if let Some(event) = event {
                        if sink.send(SourcedEvent::poll(event)).await.is_err() {
                            tracing::debug!("Projector closed, stopping poller");
                            break;
                        }
                    }
                }
            }
        }

        tracing::debug!(store = self.store.name(), "Polling adapter stopped");
    }
}
