//! Session mount/unmount lifecycle.
//!
//! A [`Session`] wires one optional record store and any number of push
//! transports into a single projector task. Mounting starts everything;
//! the returned [`SessionHandle`] owns the polling timer and every
//! subscription, and releases all of them on [`SessionHandle::unmount`] or
//! on drop.
//!
//! All adapters feed one bounded queue. The projector task drains it in
//! arrival order, so there is exactly one writer to the snapshot and the
//! last event applied is the one the view shows, whichever channel it came
//! from.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::metrics::{ProjectorMetrics, PushMetrics};
use crate::poller::PollingAdapter;
use crate::push::PushAdapter;
use crate::source::SourcedEvent;
use session_view_core::projector::{Projector, StateProjector};
use session_view_core::render;
use session_view_core::{RecordStore, Snapshot, SubscriptionHandle, Transport};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// An unmounted session: its channels and configuration.
///
/// Build one with [`Session::builder`], then call [`Session::mount`].
pub struct Session {
    config: SessionConfig,
    record_store: Option<Arc<dyn RecordStore>>,
    transports: Vec<Arc<dyn Transport>>,
}

impl Session {
    /// Start building a session.
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// The session's configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start the projector, subscribe every transport and start polling.
    ///
    /// A transport that fails to subscribe is logged and skipped; the
    /// session runs on the channels that remain. The first poll happens
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if the configuration does not
    /// validate. Nothing is started in that case.
    #[tracing::instrument(
        name = "session_mount",
        skip(self),
        fields(
            transports = self.transports.len(),
            polling = self.record_store.is_some(),
        )
    )]
    pub async fn mount(self) -> Result<SessionHandle, SessionError> {
        self.config.validate()?;

        let (events_tx, events_rx) = mpsc::channel(self.config.event_buffer);
        let (snapshots_tx, snapshots_rx) = watch::channel(Snapshot::empty());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let projector = tokio::spawn(project(events_rx, snapshots_tx, shutdown_rx.clone()));

        let mut tasks = Vec::new();
        let mut subscriptions = Vec::new();

        for transport in &self.transports {
            let scope = transport.scope();
            match PushAdapter::attach(transport.as_ref()).await {
                Ok(adapter) => {
                    subscriptions.push(adapter.handle());
                    let task = tokio::spawn(adapter.run(events_tx.clone(), shutdown_rx.clone()));
                    tasks.push((format!("push:{scope}"), task));
                }
                Err(e) => {
                    tracing::warn!(%scope, error = %e, "Transport subscribe failed, continuing without it");
                }
            }
        }

        if let Some(store) = self.record_store {
            let poller = PollingAdapter::new(store, self.config.poll_interval);
            let task = tokio::spawn(poller.run(events_tx.clone(), shutdown_rx.clone()));
            tasks.push(("poll".to_string(), task));
        }

        // Adapters hold the only senders from here on.
        drop(events_tx);

        tracing::info!(
            tasks = tasks.len(),
            subscriptions = subscriptions.len(),
            "Session mounted"
        );

        Ok(SessionHandle {
            snapshots: snapshots_rx,
            shutdown: shutdown_tx,
            subscriptions,
            tasks,
            projector: Some(projector),
            shutdown_timeout: self.config.shutdown_timeout,
        })
    }
}

/// Builder for [`Session`].
#[derive(Default)]
pub struct SessionBuilder {
    config: SessionConfig,
    record_store: Option<Arc<dyn RecordStore>>,
    transports: Vec<Arc<dyn Transport>>,
}

impl SessionBuilder {
    /// Poll this record store for the latest order.
    #[must_use]
    pub fn record_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.record_store = Some(store);
        self
    }

    /// Subscribe to this transport on mount. May be called repeatedly.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transports.push(transport);
        self
    }

    /// Use a custom configuration.
    #[must_use]
    pub const fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Session {
        Session {
            config: self.config,
            record_store: self.record_store,
            transports: self.transports,
        }
    }
}

/// A mounted session.
///
/// Dropping the handle stops polling, cancels every subscription and
/// aborts the background tasks. Use [`SessionHandle::unmount`] to wait for
/// them to finish instead.
pub struct SessionHandle {
    snapshots: watch::Receiver<Snapshot>,
    shutdown: watch::Sender<bool>,
    subscriptions: Vec<SubscriptionHandle>,
    tasks: Vec<(String, JoinHandle<()>)>,
    projector: Option<JoinHandle<Snapshot>>,
    shutdown_timeout: std::time::Duration,
}

impl SessionHandle {
    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver notified on every snapshot change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Wait for the next snapshot change.
    ///
    /// Returns `None` once the projector has stopped.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.snapshots.changed().await.ok()?;
        Some(self.snapshots.borrow_and_update().clone())
    }

    /// Render the current snapshot as text.
    #[must_use]
    pub fn render(&self) -> String {
        render::render(&self.snapshots.borrow())
    }

    /// Number of transport subscriptions still attached.
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|handle| !handle.is_cancelled())
            .count()
    }

    /// Stop the session and wait for its tasks.
    ///
    /// Polling stops, every subscription is cancelled exactly once, and no
    /// further update reaches the snapshot. Tasks still running after the
    /// configured shutdown timeout are aborted.
    ///
    /// Returns the final snapshot.
    ///
    /// # Errors
    ///
    /// - [`SessionError::TaskFailed`] if a task panicked
    /// - [`SessionError::ShutdownTimeout`] if tasks had to be aborted
    #[tracing::instrument(name = "session_unmount", skip(self))]
    pub async fn unmount(mut self) -> Result<Snapshot, SessionError> {
        self.signal_shutdown();

        let deadline = Instant::now() + self.shutdown_timeout;
        let mut failures = Vec::new();
        let mut timed_out = 0;

        for (name, task) in &mut self.tasks {
            match tokio::time::timeout_at(deadline, &mut *task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => failures.push(format!("{name}: {e}")),
                Err(_) => {
                    task.abort();
                    timed_out += 1;
                }
            }
        }
        self.tasks.clear();

        let mut snapshot = self.snapshot();
        if let Some(mut projector) = self.projector.take() {
            match tokio::time::timeout_at(deadline, &mut projector).await {
                Ok(Ok(last)) => snapshot = last,
                Ok(Err(e)) => failures.push(format!("projector: {e}")),
                Err(_) => {
                    projector.abort();
                    timed_out += 1;
                }
            }
        }

        if !failures.is_empty() {
            tracing::error!(failures = ?failures, "Session tasks failed during unmount");
            return Err(SessionError::TaskFailed(failures.join("; ")));
        }
        if timed_out > 0 {
            tracing::warn!(timed_out, "Session unmount timed out, tasks aborted");
            return Err(SessionError::ShutdownTimeout(timed_out));
        }

        tracing::info!("Session unmounted");
        Ok(snapshot)
    }

    fn signal_shutdown(&self) {
        self.shutdown.send_replace(true);
        for handle in &self.subscriptions {
            if handle.cancel() {
                PushMetrics::record_cancelled(handle.scope());
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.signal_shutdown();
        for (_, task) in &self.tasks {
            task.abort();
        }
        if let Some(projector) = &self.projector {
            projector.abort();
        }
    }
}

/// The single writer to the snapshot.
///
/// Applies queued events in arrival order and publishes a new snapshot only
/// when one actually changed. Stops on shutdown, discarding anything still
/// queued, or once every adapter has gone away.
async fn project(
    mut events: mpsc::Receiver<SourcedEvent>,
    snapshots: watch::Sender<Snapshot>,
    mut shutdown: watch::Receiver<bool>,
) -> Snapshot {
    let mut projector = StateProjector::new();

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

            next = events.recv() => {
                let Some(SourcedEvent { source, event }) = next else {
                    break;
                };
                let kind = event.kind();
                if projector.apply(event) {
                    ProjectorMetrics::record_applied(kind);
                    snapshots.send_replace(projector.snapshot().clone());
                    tracing::debug!(
                        projector = projector.name(),
                        %source,
                        %kind,
                        "Snapshot updated"
                    );
                } else {
                    ProjectorMetrics::record_unchanged(kind);
                    tracing::trace!(%source, %kind, "Duplicate update ignored");
                }
            }
        }
    }

    tracing::debug!(projector = projector.name(), "Projector stopped");
    projector.into_snapshot()
}
