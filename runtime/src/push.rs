//! Transport push adapter.
//!
//! Holds one [`Subscription`] and turns every inbound payload into an
//! update event via the codec. Payloads that do not decode are dropped
//! (logged at `debug` and counted), never propagated. The subscription is
//! cancelled when the adapter stops, and cancellation is idempotent, so a
//! session that also cancels through a [`SubscriptionHandle`] cannot detach
//! twice.

use crate::metrics::PushMetrics;
use crate::source::SourcedEvent;
use futures::StreamExt;
use session_view_core::codec;
use session_view_core::{
    Payload, Subscription, SubscriptionHandle, Transport, TransportError, TransportScope,
    UpdateEvent,
};
use tokio::sync::{mpsc, watch};

/// Decodes payloads from one transport subscription.
#[derive(Debug)]
pub struct PushAdapter {
    subscription: Subscription,
}

impl PushAdapter {
    /// Subscribe to `transport` and wrap the subscription.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`TransportError`] if subscribing fails.
    pub async fn attach(transport: &dyn Transport) -> Result<Self, TransportError> {
        let subscription = transport.subscribe().await?;
        tracing::debug!(scope = %subscription.scope(), "Push adapter attached");
        Ok(Self::new(subscription))
    }

    /// Wrap an existing subscription.
    #[must_use]
    pub const fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// Scope of the underlying transport.
    #[must_use]
    pub const fn scope(&self) -> TransportScope {
        self.subscription.scope()
    }

    /// Handle for cancelling the subscription from outside the adapter.
    #[must_use]
    pub fn handle(&self) -> SubscriptionHandle {
        self.subscription.handle()
    }

    /// Decode one payload, recording why it was dropped if it was.
    #[must_use]
    pub fn decode(scope: TransportScope, payload: &Payload) -> Option<UpdateEvent> {
        PushMetrics::record_received(scope);
        match codec::try_decode(payload.as_bytes()) {
            Ok(Some(event)) => Some(event),
            Ok(None) => {
                PushMetrics::record_ignored(scope);
                tracing::trace!(%scope, "Ignoring message with unrecognized type");
                None
            }
            Err(e) => {
                PushMetrics::record_rejected(scope);
                tracing::debug!(%scope, error = %e, bytes = payload.len(), "Dropping malformed payload");
                None
            }
        }
    }

    /// Forward decoded events to `sink` until shutdown or until the
    /// transport ends the stream, then cancel the subscription.
    pub async fn run(mut self, sink: mpsc::Sender<SourcedEvent>, mut shutdown: watch::Receiver<bool>) {
        let scope = self.scope();

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

                payload = self.subscription.next() => {
                    let Some(payload) = payload else {
                        tracing::debug!(%scope, "Transport stream ended");
                        break;
                    };
                    if let Some(event) = Self::decode(scope, &payload) {
                        if sink.send(SourcedEvent::push(scope, event)).await.is_err() {
                            tracing::debug!(%scope, "Projector closed, stopping push adapter");
                            break;
                        }
                    }
                }
            }
        }

        if self.subscription.cancel() {
            PushMetrics::record_cancelled(scope);
        }
        tracing::debug!(%scope, "Push adapter stopped");
    }
}
