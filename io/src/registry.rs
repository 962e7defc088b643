//! Listener registry shared by the in-process transports.

use session_view_core::{Payload, Subscription, TransportError, TransportScope};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    senders: HashMap<u64, mpsc::UnboundedSender<Payload>>,
    closed: bool,
}

/// Fan-out of payloads to every attached listener.
///
/// Each subscription owns one unbounded queue. Cancelling the subscription
/// removes its queue; closing the registry removes all of them and ends
/// every payload stream.
#[derive(Clone, Default)]
pub(crate) struct ListenerRegistry {
    listeners: Arc<Mutex<Listeners>>,
}

impl ListenerRegistry {
    fn lock(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a listener.
    pub(crate) fn subscribe(&self, scope: TransportScope) -> Result<Subscription, TransportError> {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let id = {
            let mut listeners = self.lock();
            if listeners.closed {
                return Err(TransportError::Closed(scope));
            }
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.senders.insert(id, tx);
            id
        };

        let payloads = async_stream::stream! {
            while let Some(payload) = rx.recv().await {
                yield payload;
            }
        };

        let registry = self.clone();
        tracing::trace!(%scope, listener = id, "Listener attached");
        Ok(Subscription::new(scope, Box::pin(payloads), move || {
            registry.remove(id);
            tracing::trace!(%scope, listener = id, "Listener detached");
        }))
    }

    /// Deliver `payload` to every listener. Returns how many received it.
    pub(crate) fn broadcast(&self, payload: &Payload) -> usize {
        let mut listeners = self.lock();
        listeners
            .senders
            .retain(|_, sender| sender.send(payload.clone()).is_ok());
        listeners.senders.len()
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.lock().senders.len()
    }

    /// Reject new listeners and end every open stream.
    pub(crate) fn close(&self) {
        let mut listeners = self.lock();
        listeners.closed = true;
        listeners.senders.clear();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn remove(&self, id: u64) {
        self.lock().senders.remove(&id);
    }
}
