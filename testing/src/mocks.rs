//! In-memory collaborators for session tests
//!
//! - [`InMemoryRecordStore`]: a shared `Vec` of orders
//! - [`FailingRecordStore`]: always errors
//! - [`MockTransport`]: a push channel that counts its listeners

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use session_view_core::record_store::ListFuture;
use session_view_core::transport::SubscribeFuture;
use session_view_core::{
    OrderState, Payload, RecordStore, RecordStoreError, Subscription, Transport, TransportError,
    TransportScope,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;

/// In-memory record store for fast, deterministic tests.
///
/// Clones share the same records, so a test can keep one clone and append
/// while a session polls the other. Every `list` call is counted.
///
/// # Example
///
/// ```
/// use session_view_testing::InMemoryRecordStore;
/// use session_view_testing::fixtures::order_named;
/// use session_view_core::RecordStore;
///
/// # tokio_test::block_on(async {
/// let store = InMemoryRecordStore::new();
/// store.push(order_named("A"));
/// store.push(order_named("B"));
///
/// let orders = store.list().await.unwrap();
/// assert_eq!(orders.last().map(|o| o.name.as_str()), Some("B"));
/// assert_eq!(store.list_calls(), 1);
/// # });
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Vec<OrderState>>>,
    list_calls: Arc<AtomicUsize>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`, oldest first.
    #[must_use]
    pub fn with_records(records: Vec<OrderState>) -> Self {
        let store = Self::new();
        *store.records.write().unwrap() = records;
        store
    }

    /// Append a record.
    pub fn push(&self, order: OrderState) {
        self.records.write().unwrap().push(order);
    }

    /// Remove every record.
    pub fn clear(&self) {
        self.records.write().unwrap().clear();
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }

    /// How many times `list` has been called.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl RecordStore for InMemoryRecordStore {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    fn list(&self) -> ListFuture<'_> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let records = self.records.read().unwrap().clone();
        Box::pin(async move { Ok(records) })
    }
}

/// A record store whose every read fails.
#[derive(Clone, Debug, Default)]
pub struct FailingRecordStore {
    list_calls: Arc<AtomicUsize>,
}

impl FailingRecordStore {
    /// Create a failing store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many reads have been attempted.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl RecordStore for FailingRecordStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn list(&self) -> ListFuture<'_> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async {
            Err(RecordStoreError::Unavailable(
                "simulated store outage".to_string(),
            ))
        })
    }
}

#[derive(Default)]
struct MockState {
    listeners: Vec<mpsc::UnboundedSender<Payload>>,
    subscribes: usize,
    cancels: usize,
}

/// Push transport that records its listener lifecycle.
///
/// Use [`MockTransport::send`] to push a payload to every listener, and
/// the counters to check that each subscribe was matched by exactly one
/// cancel.
#[derive(Clone)]
pub struct MockTransport {
    scope: TransportScope,
    state: Arc<Mutex<MockState>>,
    fail_subscribe: bool,
}

impl MockTransport {
    /// A working transport of the given scope.
    #[must_use]
    pub fn new(scope: TransportScope) -> Self {
        Self {
            scope,
            state: Arc::new(Mutex::new(MockState::default())),
            fail_subscribe: false,
        }
    }

    /// A transport whose `subscribe` always fails.
    #[must_use]
    pub fn failing(scope: TransportScope) -> Self {
        Self {
            fail_subscribe: true,
            ..Self::new(scope)
        }
    }

    /// Push a payload to every live listener. Returns how many received it.
    pub fn send(&self, payload: impl Into<Payload>) -> usize {
        let payload = payload.into();
        let mut state = self.state.lock().unwrap();
        state
            .listeners
            .retain(|listener| listener.send(payload.clone()).is_ok());
        state.listeners.len()
    }

    /// Total `subscribe` calls that succeeded.
    #[must_use]
    pub fn subscribe_count(&self) -> usize {
        self.state.lock().unwrap().subscribes
    }

    /// Total cancel hooks that ran.
    #[must_use]
    pub fn cancel_count(&self) -> usize {
        self.state.lock().unwrap().cancels
    }

    /// Subscriptions not yet cancelled.
    #[must_use]
    pub fn active_listeners(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.subscribes - state.cancels
    }
}

impl Transport for MockTransport {
    fn scope(&self) -> TransportScope {
        self.scope
    }

    fn subscribe(&self) -> SubscribeFuture<'_> {
        let scope = self.scope;
        if self.fail_subscribe {
            return Box::pin(async move {
                Err(TransportError::SubscriptionFailed {
                    scope,
                    reason: "simulated subscribe failure".to_string(),
                })
            });
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let mut state = self.state.lock().unwrap();
            state.listeners.push(tx);
            state.subscribes += 1;
        }

        let payloads = async_stream::stream! {
            while let Some(payload) = rx.recv().await {
                yield payload;
            }
        };

        let state = Arc::clone(&self.state);
        let subscription = Subscription::new(scope, Box::pin(payloads), move || {
            state.lock().unwrap().cancels += 1;
        });
        Box::pin(async move { Ok(subscription) })
    }
}
