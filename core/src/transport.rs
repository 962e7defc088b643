//! Push transport abstraction.
//!
//! A [`Transport`] is anything that can deliver raw payloads to the view:
//! the realtime room's data channel, or a cross-window message channel.
//! Both behave the same from the projector's side. Subscribe once, receive
//! payloads, cancel once. Only the attachment point differs, recorded as
//! the transport's [`TransportScope`].
//!
//! # Delivery
//!
//! - **At-least-once**: the same payload may arrive more than once.
//! - **Unordered** relative to other channels (in particular the poller).
//!
//! # Subscription lifecycle
//!
//! [`Transport::subscribe`] returns a [`Subscription`], which is a stream of
//! [`Payload`]s plus a cancel hook supplied by the transport. The hook
//! detaches the listener and is guaranteed to run **at most once**, whether
//! cancellation comes from [`Subscription::cancel`], from dropping the
//! subscription, or from a [`SubscriptionHandle`] held elsewhere. Double
//! unsubscription is therefore impossible by construction.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::StreamExt;
//!
//! let mut subscription = transport.subscribe().await?;
//! let handle = subscription.handle();
//!
//! while let Some(payload) = subscription.next().await {
//!     if let Some(event) = codec::decode(payload.as_bytes()) {
//!         projector.apply(event);
//!     }
//! }
//!
//! handle.cancel(); // no-op if the subscription was already dropped
//! ```

use futures::Stream;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use thiserror::Error;

/// Which kind of channel a transport attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportScope {
    /// Cross-window message channel.
    Window,
    /// Realtime room data channel.
    Room,
}

impl TransportScope {
    /// Lowercase name used as a metrics label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::Room => "room",
        }
    }
}

impl fmt::Display for TransportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw inbound payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Byte buffer (room data packets).
    Binary(Vec<u8>),
    /// Serialized string (window messages).
    Text(String),
}

impl Payload {
    /// The payload's bytes, whichever form it arrived in.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Binary(bytes) => bytes,
            Self::Text(text) => text.as_bytes(),
        }
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// True for a zero-length payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Errors from transport operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Transport is closed and accepts no new listeners.
    #[error("Transport '{0}' is closed")]
    Closed(TransportScope),

    /// Subscribing failed.
    #[error("Subscription to '{scope}' failed: {reason}")]
    SubscriptionFailed {
        /// Which transport
        scope: TransportScope,
        /// Why
        reason: String,
    },
}

/// Stream of raw payloads backing a [`Subscription`].
pub type PayloadStream = Pin<Box<dyn Stream<Item = Payload> + Send>>;

/// Boxed future returned by [`Transport::subscribe`].
pub type SubscribeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Subscription, TransportError>> + Send + 'a>>;

/// A pub/sub channel that pushes payloads to the view.
///
/// Dyn-compatible so sessions can hold `Arc<dyn Transport>`.
pub trait Transport: Send + Sync {
    /// Which channel this transport attaches to.
    fn scope(&self) -> TransportScope;

    /// Attach a new listener.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the transport cannot accept listeners.
    fn subscribe(&self) -> SubscribeFuture<'_>;
}

type Hook = Box<dyn FnOnce() + Send>;

struct CancelHook {
    cancelled: AtomicBool,
    hook: Mutex<Option<Hook>>,
}

impl CancelHook {
    fn new(hook: Hook) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            hook: Mutex::new(Some(hook)),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Runs the hook on the first call only. Returns whether this call ran it.
    fn fire(&self) -> bool {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return false;
        }
        let hook = self
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(hook) = hook {
            hook();
        }
        true
    }
}

/// A live attachment to a [`Transport`].
///
/// Yields payloads until cancelled or until the transport closes. Dropping
/// the subscription cancels it.
pub struct Subscription {
    scope: TransportScope,
    payloads: PayloadStream,
    hook: Arc<CancelHook>,
}

impl Subscription {
    /// Build a subscription from a payload stream and a detach hook.
    ///
    /// `on_cancel` runs at most once, on the first cancellation.
    #[must_use]
    pub fn new<F>(scope: TransportScope, payloads: PayloadStream, on_cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            scope,
            payloads,
            hook: Arc::new(CancelHook::new(Box::new(on_cancel))),
        }
    }

    /// The transport scope this subscription belongs to.
    #[must_use]
    pub const fn scope(&self) -> TransportScope {
        self.scope
    }

    /// A cloneable handle that can cancel this subscription from elsewhere.
    #[must_use]
    pub fn handle(&self) -> SubscriptionHandle {
        SubscriptionHandle {
            scope: self.scope,
            hook: Arc::clone(&self.hook),
        }
    }

    /// Detach from the transport.
    ///
    /// Returns `true` if this call performed the detach, `false` if the
    /// subscription was already cancelled.
    pub fn cancel(&self) -> bool {
        self.hook.fire()
    }

    /// Whether the subscription has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.hook.is_cancelled()
    }
}

impl Stream for Subscription {
    type Item = Payload;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Payload>> {
        if self.hook.is_cancelled() {
            return Poll::Ready(None);
        }
        self.payloads.as_mut().poll_next(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hook.fire();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("scope", &self.scope)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Remote control for a [`Subscription`].
#[derive(Clone)]
pub struct SubscriptionHandle {
    scope: TransportScope,
    hook: Arc<CancelHook>,
}

impl SubscriptionHandle {
    /// The transport scope of the subscription.
    #[must_use]
    pub const fn scope(&self) -> TransportScope {
        self.scope
    }

    /// Cancel the subscription. Returns `true` if this call detached it.
    pub fn cancel(&self) -> bool {
        self.hook.fire()
    }

    /// Whether the subscription has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.hook.is_cancelled()
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("scope", &self.scope)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
