//! Cross-window message channel.

use crate::registry::ListenerRegistry;
use session_view_core::transport::SubscribeFuture;
use session_view_core::{Payload, Transport, TransportScope};

/// In-process stand-in for cross-window messaging.
///
/// Other parts of the page post serialized JSON strings; each subscribed
/// view receives them as text payloads. Clones share the same channel.
#[derive(Clone, Default)]
pub struct WindowChannel {
    registry: ListenerRegistry,
}

impl WindowChannel {
    /// Create a channel with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a message to every listener. Returns how many received it.
    pub fn post_message(&self, message: impl Into<String>) -> usize {
        self.registry.broadcast(&Payload::Text(message.into()))
    }

    /// Number of attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.listener_count()
    }

    /// Close the channel, ending every subscription.
    pub fn close(&self) {
        self.registry.close();
    }
}

impl Transport for WindowChannel {
    fn scope(&self) -> TransportScope {
        TransportScope::Window
    }

    fn subscribe(&self) -> SubscribeFuture<'_> {
        let subscription = self.registry.subscribe(TransportScope::Window);
        Box::pin(async move { subscription })
    }
}
