//! Realtime room data channel.

use crate::registry::ListenerRegistry;
use session_view_core::transport::SubscribeFuture;
use session_view_core::{Payload, Transport, TransportScope};

/// In-process stand-in for a realtime room's data channel.
///
/// Publishers send raw byte packets, optionally tagged with the sending
/// participant's identity. Every subscribed view receives each packet.
/// Clones share the same room.
#[derive(Clone, Default)]
pub struct RoomChannel {
    registry: ListenerRegistry,
}

impl RoomChannel {
    /// Create an empty room.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a data packet to every listener.
    ///
    /// Returns the number of listeners the packet was delivered to.
    pub fn publish_data(&self, data: impl Into<Vec<u8>>, participant: Option<&str>) -> usize {
        let payload = Payload::Binary(data.into());
        let delivered = self.registry.broadcast(&payload);
        tracing::trace!(
            participant = participant.unwrap_or("unknown"),
            bytes = payload.len(),
            delivered,
            "Room data published"
        );
        delivered
    }

    /// Number of attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.listener_count()
    }

    /// Disconnect the room: end every subscription and refuse new ones.
    pub fn close(&self) {
        self.registry.close();
        tracing::debug!("Room closed");
    }

    /// Whether the room has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.registry.is_closed()
    }
}

impl Transport for RoomChannel {
    fn scope(&self) -> TransportScope {
        TransportScope::Room
    }

    fn subscribe(&self) -> SubscribeFuture<'_> {
        let subscription = self.registry.subscribe(TransportScope::Room);
        Box::pin(async move { subscription })
    }
}
