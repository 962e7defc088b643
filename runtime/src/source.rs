use session_view_core::{TransportScope, UpdateEvent};
use std::fmt;

/// The channel an update arrived on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// Record store poll.
    Poll,
    /// Push transport of the given scope.
    Push(TransportScope),
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poll => f.write_str("poll"),
            Self::Push(scope) => write!(f, "push:{scope}"),
        }
    }
}

/// An update event tagged with its source, as queued for the projector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourcedEvent {
    /// Channel the event came from
    pub source: EventSource,
    /// The decoded event
    pub event: UpdateEvent,
}

impl SourcedEvent {
    /// Event from a record store poll.
    #[must_use]
    pub const fn poll(event: UpdateEvent) -> Self {
        Self {
            source: EventSource::Poll,
            event,
        }
    }

    /// Event from a push transport.
    #[must_use]
    pub const fn push(scope: TransportScope, event: UpdateEvent) -> Self {
        Self {
            source: EventSource::Push(scope),
            event,
        }
    }
}
