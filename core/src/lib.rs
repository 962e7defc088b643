//! # Session View Core
//!
//! Core types for the live session order view.
//!
//! A conversational agent takes a drink order (and a tutor agent reports its
//! learning mode) while the customer watches a small panel. The panel's
//! state arrives over two independent, unreliable channels:
//!
//! - **Polling** a record store of persisted orders, and
//! - **Push** messages over a realtime transport (room data channel or
//!   cross-window messages).
//!
//! This crate holds everything that does not depend on a runtime:
//!
//! - [`state`]: `OrderState`, `TutorState`, `Snapshot`
//! - [`event`]: `UpdateEvent` and the wire envelope
//! - [`codec`]: fail-open payload decoding
//! - [`projector`]: last-write-wins projection into a `Snapshot`
//! - [`record_store`]: read-only record store seam (polling channel)
//! - [`transport`]: pub/sub transport seam and `Subscription` (push channel)
//! - [`render`]: text panels for a `Snapshot`
//!
//! ## Architecture Principles
//!
//! - Fail-open decoding: transport noise never reaches the view as an error
//! - Single serialization point: only the projector mutates the snapshot
//! - Transport-agnostic: push adapters depend on the [`transport::Transport`]
//!   trait, not on a concrete channel
//!
//! ## Example
//!
//! ```
//! use session_view_core::{codec, render};
//! use session_view_core::projector::{Projector, StateProjector};
//!
//! let mut projector = StateProjector::new();
//! let payload = br#"{"type":"order_state","data":{"drinkType":"latte","name":"Ana"}}"#;
//!
//! if let Some(event) = codec::decode(payload) {
//!     projector.apply(event);
//! }
//!
//! let panel = render::render(projector.snapshot());
//! assert!(panel.contains("latte"));
//! ```

pub mod codec;
pub mod event;
pub mod projector;
pub mod record_store;
pub mod render;
pub mod state;
pub mod transport;

pub use event::{MessageType, UpdateEvent};
pub use projector::{Projector, StateProjector};
pub use record_store::{RecordStore, RecordStoreError};
pub use state::{OrderState, Snapshot, StateKind, TutorState};
pub use transport::{Payload, Subscription, SubscriptionHandle, Transport, TransportError, TransportScope};
