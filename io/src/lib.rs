//! # Session View IO
//!
//! Concrete collaborators for the session view:
//!
//! - [`FileRecordStore`]: a directory of timestamped JSON order files
//! - [`HttpRecordStore`]: a JSON list endpoint
//! - [`RoomChannel`]: the realtime room's data channel
//! - [`WindowChannel`]: cross-window text messages
//!
//! Both channels are in-process [`Transport`](session_view_core::Transport)s
//! built on the same listener registry. They differ only in scope and in
//! the payload form their publishers hand over.
//!
//! ## Example
//!
//! ```
//! use session_view_io::RoomChannel;
//!
//! let room = RoomChannel::new();
//! let delivered = room.publish_data(br#"{"type":"tutor_state","data":{"mode":"quiz"}}"#.to_vec(), None);
//! assert_eq!(delivered, 0); // nobody listening yet
//! ```

mod registry;

/// Directory-backed record store
pub mod file_store;

/// HTTP-backed record store
pub mod http_store;

pub mod room;

pub mod window;

pub use file_store::FileRecordStore;
pub use http_store::HttpRecordStore;
pub use room::RoomChannel;
pub use window::WindowChannel;
