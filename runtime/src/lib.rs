//! # Session View Runtime
//!
//! Runs the live session view: channel adapters feed update events into a
//! single projector task, which publishes snapshots to renderers.
//!
//! ## Core Components
//!
//! - **`PollingAdapter`**: pulls the record store on a fixed interval and
//!   forwards the latest order
//! - **`PushAdapter`**: decodes payloads from a transport subscription
//! - **`Session`** / **`SessionHandle`**: mount and unmount the whole cycle,
//!   owning the timer and every subscription
//!
//! ```text
//! RecordStore ──► PollingAdapter ──┐
//!                                  ├──► mpsc ──► projector task ──► watch<Snapshot>
//! Transport ────► PushAdapter ─────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use session_view_runtime::{Session, SessionConfig};
//!
//! let handle = Session::builder()
//!     .record_store(Arc::new(FileRecordStore::new("backend/orders")))
//!     .transport(Arc::new(room.clone()))
//!     .config(SessionConfig::default())
//!     .build()
//!     .mount()
//!     .await?;
//!
//! let mut updates = handle.watch();
//! while updates.changed().await.is_ok() {
//!     println!("{}", session_view_core::render::render(&updates.borrow()));
//! }
//! ```

/// Session configuration
pub mod config;

/// Prometheus metrics for observability
pub mod metrics;

/// Record store polling adapter
pub mod poller;

/// Transport push adapter
pub mod push;

/// Session mount/unmount lifecycle
pub mod session;

/// Where an update event came from
pub mod source;

/// Error types for the session runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur while mounting or unmounting a session
    ///
    /// Channel failures (bad payloads, unreadable store, failed subscribe)
    /// are not errors at this level; they are logged and the session keeps
    /// running on whatever channels remain.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum SessionError {
        /// Configuration rejected at mount
        #[error("Invalid session configuration: {0}")]
        InvalidConfig(String),

        /// An adapter or projector task panicked
        #[error("Session task failed: {0}")]
        TaskFailed(String),

        /// Unmount timed out waiting for tasks to finish
        ///
        /// The remaining tasks are aborted.
        #[error("Unmount timed out with {0} tasks still running")]
        ShutdownTimeout(usize),
    }
}

pub use config::SessionConfig;
pub use error::SessionError;
pub use poller::PollingAdapter;
pub use push::PushAdapter;
pub use session::{Session, SessionBuilder, SessionHandle};
pub use source::{EventSource, SourcedEvent};
