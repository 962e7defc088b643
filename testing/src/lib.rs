//! # Session View Testing
//!
//! Testing utilities for the live session order view.
//!
//! This crate provides:
//! - In-memory and failing [`RecordStore`](session_view_core::RecordStore)s
//! - A [`MockTransport`] that counts subscribes and cancels
//! - Order and tutor fixtures plus their wire messages
//! - A given/when/then harness for projectors
//! - proptest strategies for model types
//!
//! ## Example
//!
//! ```
//! use session_view_testing::{fixtures, ProjectorTest};
//! use session_view_core::StateProjector;
//!
//! ProjectorTest::new(StateProjector::new())
//!     .when(fixtures::tutor("explain", "").into())
//!     .when(fixtures::tutor("quiz", "").into())
//!     .then_view(|snapshot| {
//!         assert_eq!(snapshot.tutor.as_ref().map(|t| t.mode.as_str()), Some("quiz"));
//!     })
//!     .run();
//! ```

pub mod fixtures;
pub mod mocks;
pub mod properties;

pub use mocks::{FailingRecordStore, InMemoryRecordStore, MockTransport};
pub use projector_test::ProjectorTest;

/// Install a `tracing` subscriber that writes to the test harness output.
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
