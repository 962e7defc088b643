//! Record store abstraction for the polling channel.
//!
//! The record store is where the ordering agent persists finished orders.
//! The view only ever reads it: [`RecordStore::list`] returns every record
//! in insertion order, and the poller treats the last one as the current
//! order.
//!
//! # Ordering
//!
//! "Last element = most recent" only holds if the backend lists records in
//! a stable insertion order. Implementations must document how they achieve
//! that (e.g. sorting timestamped file names).
//!
//! # Implementations
//!
//! - `FileRecordStore` / `HttpRecordStore` in `session-view-io`
//! - `InMemoryRecordStore` in `session-view-testing`

use crate::state::OrderState;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors reading the record store.
///
/// The poller never surfaces these to the view; they are logged and the
/// tick is treated as "no records yet".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordStoreError {
    /// Store location could not be read.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// A record could not be read.
    #[error("Failed to read record '{record}': {reason}")]
    Read {
        /// Which record (file name, URL, key)
        record: String,
        /// Underlying cause
        reason: String,
    },

    /// A record was read but is not a valid order.
    #[error("Invalid record '{record}': {reason}")]
    InvalidRecord {
        /// Which record
        record: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Boxed future returned by [`RecordStore::list`].
pub type ListFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<OrderState>, RecordStoreError>> + Send + 'a>>;

/// Read-only access to persisted order records.
///
/// Uses an explicit boxed future instead of `async fn` so the trait can be
/// used as `Arc<dyn RecordStore>`.
pub trait RecordStore: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// List every persisted order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError`] if the store or one of its records
    /// cannot be read.
    fn list(&self) -> ListFuture<'_>;
}
