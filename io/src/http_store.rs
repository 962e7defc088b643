//! Record store over an HTTP list endpoint.
//!
//! The endpoint returns a JSON array of order objects, oldest first.

use session_view_core::event::WireOrder;
use session_view_core::record_store::ListFuture;
use session_view_core::{RecordStore, RecordStoreError};
use std::time::Duration;

/// Request timeout of the client built by [`HttpRecordStore::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Lists orders with a `GET` to a JSON endpoint such as `/api/orders`.
#[derive(Clone, Debug)]
pub struct HttpRecordStore {
    client: reqwest::Client,
    url: String,
}

impl HttpRecordStore {
    /// Poll `url` with a client that gives up after
    /// [`DEFAULT_REQUEST_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::Unavailable`] if the HTTP client cannot
    /// be built.
    pub fn new(url: impl Into<String>) -> Result<Self, RecordStoreError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RecordStoreError::Unavailable(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, url))
    }

    /// Poll `url` with a preconfigured client (timeouts, headers).
    #[must_use]
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// The endpoint being polled.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RecordStore for HttpRecordStore {
    fn name(&self) -> &'static str {
        "http"
    }

    fn list(&self) -> ListFuture<'_> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| RecordStoreError::Unavailable(format!("{}: {e}", self.url)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(RecordStoreError::Unavailable(format!(
                    "{} returned {status}",
                    self.url
                )));
            }

            let body = response.bytes().await.map_err(|e| RecordStoreError::Read {
                record: self.url.clone(),
                reason: e.to_string(),
            })?;

            let records: Vec<WireOrder> =
                serde_json::from_slice(&body).map_err(|e| RecordStoreError::InvalidRecord {
                    record: self.url.clone(),
                    reason: e.to_string(),
                })?;

            tracing::trace!(url = %self.url, records = records.len(), "Listed orders over HTTP");
            Ok(records.into_iter().map(WireOrder::into_state).collect())
        })
    }
}
