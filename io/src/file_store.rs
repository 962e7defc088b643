//! Record store over a directory of JSON order files.
//!
//! The ordering agent writes one file per finished order, named
//! `order_YYYYMMDD_HHMMSS.json`. Sorting by file name therefore lists
//! orders oldest first, which is what the poller's "last record wins" rule
//! relies on. Files without a `.json` extension are ignored.

use session_view_core::event::WireOrder;
use session_view_core::record_store::ListFuture;
use session_view_core::{OrderState, RecordStore, RecordStoreError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads orders from `*.json` files in one directory.
#[derive(Clone, Debug)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    /// Read orders from `dir`. The directory need not exist yet.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory being read.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn record_paths(&self) -> Result<Vec<PathBuf>, RecordStoreError> {
        let unavailable =
            |e: std::io::Error| RecordStoreError::Unavailable(format!("{}: {e}", self.dir.display()));

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // Nothing has been ordered yet.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(unavailable(e)),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    async fn read_record(path: &Path) -> Result<OrderState, RecordStoreError> {
        let record = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RecordStoreError::Read {
                record: record.clone(),
                reason: e.to_string(),
            })?;

        let wire: WireOrder =
            serde_json::from_slice(&bytes).map_err(|e| RecordStoreError::InvalidRecord {
                record,
                reason: e.to_string(),
            })?;

        Ok(wire.into_state())
    }
}

impl RecordStore for FileRecordStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn list(&self) -> ListFuture<'_> {
        Box::pin(async move {
            let paths = self.record_paths().await?;
            let mut orders = Vec::with_capacity(paths.len());
            for path in &paths {
                orders.push(Self::read_record(path).await?);
            }
            tracing::trace!(dir = %self.dir.display(), records = orders.len(), "Listed order files");
            Ok(orders)
        })
    }
}
