//! Dataset record contract.
//!
//! The pipeline consumes uploaded datasets through a narrow record
//! interface: load a record by id, persist status updates. Backends (a web
//! application's database, the CLI's in-memory store) implement
//! [`RecordStore`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::pipeline::state::ChainState;

/// Opaque dataset identifier.
pub type RecordId = i64;

/// Persistent state of one uploaded dataset.
///
/// `ready = true` means "no longer processing"; callers distinguish success
/// from failure by checking `error_message`. The pipeline never mutates
/// `source_path` or the file it points to; `result_path` is the only file
/// location it writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: RecordId,
    pub source_path: PathBuf,
    pub target_column: Option<String>,
    pub ignored_columns: Vec<String>,
    pub ready: bool,
    pub error_message: Option<String>,
    pub result_path: Option<PathBuf>,
    /// Before/after report written alongside the result, when available.
    pub report_path: Option<PathBuf>,
    pub status: ChainState,
}

impl DatasetRecord {
    /// A freshly registered record, not yet processed.
    pub fn new(id: RecordId, source_path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            source_path: source_path.into(),
            target_column: None,
            ignored_columns: Vec::new(),
            ready: false,
            error_message: None,
            result_path: None,
            report_path: None,
            status: ChainState::Pending,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_column = Some(target.into());
        self
    }

    pub fn with_ignored_columns(mut self, columns: Vec<String>) -> Self {
        self.ignored_columns = columns;
        self
    }

    /// Whether processing finished without error.
    pub fn succeeded(&self) -> bool {
        self.ready && self.error_message.is_none()
    }
}

/// Persistence seam between the pipeline and the hosting application.
pub trait RecordStore: Send + Sync {
    /// Load a record by id. Fails with [`PrepError::RecordNotFound`] if the
    /// id is unknown.
    fn get(&self, id: RecordId) -> Result<DatasetRecord>;

    /// Persist the record, replacing the stored version.
    fn save(&self, record: &DatasetRecord) -> Result<()>;
}

/// Simple in-memory store backing the CLI and tests.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Mutex<HashMap<RecordId, DatasetRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub fn insert(&self, record: DatasetRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.id, record);
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get(&self, id: RecordId) -> Result<DatasetRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
            .ok_or(PrepError::RecordNotFound(id))
    }

    fn save(&self, record: &DatasetRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.id, record.clone());
        Ok(())
    }
}
