use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

use super::client::SheetStore;
use super::error::{SheetsError, SheetsResult};
use super::model::{RawRow, RowUpdate};

/// A write the mock accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
    pub address: String,
    pub update: RowUpdate,
    pub values: Vec<Value>,
}

/// In-memory [`SheetStore`] with scripted failures.
#[derive(Default)]
pub struct MockSheetStore {
    rows: Vec<RawRow>,
    read_failure: Option<String>,
    rejected_addresses: HashSet<String>,
    reads: AtomicUsize,
    writes: Mutex<Vec<RecordedWrite>>,
    attempted_writes: AtomicUsize,
}

impl MockSheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `rows` from every read. An empty vector reproduces an empty sheet.
    pub fn with_rows(rows: Vec<RawRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Convenience for tests: builds raw rows from string slices (`""` → blank cell).
    pub fn with_str_rows(rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|c| {
                        if c.is_empty() {
                            None
                        } else {
                            Some((*c).to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Self::with_rows(rows)
    }

    /// Makes every read fail with `SourceUnavailable`.
    pub fn failing_reads(mut self, message: &str) -> Self {
        self.read_failure = Some(message.to_string());
        self
    }

    /// Makes writes to `address` fail with `WriteRejected`.
    pub fn rejecting_writes_to(mut self, address: &str) -> Self {
        self.rejected_addresses.insert(address.to_string());
        self
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn attempted_write_count(&self) -> usize {
        self.attempted_writes.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// The accepted write for `address`, if any.
    pub fn write_to(&self, address: &str) -> Option<RecordedWrite> {
        self.writes().into_iter().find(|w| w.address == address)
    }
}

impl SheetStore for MockSheetStore {
    async fn read_rows(&self, range: &str) -> SheetsResult<Vec<RawRow>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.read_failure {
            return Err(SheetsError::SourceUnavailable {
                range: range.to_string(),
                message: message.clone(),
            });
        }
        if self.rows.is_empty() {
            return Err(SheetsError::EmptyDataset {
                range: range.to_string(),
            });
        }
        Ok(self.rows.clone())
    }

    async fn write_row(&self, address: &str, update: &RowUpdate) -> SheetsResult<()> {
        self.attempted_writes.fetch_add(1, Ordering::SeqCst);

        if self.rejected_addresses.contains(address) {
            return Err(SheetsError::WriteRejected {
                range: address.to_string(),
                message: "403 Forbidden: The caller does not have permission".to_string(),
            });
        }

        let mut writes = self.writes.lock().map_err(|_| SheetsError::WriteRejected {
            range: address.to_string(),
            message: "lock poisoned".to_string(),
        })?;
        writes.push(RecordedWrite {
            address: address.to_string(),
            update: update.clone(),
            values: update.to_values(),
        });
        Ok(())
    }
}
