use std::path::Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::error::Result;

/// Interprets a table directory's transaction log.
///
/// The catalog only asks two questions: is this directory a table, and what
/// is its current physical state. How versions are chosen, and whether any
/// storage I/O is cached, is up to the implementation.
pub trait TableFormatReader: Send + Sync {
    fn is_table(&self, path: &Path) -> bool;

    /// `pin` tells the reader the result will be held for the attachment's lifetime.
    fn resolve_snapshot(&self, path: &Path, pin: bool) -> Result<TableSnapshot>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFile {
    pub path: String,
    pub size: u64,
    pub num_records: Option<u64>,
}

/// Physical state of a table at one log version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub version: u64,
    pub columns: Vec<ColumnDef>,
    pub files: Vec<DataFile>,
    pub resolved_at: DateTime<Utc>,
}

impl TableSnapshot {
    /// None when any file lacks a record count.
    pub fn num_records(&self) -> Option<u64> {
        self.files.iter()
            .map(|f| f.num_records)
            .sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}
