use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use chrono::Utc;
use serde::Deserialize;
use crate::core::error::{Error, ErrorKind, Result};
use crate::reader::table_format::{ColumnDef, DataFile, TableFormatReader, TableSnapshot};

/// Filesystem reader for Delta-style tables.
///
/// A table root is any directory holding a log directory (`_delta_log` by
/// default) with zero-padded `<version>.json` commits. Resolution replays
/// every commit from version 0; checkpoint files are not read.
#[derive(Debug, Clone)]
pub struct DeltaLogReader {
    pub log_dir_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogAction {
    add: Option<AddAction>,
    remove: Option<RemoveAction>,
    meta_data: Option<MetaDataAction>,
}

#[derive(Debug, Deserialize)]
struct AddAction {
    path: String,
    #[serde(default)]
    size: u64,
    stats: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoveAction {
    path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaDataAction {
    schema_string: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileStats {
    num_records: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct StructType {
    fields: Vec<StructField>,
}

#[derive(Debug, Deserialize)]
struct StructField {
    name: String,
    #[serde(rename = "type")]
    data_type: serde_json::Value,
    #[serde(default = "default_nullable")]
    nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl Default for DeltaLogReader {
    fn default() -> Self {
        DeltaLogReader::new("_delta_log")
    }
}

impl DeltaLogReader {
    pub fn new(log_dir_name: &str) -> Self {
        DeltaLogReader {
            log_dir_name: log_dir_name.to_string(),
        }
    }

    pub fn log_dir(&self, table_path: &Path) -> PathBuf {
        table_path.join(&self.log_dir_name)
    }

    /// Commit files sorted by version
    fn list_commits(&self, log_dir: &Path) -> Result<Vec<(u64, PathBuf)>> {
        let mut commits = Vec::new();
        for entry in fs::read_dir(log_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let version = path.file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|s| s.parse::<u64>().ok());
            if let Some(version) = version {
                commits.push((version, path));
            }
        }
        commits.sort_by_key(|(version, _)| *version);
        Ok(commits)
    }

    fn parse_schema(schema_string: &str) -> Result<Vec<ColumnDef>> {
        let schema: StructType = serde_json::from_str(schema_string)?;
        Ok(schema.fields.into_iter()
            .map(|field| ColumnDef {
                data_type: type_name(&field.data_type),
                name: field.name,
                nullable: field.nullable,
            })
            .collect())
    }
}

fn type_name(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => map.get("type")
            .and_then(|t| t.as_str())
            .unwrap_or("struct")
            .to_string(),
        other => other.to_string(),
    }
}

impl TableFormatReader for DeltaLogReader {
    fn is_table(&self, path: &Path) -> bool {
        self.log_dir(path).is_dir()
    }

    // The log is replayed to its latest version either way; pinning is enforced by the caller.
    fn resolve_snapshot(&self, path: &Path, _pin: bool) -> Result<TableSnapshot> {
        let log_dir = self.log_dir(path);
        if !log_dir.is_dir() {
            return Err(Error::new(
                ErrorKind::PathNotFound,
                format!("no transaction log at {}", log_dir.display()),
            ));
        }

        let commits = self.list_commits(&log_dir)?;
        let Some((last_version, _)) = commits.last() else {
            return Err(Error::new(
                ErrorKind::Parse,
                format!("transaction log at {} has no commits", log_dir.display()),
            ));
        };
        let last_version = *last_version;

        // Replay has to start at 0 and may not skip a version
        for (expected, (version, _)) in commits.iter().enumerate() {
            if *version != expected as u64 {
                return Err(Error::new(
                    ErrorKind::Parse,
                    format!(
                        "transaction log at {} is missing commit {} (checkpoints are not supported)",
                        log_dir.display(),
                        expected
                    ),
                ));
            }
        }

        let mut files: BTreeMap<String, DataFile> = BTreeMap::new();
        let mut columns = Vec::new();

        for (version, commit_path) in &commits {
            let reader = BufReader::new(fs::File::open(commit_path)?);
            for (line_no, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let action: LogAction = serde_json::from_str(&line).map_err(|e| Error::new(
                    ErrorKind::Parse,
                    format!("commit {} line {}: {}", version, line_no + 1, e),
                ))?;

                if let Some(meta) = action.meta_data {
                    columns = Self::parse_schema(&meta.schema_string)?;
                }
                if let Some(remove) = action.remove {
                    files.remove(&remove.path);
                }
                if let Some(add) = action.add {
                    let num_records = match add.stats.as_deref() {
                        Some(stats) => serde_json::from_str::<FileStats>(stats)?.num_records,
                        None => None,
                    };
                    files.insert(add.path.clone(), DataFile {
                        path: add.path,
                        size: add.size,
                        num_records,
                    });
                }
            }
        }

        Ok(TableSnapshot {
            version: last_version,
            columns,
            files: files.into_values().collect(),
            resolved_at: Utc::now(),
        })
    }
}
