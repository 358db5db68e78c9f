//! Shared fixtures: real Delta-log directories written into temp dirs.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use delta_classic::Extension;
use delta_classic::host::memory::MemoryHost;
use serde_json::{Value, json};
use tempfile::TempDir;

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture { dir: TempDir::new().unwrap() }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// `single_schema/` with table_a (3 rows) and table_b (2 rows)
    pub fn single_schema(&self) -> String {
        let root = self.path("single_schema");
        write_table(&root.join("table_a"), &[("id", "long"), ("name", "string")], &[3]);
        write_table(&root.join("table_b"), &[("id", "long"), ("value", "double")], &[2]);
        path_string(&root)
    }

    /// `multi_schema/` with schema1/{table_x (5 rows), table_y (2 rows)} and schema2/table_z (3 rows)
    pub fn multi_schema(&self) -> String {
        let root = self.path("multi_schema");
        write_table(&root.join("schema1/table_x"), &[("id", "long"), ("amount", "long")], &[2, 3]);
        write_table(&root.join("schema1/table_y"), &[("id", "long")], &[2]);
        write_table(&root.join("schema2/table_z"), &[("id", "long"), ("label", "string")], &[3]);
        path_string(&root)
    }

    /// A single-schema root holding the named one-row tables
    pub fn tables(&self, root: &str, names: &[&str]) -> String {
        let root = self.path(root);
        for name in names {
            write_table(&root.join(name), &[("id", "long")], &[1]);
        }
        path_string(&root)
    }
}

pub fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Extension over an in-memory host, returning the host for inspection
pub fn extension() -> (Arc<Extension>, Arc<MemoryHost>) {
    let host = Arc::new(MemoryHost::new());
    let extension = Arc::new(Extension::with_host(host.clone()));
    (extension, host)
}

/// Writes commit 0: protocol, metadata and one add per entry of `files` (its row count).
pub fn write_table(table: &Path, columns: &[(&str, &str)], files: &[u64]) {
    let fields: Vec<Value> = columns.iter()
        .map(|(name, ty)| json!({"name": name, "type": ty, "nullable": true, "metadata": {}}))
        .collect();
    let schema = json!({"type": "struct", "fields": fields}).to_string();

    let mut actions = vec![
        json!({"protocol": {"minReaderVersion": 1, "minWriterVersion": 2}}),
        json!({"metaData": {
            "id": table.file_name().map(|n| n.to_string_lossy().into_owned()),
            "format": {"provider": "parquet", "options": {}},
            "schemaString": schema,
            "partitionColumns": [],
            "configuration": {},
        }}),
    ];
    for (i, rows) in files.iter().enumerate() {
        actions.push(add_action(&format!("part-{:05}.parquet", i), *rows));
    }
    write_commit(table, 0, &actions);
}

/// Appends commit `version` adding one more data file
pub fn append_rows(table: &Path, version: u64, rows: u64) {
    write_commit(table, version, &[add_action(&format!("part-v{}.parquet", version), rows)]);
}

pub fn add_action(path: &str, rows: u64) -> Value {
    json!({"add": {
        "path": path,
        "size": 512 * rows,
        "partitionValues": {},
        "modificationTime": 0,
        "dataChange": true,
        "stats": json!({"numRecords": rows}).to_string(),
    }})
}

pub fn write_commit(table: &Path, version: u64, actions: &[Value]) {
    let log = table.join("_delta_log");
    fs::create_dir_all(&log).unwrap();
    let mut file = fs::File::create(log.join(format!("{:020}.json", version))).unwrap();
    for action in actions {
        writeln!(file, "{}", action).unwrap();
    }
}
