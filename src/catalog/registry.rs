use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use crate::catalog::handle::DatabaseHandle;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{catalog_key, Layout};

/// Row of the database listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseInfo {
    pub database_name: String,
    pub path: PathBuf,
    pub layout: Layout,
    pub pin_snapshot: bool,
    pub readonly: bool,
    pub schema_count: usize,
    pub table_count: usize,
    pub attached_at: DateTime<Utc>,
}

/// Row of the schema listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaInfo {
    pub database_name: String,
    pub schema_name: String,
    pub path: PathBuf,
    pub table_count: usize,
}

/// Row of the table listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInfo {
    pub database_name: String,
    pub schema_name: String,
    pub table_name: String,
    pub path: PathBuf,
    pub attached: bool,
}

/// Attached databases by name.
///
/// Readers clone an `Arc` out under the read lock and never see a
/// half-built handle: handles are complete before they are inserted.
pub struct CatalogRegistry {
    databases: RwLock<BTreeMap<String, Arc<DatabaseHandle>>>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        CatalogRegistry {
            databases: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<DatabaseHandle>> {
        self.databases.read()
            .get(&catalog_key(name))
            .cloned()
            .ok_or_else(|| Error::no_such_database(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.databases.read().contains_key(&catalog_key(name))
    }

    pub fn len(&self) -> usize {
        self.databases.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.read().is_empty()
    }

    /// All handles, in name order
    pub fn handles(&self) -> Vec<Arc<DatabaseHandle>> {
        self.databases.read().values().cloned().collect()
    }

    pub fn insert(&self, handle: Arc<DatabaseHandle>) -> Result<()> {
        let mut databases = self.databases.write();
        let key = catalog_key(handle.name());
        if databases.contains_key(&key) {
            return Err(duplicate(handle.name()));
        }
        databases.insert(key, handle);
        Ok(())
    }

    /// Installs `handle`, tearing down any previous handle of the same name
    /// while the write lock is held.
    ///
    /// Readers observe either the old handle or the new one. If teardown
    /// fails the new handle is still installed and the error is returned.
    pub fn replace<F>(&self, handle: Arc<DatabaseHandle>, teardown: F) -> Result<Option<Arc<DatabaseHandle>>>
    where
        F: FnOnce(&DatabaseHandle) -> Result<()>,
    {
        let mut databases = self.databases.write();
        let key = catalog_key(handle.name());
        let previous = databases.insert(key, handle);
        if let Some(old) = &previous {
            teardown(old)?;
        }
        Ok(previous)
    }

    /// Removes `name`, running `teardown` on the handle under the write lock.
    ///
    /// The entry is gone even when teardown reports an error.
    pub fn remove<F>(&self, name: &str, teardown: F) -> Result<Arc<DatabaseHandle>>
    where
        F: FnOnce(&DatabaseHandle) -> Result<()>,
    {
        let mut databases = self.databases.write();
        let handle = databases.remove(&catalog_key(name))
            .ok_or_else(|| Error::no_such_database(name))?;
        teardown(&handle)?;
        Ok(handle)
    }

    pub fn database_infos(&self) -> Vec<DatabaseInfo> {
        self.databases.read()
            .values()
            .map(|db| DatabaseInfo {
                database_name: db.name().to_string(),
                path: db.root_path().to_path_buf(),
                layout: db.layout(),
                pin_snapshot: db.options().pin_snapshot,
                readonly: true,
                schema_count: db.schemas().count(),
                table_count: db.table_count(),
                attached_at: db.attached_at(),
            })
            .collect()
    }

    /// Schemas of one database, or of every database when `database` is None
    pub fn schema_infos(&self, database: Option<&str>) -> Result<Vec<SchemaInfo>> {
        let handles = self.select(database)?;
        Ok(handles.iter()
            .flat_map(|db| db.schemas().map(move |schema| SchemaInfo {
                database_name: db.name().to_string(),
                schema_name: schema.name().to_string(),
                path: schema.path().to_path_buf(),
                table_count: schema.len(),
            }))
            .collect())
    }

    /// Tables of one database, or of every database when `database` is None
    pub fn table_infos(&self, database: Option<&str>) -> Result<Vec<TableInfo>> {
        let handles = self.select(database)?;
        Ok(handles.iter()
            .flat_map(|db| db.tables().map(move |table| TableInfo {
                database_name: db.name().to_string(),
                schema_name: table.schema_name().to_string(),
                table_name: table.name().to_string(),
                path: table.physical_path().to_path_buf(),
                attached: table.is_attached(),
            }))
            .collect())
    }

    fn select(&self, database: Option<&str>) -> Result<Vec<Arc<DatabaseHandle>>> {
        match database {
            Some(name) => Ok(vec![self.get(name)?]),
            None => Ok(self.handles()),
        }
    }
}

impl Default for CatalogRegistry {
    fn default() -> Self {
        CatalogRegistry::new()
    }
}

fn duplicate(name: &str) -> Error {
    Error::new(
        ErrorKind::DuplicateName,
        format!("database \"{}\" is already attached", name),
    )
}
