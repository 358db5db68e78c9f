use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{catalog_key, AttachOptions, HandleId, Layout, RESERVED_PREFIX};
use crate::reader::table_format::TableSnapshot;
use crate::storage::scanner::DiscoveredSchema;

/// One attached database. Immutable once built; replacing the root means a new handle.
#[derive(Debug)]
pub struct DatabaseHandle {
    id: HandleId,
    name: String,
    root_path: PathBuf,
    layout: Layout,
    options: AttachOptions,
    schemas: BTreeMap<String, Arc<SchemaHandle>>,
    attached_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SchemaHandle {
    name: String,
    path: PathBuf,
    tables: BTreeMap<String, Arc<TableHandle>>,
}

#[derive(Debug)]
pub struct TableHandle {
    name: String,
    schema_name: String,
    physical_path: PathBuf,
    internal_name: String,
    pub(crate) state: Mutex<TableState>,
}

/// Per-table attachment state, guarded by the table's own lock
#[derive(Debug, Default)]
pub struct TableState {
    pub attached: bool,
    pub retired: bool,
    pub internal_name: Option<String>,
    pub snapshot: Option<Arc<TableSnapshot>>,
}

impl DatabaseHandle {
    pub fn build(
        name: &str,
        root_path: PathBuf,
        layout: Layout,
        options: AttachOptions,
        discovered: Vec<DiscoveredSchema>,
    ) -> Self {
        let id = HandleId::new();
        let schemas = discovered.into_iter()
            .map(|schema| {
                let tables = schema.tables.into_iter()
                    .map(|table| {
                        let internal_name = internal_attachment_name(name, &id, &schema.name, &table.name);
                        let handle = TableHandle {
                            name: table.name,
                            schema_name: schema.name.clone(),
                            physical_path: table.path,
                            internal_name,
                            state: Mutex::new(TableState::default()),
                        };
                        (catalog_key(&handle.name), Arc::new(handle))
                    })
                    .collect();
                let handle = SchemaHandle {
                    name: schema.name,
                    path: schema.path,
                    tables,
                };
                (catalog_key(&handle.name), Arc::new(handle))
            })
            .collect();

        DatabaseHandle {
            id,
            name: name.to_string(),
            root_path,
            layout,
            options,
            schemas,
            attached_at: Utc::now(),
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn options(&self) -> AttachOptions {
        self.options
    }

    pub fn attached_at(&self) -> DateTime<Utc> {
        self.attached_at
    }

    /// Schemas in name order
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<SchemaHandle>> {
        self.schemas.values()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Arc<TableHandle>> {
        self.schemas.values().flat_map(|s| s.tables.values())
    }

    /// In a single-schema database the lone schema also answers to the database's own name.
    pub fn schema(&self, name: &str) -> Result<&Arc<SchemaHandle>> {
        if let Some(schema) = self.schemas.get(&catalog_key(name)) {
            return Ok(schema);
        }
        if self.layout == Layout::SingleSchema && self.name.eq_ignore_ascii_case(name) {
            if let Some(schema) = self.schemas.values().next() {
                return Ok(schema);
            }
        }
        Err(Error::new(
            ErrorKind::NoSuchSchema,
            format!("schema \"{}\" not found in delta_classic database \"{}\"", name, self.name),
        ))
    }

    pub fn table(&self, schema: &str, table: &str) -> Result<&Arc<TableHandle>> {
        let schema_handle = self.schema(schema)?;
        schema_handle.table(table).ok_or_else(|| Error::new(
            ErrorKind::NoSuchTable,
            format!(
                "table \"{}\" not found in schema \"{}\" of delta_classic database \"{}\"",
                table,
                schema_handle.name(),
                self.name
            ),
        ))
    }

    pub fn table_count(&self) -> usize {
        self.schemas.values().map(|s| s.tables.len()).sum()
    }
}

impl SchemaHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tables(&self) -> impl Iterator<Item = &Arc<TableHandle>> {
        self.tables.values()
    }

    pub fn table(&self, name: &str) -> Option<&Arc<TableHandle>> {
        self.tables.get(&catalog_key(name))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn physical_path(&self) -> &Path {
        &self.physical_path
    }

    pub fn is_attached(&self) -> bool {
        self.state.lock().attached
    }

    /// Name of the live internal attachment, if one has been created
    pub fn internal_attachment_name(&self) -> Option<String> {
        self.state.lock().internal_name.clone()
    }

    /// Name the internal attachment gets on first access
    pub(crate) fn reserved_internal_name(&self) -> &str {
        &self.internal_name
    }
}

// Hex digits of a handle id as it appears inside internal names
const HANDLE_ID_LEN: usize = 32;

/// `__dc_<database>_<handle id>_<schema>_<table>`. The handle id keeps names
/// distinct across databases on the same root and across re-attachments.
pub fn internal_attachment_name(database: &str, id: &HandleId, schema: &str, table: &str) -> String {
    format!("{}{}_{}_{}_{}", RESERVED_PREFIX, database, id, schema, table)
}

/// Whether `internal_name` was made for a database called `database`.
///
/// A handle id has to follow `__dc_<database>_` directly, so `a` never
/// claims the attachments of `a_b`.
pub fn is_internal_name_of(internal_name: &str, database: &str) -> bool {
    let prefix = format!("{}{}_", RESERVED_PREFIX, database);
    let Some(head) = internal_name.get(..prefix.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(&prefix) {
        return false;
    }
    let rest = &internal_name[prefix.len()..];
    match rest.get(..HANDLE_ID_LEN) {
        Some(id) => id.chars().all(|c| c.is_ascii_hexdigit()) && rest[HANDLE_ID_LEN..].starts_with('_'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_names_belong_to_exactly_one_database() {
        let id = HandleId::new();
        let name = internal_attachment_name("a_b", &id, "main", "table_a");

        assert!(is_internal_name_of(&name, "a_b"));
        assert!(is_internal_name_of(&name, "A_B"));
        assert!(!is_internal_name_of(&name, "a"));
        assert!(!is_internal_name_of(&name, "a_b_c"));
        assert!(!is_internal_name_of("__dc_a_", "a"));
        assert!(!is_internal_name_of("main_table_a", "a"));
    }
}
