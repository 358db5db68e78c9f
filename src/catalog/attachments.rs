use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use crate::catalog::handle::{DatabaseHandle, TableHandle};
use crate::core::error::{Error, ErrorKind, Result};
use crate::host::{AttachmentHost, InternalAttachment};
use crate::reader::table_format::{ColumnDef, TableFormatReader, TableSnapshot};

/// A table bound for one query: where the host can find it and what it held at bind time.
///
/// A binding outlives a DETACH or REPLACE of its database; the snapshot it
/// carries stays valid for the query that holds it.
#[derive(Debug, Clone)]
pub struct TableBinding {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub physical_path: PathBuf,
    pub internal_name: String,
    pub snapshot: Arc<TableSnapshot>,
}

impl TableBinding {
    pub fn version(&self) -> u64 {
        self.snapshot.version
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.snapshot.columns
    }

    pub fn num_records(&self) -> Option<u64> {
        self.snapshot.num_records()
    }
}

/// Creates and removes the hidden per-table attachments in the host engine
pub struct InternalAttachmentManager {
    pub reader: Arc<dyn TableFormatReader>,
    pub host: Arc<dyn AttachmentHost>,
    pub created: AtomicU64,
    pub refreshed: AtomicU64,
    pub removed: AtomicU64,
}

impl InternalAttachmentManager {
    pub fn new(reader: Arc<dyn TableFormatReader>, host: Arc<dyn AttachmentHost>) -> Self {
        InternalAttachmentManager {
            reader,
            host,
            created: AtomicU64::new(0),
            refreshed: AtomicU64::new(0),
            removed: AtomicU64::new(0),
        }
    }

    /// Materializes the table's internal attachment on first use.
    ///
    /// The table lock is held across resolution and host attach, so racing
    /// callers for one table wait and then see the finished attachment.
    /// Unrelated tables never contend. Unpinned tables are re-resolved on
    /// every call and the host is refreshed when the version moved.
    pub fn ensure_attached(&self, db: &DatabaseHandle, table: &TableHandle) -> Result<TableBinding> {
        let pin = db.options().pin_snapshot;
        let mut state = table.state.lock();

        if state.retired {
            return Err(Error::new(
                ErrorKind::NoSuchDatabase,
                format!("database \"{}\" was detached", db.name()),
            ));
        }

        if state.attached {
            let (Some(name), Some(current)) = (state.internal_name.clone(), state.snapshot.clone()) else {
                return Err(Error::new(
                    ErrorKind::Internal,
                    format!("table \"{}\" is attached without a snapshot", table.name()),
                ));
            };
            if pin {
                return Ok(binding(db, table, name, current));
            }

            let latest = self.reader.resolve_snapshot(table.physical_path(), false)?;
            if latest.version == current.version {
                return Ok(binding(db, table, name, current));
            }
            self.host.refresh(&name, &latest)?;
            self.refreshed.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                attachment = %name,
                from_version = current.version,
                to_version = latest.version,
                "refreshed internal attachment"
            );
            let latest = Arc::new(latest);
            state.snapshot = Some(latest.clone());
            return Ok(binding(db, table, name, latest));
        }

        let snapshot = self.reader.resolve_snapshot(table.physical_path(), pin)?;
        let name = table.reserved_internal_name().to_string();
        self.host.attach(&InternalAttachment {
            name: name.clone(),
            table_path: table.physical_path().to_path_buf(),
            pin_snapshot: pin,
            snapshot: snapshot.clone(),
        })?;
        self.created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            database = db.name(),
            schema = table.schema_name(),
            table = table.name(),
            attachment = %name,
            version = snapshot.version,
            "created internal attachment"
        );

        let snapshot = Arc::new(snapshot);
        state.attached = true;
        state.internal_name = Some(name.clone());
        state.snapshot = Some(snapshot.clone());
        Ok(binding(db, table, name, snapshot))
    }

    /// Removes every internal attachment the database owns and retires its tables.
    ///
    /// Never-accessed tables are only retired. Every table is visited even
    /// when the host fails; the first failure is returned afterwards.
    pub fn detach_all(&self, db: &DatabaseHandle) -> Result<usize> {
        let mut removed = 0;
        let mut first_error = None;

        for table in db.tables() {
            let mut state = table.state.lock();
            state.retired = true;
            if !state.attached {
                continue;
            }
            let name = state.internal_name.take()
                .unwrap_or_else(|| table.reserved_internal_name().to_string());
            state.attached = false;
            state.snapshot = None;

            match self.host.detach(&name) {
                Ok(true) => removed += 1,
                Ok(false) => {
                    tracing::warn!(attachment = %name, "internal attachment was already gone");
                }
                Err(e) => {
                    tracing::warn!(attachment = %name, error = %e, "failed to remove internal attachment");
                    first_error.get_or_insert(e);
                }
            }
        }

        self.removed.fetch_add(removed as u64, Ordering::Relaxed);
        match first_error {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }

    /// Reserved-prefix host attachments whose name starts with `prefix`
    pub fn live_attachments(&self, prefix: &str) -> Vec<String> {
        self.host.attachment_names()
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect()
    }
}

fn binding(db: &DatabaseHandle, table: &TableHandle, internal_name: String, snapshot: Arc<TableSnapshot>) -> TableBinding {
    TableBinding {
        database: db.name().to_string(),
        schema: table.schema_name().to_string(),
        table: table.name().to_string(),
        physical_path: table.physical_path().to_path_buf(),
        internal_name,
        snapshot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AttachOptions, Layout};
    use crate::host::memory::MemoryHost;
    use crate::storage::scanner::{DiscoveredSchema, DiscoveredTable};
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::path::Path;

    /// Reader whose version can be bumped from the test
    struct FakeReader {
        version: Mutex<u64>,
        resolves: AtomicU64,
    }

    impl TableFormatReader for FakeReader {
        fn is_table(&self, _path: &Path) -> bool {
            true
        }

        fn resolve_snapshot(&self, _path: &Path, _pin: bool) -> Result<TableSnapshot> {
            self.resolves.fetch_add(1, Ordering::SeqCst);
            Ok(TableSnapshot {
                version: *self.version.lock(),
                columns: Vec::new(),
                files: Vec::new(),
                resolved_at: Utc::now(),
            })
        }
    }

    fn setup(pin: bool) -> (Arc<FakeReader>, Arc<MemoryHost>, InternalAttachmentManager, DatabaseHandle) {
        let reader = Arc::new(FakeReader { version: Mutex::new(0), resolves: AtomicU64::new(0) });
        let host = Arc::new(MemoryHost::new());
        let manager = InternalAttachmentManager::new(reader.clone(), host.clone());
        let db = DatabaseHandle::build(
            "db",
            PathBuf::from("/data"),
            Layout::SingleSchema,
            AttachOptions { pin_snapshot: pin },
            vec![DiscoveredSchema {
                name: "main".to_string(),
                path: PathBuf::from("/data"),
                tables: vec![
                    DiscoveredTable { name: "a".to_string(), path: PathBuf::from("/data/a") },
                    DiscoveredTable { name: "b".to_string(), path: PathBuf::from("/data/b") },
                ],
            }],
        );
        (reader, host, manager, db)
    }

    #[test]
    fn concurrent_first_access_attaches_once() {
        let (_reader, host, manager, db) = setup(true);
        let table = db.table("main", "a").unwrap().clone();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| manager.ensure_attached(&db, &table).unwrap());
            }
        });

        assert_eq!(host.call_counts().attach, 1);
        assert_eq!(host.len(), 1);
        assert!(table.is_attached());
    }

    #[test]
    fn pinned_table_is_resolved_once() {
        let (reader, host, manager, db) = setup(true);
        let table = db.table("main", "a").unwrap().clone();

        manager.ensure_attached(&db, &table).unwrap();
        *reader.version.lock() = 7;
        let binding = manager.ensure_attached(&db, &table).unwrap();

        assert_eq!(binding.version(), 0);
        assert_eq!(reader.resolves.load(Ordering::SeqCst), 1);
        assert_eq!(host.call_counts().refresh, 0);
    }

    #[test]
    fn unpinned_table_follows_new_versions() {
        let (reader, host, manager, db) = setup(false);
        let table = db.table("main", "a").unwrap().clone();

        let first = manager.ensure_attached(&db, &table).unwrap();
        *reader.version.lock() = 3;
        let second = manager.ensure_attached(&db, &table).unwrap();

        assert_eq!(first.version(), 0);
        assert_eq!(second.version(), 3);
        assert_eq!(host.call_counts().refresh, 1);
        assert_eq!(host.get(&second.internal_name).unwrap().snapshot.version, 3);
    }

    #[test]
    fn detach_all_skips_untouched_tables_and_retires_everything() {
        let (_reader, host, manager, db) = setup(false);
        let a = db.table("main", "a").unwrap().clone();
        let b = db.table("main", "b").unwrap().clone();
        manager.ensure_attached(&db, &a).unwrap();

        assert_eq!(manager.detach_all(&db).unwrap(), 1);
        assert!(host.is_empty());
        assert!(!a.is_attached());

        let err = manager.ensure_attached(&db, &b).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoSuchDatabase);
        assert!(host.is_empty());
    }
}
