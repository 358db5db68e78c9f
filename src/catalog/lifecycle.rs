use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use parking_lot::Mutex;
use crate::catalog::attachments::InternalAttachmentManager;
use crate::catalog::handle::DatabaseHandle;
use crate::catalog::registry::CatalogRegistry;
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{is_reserved_name, normalize_root, AttachOptions};
use crate::reader::table_format::TableFormatReader;
use crate::storage::layout::LayoutDetector;
use crate::storage::scanner::DirectoryScanner;

/// What ATTACH does when the name is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    Error,
    Replace,
    Ignore,
}

#[derive(Debug, Clone)]
pub struct AttachRequest {
    pub name: String,
    pub path: String,
    pub options: AttachOptions,
    pub on_conflict: OnConflict,
}

#[derive(Debug, Clone)]
pub enum AttachOutcome {
    Attached(Arc<DatabaseHandle>),
    Replaced(Arc<DatabaseHandle>),
    /// IF NOT EXISTS hit an existing name; holds the untouched handle
    Existing(Arc<DatabaseHandle>),
}

impl AttachOutcome {
    pub fn handle(&self) -> &Arc<DatabaseHandle> {
        match self {
            AttachOutcome::Attached(h) | AttachOutcome::Replaced(h) | AttachOutcome::Existing(h) => h,
        }
    }
}

/// Drives ATTACH, ATTACH OR REPLACE and DETACH.
///
/// Structural changes are serialized process-wide by `lock`. Discovery for
/// a new handle runs before the registry is touched, so a failed attach or
/// replace leaves the catalog exactly as it was. `closed` only changes under
/// `lock`, so no attach can land after `shutdown` has emptied the registry.
pub struct LifecycleController {
    pub config: Arc<Config>,
    pub registry: Arc<CatalogRegistry>,
    pub reader: Arc<dyn TableFormatReader>,
    pub attachments: Arc<InternalAttachmentManager>,
    pub lock: Mutex<()>,
    pub closed: AtomicBool,
    pub attach_count: AtomicU64,
    pub replace_count: AtomicU64,
    pub detach_count: AtomicU64,
}

impl LifecycleController {
    pub fn new(
        config: Arc<Config>,
        registry: Arc<CatalogRegistry>,
        reader: Arc<dyn TableFormatReader>,
        attachments: Arc<InternalAttachmentManager>,
    ) -> Self {
        LifecycleController {
            config,
            registry,
            reader,
            attachments,
            lock: Mutex::new(()),
            closed: AtomicBool::new(false),
            attach_count: AtomicU64::new(0),
            replace_count: AtomicU64::new(0),
            detach_count: AtomicU64::new(0),
        }
    }

    pub fn attach(&self, request: AttachRequest) -> Result<AttachOutcome> {
        validate_name(&request.name)?;
        let _guard = self.lock.lock();
        self.ensure_open()?;

        if self.registry.contains(&request.name) {
            match request.on_conflict {
                OnConflict::Error => {
                    return Err(Error::new(
                        ErrorKind::DuplicateName,
                        format!("database \"{}\" is already attached", request.name),
                    ));
                }
                OnConflict::Ignore => {
                    return Ok(AttachOutcome::Existing(self.registry.get(&request.name)?));
                }
                OnConflict::Replace => {}
            }
        }

        let handle = Arc::new(self.build_handle(&request)?);

        if request.on_conflict != OnConflict::Replace {
            self.registry.insert(handle.clone())?;
            self.attach_count.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                database = handle.name(),
                path = %handle.root_path().display(),
                layout = %handle.layout(),
                tables = handle.table_count(),
                "attached database"
            );
            return Ok(AttachOutcome::Attached(handle));
        }

        let previous = self.registry.replace(handle.clone(), |old| {
            self.attachments.detach_all(old).map(|removed| {
                tracing::info!(
                    database = old.name(),
                    old_path = %old.root_path().display(),
                    new_path = %handle.root_path().display(),
                    internal_attachments = removed,
                    "replaced database"
                );
            })
        })?;

        match previous {
            Some(_) => {
                self.replace_count.fetch_add(1, Ordering::Relaxed);
                Ok(AttachOutcome::Replaced(handle))
            }
            None => {
                self.attach_count.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    database = handle.name(),
                    path = %handle.root_path().display(),
                    layout = %handle.layout(),
                    tables = handle.table_count(),
                    "attached database"
                );
                Ok(AttachOutcome::Attached(handle))
            }
        }
    }

    /// Tears down every internal attachment, then drops the registry entry.
    pub fn detach(&self, name: &str) -> Result<Arc<DatabaseHandle>> {
        if is_reserved_name(name) {
            return Err(reserved(name));
        }
        let _guard = self.lock.lock();
        self.detach_locked(name)
    }

    /// Refuses further attaches and detaches everything. Returns how many
    /// databases went away; zero once already closed.
    pub fn shutdown(&self) -> Result<usize> {
        let _guard = self.lock.lock();
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(0);
        }
        self.detach_all_locked()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn detach_all_locked(&self) -> Result<usize> {
        let mut detached = 0;
        let mut first_error = None;
        for handle in self.registry.handles() {
            match self.detach_locked(handle.name()) {
                Ok(_) => detached += 1,
                Err(e) => {
                    tracing::warn!(database = handle.name(), error = %e, "detach during shutdown failed");
                    detached += 1;
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(detached),
        }
    }

    fn detach_locked(&self, name: &str) -> Result<Arc<DatabaseHandle>> {
        let handle = self.registry.remove(name, |handle| {
            let removed = self.attachments.detach_all(handle)?;
            tracing::info!(
                database = handle.name(),
                internal_attachments = removed,
                "detached database"
            );
            Ok(())
        })?;
        self.detach_count.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::new(
                ErrorKind::Internal,
                "delta_classic extension is shut down".to_string(),
            ));
        }
        Ok(())
    }

    /// Layout detection plus a full scan, without touching the registry
    fn build_handle(&self, request: &AttachRequest) -> Result<DatabaseHandle> {
        let root = normalize_root(&request.path);
        let layout = LayoutDetector::new(self.reader.as_ref(), &self.config).detect(&root)?;
        let schemas = DirectoryScanner::new(self.reader.as_ref(), &self.config).scan(&root, layout)?;
        Ok(DatabaseHandle::build(&request.name, root, layout, request.options, schemas))
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::new(ErrorKind::InvalidArgument, "database name is empty".to_string()));
    }
    if is_reserved_name(name) {
        return Err(reserved(name));
    }
    Ok(())
}

fn reserved(name: &str) -> Error {
    Error::new(
        ErrorKind::InvalidArgument,
        format!("database name \"{}\" uses the reserved prefix of internal attachments", name),
    )
}

