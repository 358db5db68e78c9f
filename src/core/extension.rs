use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime};
use crate::catalog::attachments::{InternalAttachmentManager, TableBinding};
use crate::catalog::guard::ReadOnlyGuard;
use crate::catalog::handle::{is_internal_name_of, DatabaseHandle};
use crate::catalog::lifecycle::{AttachOutcome, AttachRequest, LifecycleController, OnConflict};
use crate::catalog::registry::{CatalogRegistry, DatabaseInfo, SchemaInfo, TableInfo};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::session::Session;
use crate::core::stats::{ExtensionStats, HealthCheck, HealthCheckResult, HealthStatus, InternalAttachmentStats};
use crate::core::types::{AttachOptions, Layout, ObjectName, RESERVED_PREFIX};
use crate::host::AttachmentHost;
use crate::host::memory::MemoryHost;
use crate::query::ast::MutationStatement;
use crate::reader::delta_log::DeltaLogReader;
use crate::reader::table_format::{ColumnDef, TableFormatReader};

/// The delta_classic extension as loaded into one host engine.
///
/// Owns the registry of attached databases and every internal attachment
/// made on their behalf. Created at extension load; `shutdown` (or drop)
/// detaches everything.
pub struct Extension {
    config: Arc<Config>,
    registry: Arc<CatalogRegistry>,
    host: Arc<dyn AttachmentHost>,
    attachments: Arc<InternalAttachmentManager>,
    lifecycle: LifecycleController,

    // Metrics
    start_time: Instant,
    started_at: SystemTime,
    bind_count: AtomicU64,
    rejected_writes: AtomicU64,
}

impl Extension {
    pub fn new(config: Config, reader: Arc<dyn TableFormatReader>, host: Arc<dyn AttachmentHost>) -> Self {
        let config = Arc::new(config);
        let registry = Arc::new(CatalogRegistry::new());
        let attachments = Arc::new(InternalAttachmentManager::new(reader.clone(), host.clone()));
        let lifecycle = LifecycleController::new(
            config.clone(),
            registry.clone(),
            reader,
            attachments.clone(),
        );

        tracing::info!(extension_type = %config.extension_type, "delta_classic extension loaded");

        Extension {
            config,
            registry,
            host,
            attachments,
            lifecycle,
            start_time: Instant::now(),
            started_at: SystemTime::now(),
            bind_count: AtomicU64::new(0),
            rejected_writes: AtomicU64::new(0),
        }
    }

    /// Delta-log reader over `host` with the given config
    pub fn with_config(config: Config, host: Arc<dyn AttachmentHost>) -> Self {
        let reader = Arc::new(DeltaLogReader::new(&config.log_dir_name));
        Extension::new(config, reader, host)
    }

    /// Delta-log reader and default config
    pub fn with_host(host: Arc<dyn AttachmentHost>) -> Self {
        Extension::with_config(Config::default(), host)
    }

    /// Defaults throughout, with an in-process host
    pub fn in_memory() -> Self {
        Extension::with_host(Arc::new(MemoryHost::new()))
    }

    /// Loads the config from a JSON file
    pub fn from_config_file(path: &Path, host: Arc<dyn AttachmentHost>) -> Result<Self> {
        Ok(Extension::with_config(Config::from_json_file(path)?, host))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &CatalogRegistry {
        &self.registry
    }

    pub fn connect(self: &Arc<Self>) -> Session {
        Session::new(self.clone())
    }

    // -----------------------------------------------------------------------
    // Lifecycle

    pub fn attach(&self, name: &str, path: &str, options: AttachOptions) -> Result<Arc<DatabaseHandle>> {
        self.attach_with(name, path, options, OnConflict::Error)
            .map(|outcome| outcome.handle().clone())
    }

    pub fn attach_or_replace(&self, name: &str, path: &str, options: AttachOptions) -> Result<Arc<DatabaseHandle>> {
        self.attach_with(name, path, options, OnConflict::Replace)
            .map(|outcome| outcome.handle().clone())
    }

    pub fn attach_with(
        &self,
        name: &str,
        path: &str,
        options: AttachOptions,
        on_conflict: OnConflict,
    ) -> Result<AttachOutcome> {
        self.lifecycle.attach(AttachRequest {
            name: name.to_string(),
            path: path.to_string(),
            options,
            on_conflict,
        })
    }

    pub fn detach(&self, name: &str) -> Result<()> {
        self.lifecycle.detach(name).map(|_| ())
    }

    /// DETACH IF EXISTS; reports whether anything was detached
    pub fn detach_if_exists(&self, name: &str) -> Result<bool> {
        match self.lifecycle.detach(name) {
            Ok(_) => Ok(true),
            Err(e) if e.kind == ErrorKind::NoSuchDatabase => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Detaches every database. Safe to call more than once.
    pub fn shutdown(&self) -> Result<usize> {
        let detached = self.lifecycle.shutdown()?;
        tracing::info!(
            databases = detached,
            uptime_secs = self.start_time.elapsed().as_secs(),
            "delta_classic extension shut down"
        );
        Ok(detached)
    }

    pub fn is_shut_down(&self) -> bool {
        self.lifecycle.is_closed()
    }

    // -----------------------------------------------------------------------
    // Resolution

    pub fn database(&self, name: &str) -> Result<Arc<DatabaseHandle>> {
        self.registry.get(name)
    }

    pub fn is_attached(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Binds `database.schema.table` for a query, creating the internal attachment on first use.
    pub fn bind_table(&self, database: &str, schema: &str, table: &str) -> Result<TableBinding> {
        let db = self.registry.get(database)?;
        let handle = db.table(schema, table)?;
        let binding = self.attachments.ensure_attached(&db, handle)?;
        self.bind_count.fetch_add(1, Ordering::Relaxed);
        Ok(binding)
    }

    /// Resolves a 1, 2 or 3 part table name against `current` and binds it.
    ///
    /// A two part name is `database.table` when a database by the first
    /// part is attached and `schema.table` in `current` otherwise. One part
    /// names use the current database's default schema.
    pub fn bind_name(&self, name: &ObjectName, current: Option<&str>) -> Result<TableBinding> {
        let (database, schema, table) = match name.parts.as_slice() {
            [database, schema, table] => (database.clone(), Some(schema.clone()), table.clone()),
            [first, table] if self.registry.contains(first) => (first.clone(), None, table.clone()),
            [schema, table] => (require_current(current, name)?, Some(schema.clone()), table.clone()),
            [table] => (require_current(current, name)?, None, table.clone()),
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    format!("\"{}\" is not a table name", name),
                ));
            }
        };

        let schema = match schema {
            Some(schema) => schema,
            None => self.default_schema_of(&database)?,
        };
        self.bind_table(&database, &schema, &table)
    }

    pub fn describe_table(&self, database: &str, schema: &str, table: &str) -> Result<Vec<ColumnDef>> {
        let binding = self.bind_table(database, schema, table)?;
        Ok(binding.columns().to_vec())
    }

    fn default_schema_of(&self, database: &str) -> Result<String> {
        let db = self.registry.get(database)?;
        match db.layout() {
            Layout::SingleSchema => Ok(db.schemas()
                .next()
                .map(|s| s.name().to_string())
                .unwrap_or_else(|| self.config.default_schema.clone())),
            Layout::MultiSchema => Ok(self.config.default_schema.clone()),
        }
    }

    // -----------------------------------------------------------------------
    // Read-only guard

    /// Rejects `statement` when it writes into an attached database
    pub fn check_mutation(&self, statement: &MutationStatement, current: Option<&str>) -> Result<()> {
        ReadOnlyGuard::check(statement, current, &self.registry).inspect_err(|_| {
            self.rejected_writes.fetch_add(1, Ordering::Relaxed);
        })
    }

    // -----------------------------------------------------------------------
    // Catalog metadata

    pub fn databases(&self) -> Vec<DatabaseInfo> {
        self.registry.database_infos()
    }

    pub fn schemas(&self, database: Option<&str>) -> Result<Vec<SchemaInfo>> {
        self.registry.schema_infos(database)
    }

    pub fn tables(&self, database: Option<&str>) -> Result<Vec<TableInfo>> {
        self.registry.table_infos(database)
    }

    /// Reserved-prefix attachments in the host that no attached database owns
    pub fn orphaned_attachments(&self) -> Vec<String> {
        let live = self.attachments.live_attachments(RESERVED_PREFIX);
        let owned: HashSet<String> = self.registry.handles()
            .iter()
            .flat_map(|db| db.tables().filter_map(|t| t.internal_attachment_name()).collect::<Vec<_>>())
            .collect();
        live.into_iter().filter(|name| !owned.contains(name)).collect()
    }

    pub fn stats(&self) -> ExtensionStats {
        let handles = self.registry.handles();
        ExtensionStats {
            uptime_secs: self.start_time.elapsed().as_secs(),
            start_time: self.started_at,
            attached_databases: handles.len(),
            discovered_schemas: handles.iter().map(|db| db.schemas().count()).sum(),
            discovered_tables: handles.iter().map(|db| db.table_count()).sum(),
            materialized_tables: handles.iter()
                .map(|db| db.tables().filter(|t| t.is_attached()).count())
                .sum(),
            attaches: self.lifecycle.attach_count.load(Ordering::Relaxed),
            replaces: self.lifecycle.replace_count.load(Ordering::Relaxed),
            detaches: self.lifecycle.detach_count.load(Ordering::Relaxed),
            internal_attachments: InternalAttachmentStats {
                created: self.attachments.created.load(Ordering::Relaxed),
                refreshed: self.attachments.refreshed.load(Ordering::Relaxed),
                removed: self.attachments.removed.load(Ordering::Relaxed),
                live: self.attachments.live_attachments(RESERVED_PREFIX).len(),
            },
            rejected_writes: self.rejected_writes.load(Ordering::Relaxed),
            bindings: self.bind_count.load(Ordering::Relaxed),
        }
    }

    pub fn health_check(&self) -> HealthCheckResult {
        let mut checks = Vec::new();

        let started = Instant::now();
        let orphans = self.orphaned_attachments();
        checks.push(HealthCheck {
            name: "internal_attachments".to_string(),
            status: if orphans.is_empty() {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded(format!("{} orphaned internal attachments", orphans.len()))
            },
            message: (!orphans.is_empty()).then(|| orphans.join(", ")),
            latency_ms: started.elapsed().as_millis() as u64,
        });

        let started = Instant::now();
        let missing: Vec<String> = self.registry.handles()
            .iter()
            .filter(|db| !db.root_path().is_dir())
            .map(|db| db.name().to_string())
            .collect();
        checks.push(HealthCheck {
            name: "attachment_roots".to_string(),
            status: if missing.is_empty() {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded(format!("{} attachment roots are gone", missing.len()))
            },
            message: (!missing.is_empty()).then(|| missing.join(", ")),
            latency_ms: started.elapsed().as_millis() as u64,
        });

        checks.push(HealthCheck {
            name: "lifecycle".to_string(),
            status: if self.is_shut_down() {
                HealthStatus::Unhealthy("extension is shut down".to_string())
            } else {
                HealthStatus::Healthy
            },
            message: None,
            latency_ms: 0,
        });

        HealthCheckResult::from_checks(checks)
    }

    /// Internal attachment names the host currently holds for `database`
    pub fn internal_attachments_of(&self, database: &str) -> Vec<String> {
        self.attachments.live_attachments(RESERVED_PREFIX)
            .into_iter()
            .filter(|name| is_internal_name_of(name, database))
            .collect()
    }

    pub fn host(&self) -> &Arc<dyn AttachmentHost> {
        &self.host
    }

}

impl Drop for Extension {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!(error = %e, "shutdown on drop left errors behind");
        }
    }
}

fn require_current(current: Option<&str>, name: &ObjectName) -> Result<String> {
    current.map(str::to_string).ok_or_else(|| Error::new(
        ErrorKind::NoSuchDatabase,
        format!("no current database to resolve \"{}\"", name),
    ))
}
