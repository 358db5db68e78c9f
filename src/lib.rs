pub mod core;
pub mod storage;
pub mod catalog;
pub mod reader;
pub mod host;
pub mod query;

pub use crate::core::config::Config;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::extension::Extension;
pub use crate::core::session::{Session, StatementOutcome};
pub use crate::core::types::{AttachOptions, Layout};
pub use crate::catalog::attachments::TableBinding;

/*
┌────────────────────────────────────────────────────────────────────────────────────────────┐
│                          DELTA_CLASSIC STRUCT ARCHITECTURE                                  │
└────────────────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────────── CORE LAYER ──────────────────────────────────────────┐
│                                                                                              │
│  ┌────────────────────────────────────────────────────────────────────────────────────┐    │
│  │                               struct Extension                                      │    │
│  │  ┌──────────────────────────────────────────────────────────────────────────────┐ │    │
│  │  │ config: Arc<Config>                      // Extension configuration         │ │    │
│  │  │ registry: Arc<CatalogRegistry>           // Attached databases by name      │ │    │
│  │  │ host: Arc<dyn AttachmentHost>            // Host engine attachment surface  │ │    │
│  │  │ attachments: Arc<InternalAttachmentManager> // Lazy hidden attachments      │ │    │
│  │  │ lifecycle: LifecycleController           // ATTACH / REPLACE / DETACH       │ │    │
│  │  │ // Metrics                                                                   │ │    │
│  │  │ start_time: Instant                                                          │ │    │
│  │  │ bind_count: AtomicU64                                                        │ │    │
│  │  │ rejected_writes: AtomicU64                                                   │ │    │
│  │  └──────────────────────────────────────────────────────────────────────────────┘ │    │
│  └────────────────────────────────────────────────────────────────────────────────────┘    │
│                                                                                              │
│  ┌──────────────────┐  ┌──────────────────────┐  ┌───────────────────────────────────┐    │
│  │ struct Config    │  │ struct Session       │  │ struct ExtensionStats             │    │
│  │ • extension_type │  │ • extension: Arc<>   │  │ • attached_databases              │    │
│  │ • default_schema │  │ • parser             │  │ • discovered_tables               │    │
│  │ • log_dir_name   │  │ • current_database   │  │ • materialized_tables             │    │
│  │ • skip_hidden    │  └──────────────────────┘  │ • internal_attachments            │    │
│  └──────────────────┘                            │ • rejected_writes                 │    │
│                                                  └───────────────────────────────────┘    │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────────── CATALOG LAYER ─────────────────────────────────────────┐
│                                                                                              │
│  ┌────────────────────────────────────────────────────────────────────────────────────┐    │
│  │                           struct DatabaseHandle                                     │    │
│  │  ┌──────────────────────────────────────────────────────────────────────────────┐ │    │
│  │  │ id: HandleId (uuid)                      // Never reused across attachments │ │    │
│  │  │ name: String                             // Catalog-visible name            │ │    │
│  │  │ root_path: PathBuf                       // Attachment root                 │ │    │
│  │  │ layout: Layout                           // SingleSchema / MultiSchema      │ │    │
│  │  │ options: AttachOptions                   // PIN_SNAPSHOT                    │ │    │
│  │  │ schemas: BTreeMap<String, Arc<SchemaHandle>>                                │ │    │
│  │  └──────────────────────────────────────────────────────────────────────────────┘ │    │
│  └────────────────────────────────────────────────────────────────────────────────────┘    │
│                                                                                              │
│  ┌────────────────────────┐  ┌─────────────────────────┐  ┌────────────────────────┐      │
│  │ struct SchemaHandle    │  │ struct TableHandle      │  │ struct TableState      │      │
│  │ • name: String         │  │ • name, schema_name     │  │ • attached: bool       │      │
│  │ • path: PathBuf        │  │ • physical_path         │  │ • retired: bool        │      │
│  │ • tables: BTreeMap     │  │ • state: Mutex<State>   │  │ • snapshot: Arc<Snap>  │      │
│  └────────────────────────┘  └─────────────────────────┘  └────────────────────────┘      │
│                                                                                              │
│  ┌────────────────────────┐  ┌─────────────────────────┐  ┌────────────────────────┐      │
│  │ struct CatalogRegistry │  │ struct ReadOnlyGuard    │  │ struct Lifecycle-      │      │
│  │ • databases: RwLock<   │  │ • verdict(kind)         │  │   Controller           │      │
│  │   BTreeMap<Arc<DbH>>>  │  │ • target_database()     │  │ • lock: Mutex<()>      │      │
│  │ • replace(teardown)    │  │ • check()               │  │ • attach / detach      │      │
│  └────────────────────────┘  └─────────────────────────┘  └────────────────────────┘      │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── DISCOVERY LAYER ────────────────────────────────────────┐
│                                                                                              │
│  ┌────────────────────────┐  ┌─────────────────────────┐  ┌────────────────────────┐      │
│  │ struct LayoutDetector  │  │ struct DirectoryScanner │  │ struct DiscoveredSchema│      │
│  │ • detect(root)         │  │ • scan(root, layout)    │  │ • name, path           │      │
│  └────────────────────────┘  └─────────────────────────┘  │ • tables: Vec<Table>   │      │
│                                                            └────────────────────────┘      │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────────── COLLABORATOR LAYER ───────────────────────────────────────┐
│                                                                                              │
│  ┌────────────────────────┐  ┌─────────────────────────┐  ┌────────────────────────┐      │
│  │ trait TableFormatReader│  │ struct DeltaLogReader   │  │ struct TableSnapshot   │      │
│  │ • is_table()           │  │ • log_dir_name          │  │ • version: u64         │      │
│  │ • resolve_snapshot()   │  │ • replays commits       │  │ • columns, files       │      │
│  └────────────────────────┘  └─────────────────────────┘  └────────────────────────┘      │
│                                                                                              │
│  ┌────────────────────────┐  ┌─────────────────────────┐                                   │
│  │ trait AttachmentHost   │  │ struct MemoryHost       │                                   │
│  │ • attach / refresh     │  │ • attachments: RwLock   │                                   │
│  │ • detach (idempotent)  │  │ • call counters         │                                   │
│  └────────────────────────┘  └─────────────────────────┘                                   │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────────── RELATIONSHIPS ────────────────────────────────────────────┐
│                                                                                              │
│  Session ──parses──> Statement ──ATTACH/DETACH──> LifecycleController                       │
│     │                    │                              │                                   │
│     │                    └──mutation──> ReadOnlyGuard    ├──detects──> LayoutDetector        │
│     │                                                    ├──scans──> DirectoryScanner        │
│     │                                                    └──swaps──> CatalogRegistry         │
│     │                                                                                       │
│     └──bind──> Extension ──resolves──> DatabaseHandle ──> SchemaHandle ──> TableHandle      │
│                                                                              │              │
│                    InternalAttachmentManager <──ensure_attached──────────────┘              │
│                          │                                                                  │
│                          ├──resolves──> TableFormatReader ──> TableSnapshot                 │
│                          └──attaches──> AttachmentHost ("__dc_<db>_<id>_<schema>_<table>")  │
│                                                                                              │
└──────────────────────────────────────────────────────────────────────────────────────────────┘
*/
