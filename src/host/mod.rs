pub mod memory;

use std::path::PathBuf;
use crate::core::error::Result;
use crate::reader::table_format::TableSnapshot;

/// Everything the host engine needs to materialize one hidden attachment.
#[derive(Debug, Clone)]
pub struct InternalAttachment {
    pub name: String,
    pub table_path: PathBuf,
    pub pin_snapshot: bool,
    pub snapshot: TableSnapshot,
}

/// The host engine's native attachment surface.
///
/// Implementations are called from query threads and must be thread safe.
/// `detach` is idempotent: it reports whether something was removed.
pub trait AttachmentHost: Send + Sync {
    fn attach(&self, attachment: &InternalAttachment) -> Result<()>;

    fn refresh(&self, name: &str, snapshot: &TableSnapshot) -> Result<()>;

    fn detach(&self, name: &str) -> Result<bool>;

    fn attachment_names(&self) -> Vec<String>;
}
