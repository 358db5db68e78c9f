use std::fmt;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use uuid::Uuid;

/// Prefix of every hidden per-table attachment created in the host engine.
pub const RESERVED_PREFIX: &str = "__dc_";

pub fn is_reserved_name(name: &str) -> bool {
    name.get(..RESERVED_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(RESERVED_PREFIX))
}

/// Case-insensitive key for catalog maps
pub fn catalog_key(name: &str) -> String {
    name.to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    SingleSchema,  // children of the root are tables
    MultiSchema,   // children of the root are schemas holding tables
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Layout::SingleSchema => f.write_str("single_schema"),
            Layout::MultiSchema => f.write_str("multi_schema"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachOptions {
    pub pin_snapshot: bool,
}

/// Identity of one DatabaseHandle; never reused across attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(pub Uuid);

impl HandleId {
    pub fn new() -> Self {
        HandleId(Uuid::new_v4())
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Dotted object reference as written in a statement: `table`, `schema.table` or `db.schema.table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName {
    pub parts: Vec<String>,
}

impl ObjectName {
    pub fn new(parts: Vec<String>) -> Self {
        ObjectName { parts }
    }

    pub fn parse(input: &str) -> Self {
        ObjectName {
            parts: input.split('.').map(|p| p.trim().trim_matches('"').to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.parts.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

/// Strip trailing separators, keeping a bare root intact.
pub fn normalize_root(path: &str) -> PathBuf {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() && !path.is_empty() {
        return PathBuf::from(&path[..1]);
    }
    PathBuf::from(trimmed)
}

/// Name used when ATTACH has no AS clause: the last path component.
pub fn default_database_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
