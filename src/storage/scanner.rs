use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{catalog_key, Layout};
use crate::reader::table_format::TableFormatReader;
use crate::storage::layout::{child_directories, ChildDir};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredTable {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredSchema {
    pub name: String,
    pub path: PathBuf,
    pub tables: Vec<DiscoveredTable>,
}

/// Builds the schema → table map of an attachment root.
///
/// Only asks the reader whether a directory is a table; no snapshot is resolved here.
pub struct DirectoryScanner<'a> {
    pub reader: &'a dyn TableFormatReader,
    pub config: &'a Config,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(reader: &'a dyn TableFormatReader, config: &'a Config) -> Self {
        DirectoryScanner { reader, config }
    }

    pub fn scan(&self, root: &Path, layout: Layout) -> Result<Vec<DiscoveredSchema>> {
        let schemas = match layout {
            Layout::SingleSchema => vec![DiscoveredSchema {
                name: self.config.default_schema.clone(),
                path: root.to_path_buf(),
                tables: self.scan_tables(root)?,
            }],
            Layout::MultiSchema => {
                let mut schemas = Vec::new();
                for child in child_directories(root, self.config)? {
                    // A table sitting next to schema directories was already rejected by the detector
                    if self.reader.is_table(&child.path) {
                        continue;
                    }
                    let tables = self.scan_tables(&child.path)?;
                    schemas.push(DiscoveredSchema {
                        name: child.name,
                        path: child.path,
                        tables,
                    });
                }
                schemas
            }
        };

        ensure_unique(root, schemas.iter().map(|s| s.name.as_str()), "schema")?;
        Ok(schemas)
    }

    fn scan_tables(&self, dir: &Path) -> Result<Vec<DiscoveredTable>> {
        let tables: Vec<DiscoveredTable> = child_directories(dir, self.config)?
            .into_iter()
            .filter(|child| self.reader.is_table(&child.path))
            .map(|ChildDir { name, path }| DiscoveredTable { name, path })
            .collect();

        ensure_unique(dir, tables.iter().map(|t| t.name.as_str()), "table")?;
        Ok(tables)
    }
}

/// Catalog names are case-insensitive, so `Sales` and `sales` cannot share a namespace.
fn ensure_unique<'n>(dir: &Path, names: impl Iterator<Item = &'n str>, what: &str) -> Result<()> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for name in names {
        if let Some(previous) = seen.insert(catalog_key(name), name) {
            return Err(Error::new(
                ErrorKind::InvalidLayout,
                format!(
                    "{} names \"{}\" and \"{}\" collide in {}",
                    what,
                    previous,
                    name,
                    dir.display()
                ),
            ));
        }
    }
    Ok(())
}
