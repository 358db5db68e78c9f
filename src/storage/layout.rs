use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Layout;
use crate::reader::table_format::TableFormatReader;

/// Immediate child directory of an attachment root or schema directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildDir {
    pub name: String,
    pub path: PathBuf,
}

/// Visible child directories of `dir`, sorted by name.
///
/// Hidden entries, the log directory and anything that is not a directory are skipped.
pub fn child_directories(dir: &Path, config: &Config) -> Result<Vec<ChildDir>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(dir = %dir.display(), "skipping directory entry with non UTF-8 name");
            continue;
        };
        if config.is_hidden(&name) || name == config.log_dir_name {
            continue;
        }
        // Follows symlinks, so linked table directories count
        if !entry.path().is_dir() {
            continue;
        }
        children.push(ChildDir { path: entry.path(), name });
    }
    children.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(children)
}

/// Classifies an attachment root as single- or multi-schema
pub struct LayoutDetector<'a> {
    pub reader: &'a dyn TableFormatReader,
    pub config: &'a Config,
}

impl<'a> LayoutDetector<'a> {
    pub fn new(reader: &'a dyn TableFormatReader, config: &'a Config) -> Self {
        LayoutDetector { reader, config }
    }

    pub fn detect(&self, root: &Path) -> Result<Layout> {
        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(Error::new(
                    ErrorKind::PathNotFound,
                    format!("attachment root {} is not a directory", root.display()),
                ));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::new(
                    ErrorKind::PathNotFound,
                    format!("attachment root {} does not exist", root.display()),
                ));
            }
            Err(e) => {
                return Err(Error::new(
                    ErrorKind::PathNotFound,
                    format!("attachment root {} is unreadable: {}", root.display(), e),
                ));
            }
        }

        if self.reader.is_table(root) {
            return Err(Error::new(
                ErrorKind::InvalidLayout,
                format!(
                    "{} is itself a table; attach the directory that contains it",
                    root.display()
                ),
            ));
        }

        let children = child_directories(root, self.config).map_err(|e| Error::new(
            ErrorKind::PathNotFound,
            format!("attachment root {} is unreadable: {}", root.display(), e.context),
        ))?;
        if children.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidLayout,
                format!("attachment root {} is empty", root.display()),
            ));
        }

        let mut direct_tables = Vec::new();
        let mut schema_wrappers = Vec::new();
        for child in &children {
            if self.reader.is_table(&child.path) {
                direct_tables.push(child.name.as_str());
            } else if self.wraps_tables(&child.path)? {
                schema_wrappers.push(child.name.as_str());
            }
        }

        if !direct_tables.is_empty() && !schema_wrappers.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidLayout,
                format!(
                    "attachment root {} mixes tables ({}) with schema directories ({})",
                    root.display(),
                    direct_tables.join(", "),
                    schema_wrappers.join(", ")
                ),
            ));
        }

        if direct_tables.is_empty() {
            Ok(Layout::MultiSchema)
        } else {
            Ok(Layout::SingleSchema)
        }
    }

    fn wraps_tables(&self, dir: &Path) -> Result<bool> {
        let grandchildren = match child_directories(dir, self.config) {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                return Ok(false);
            }
        };
        Ok(grandchildren.iter().any(|c| self.reader.is_table(&c.path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::delta_log::DeltaLogReader;
    use tempfile::TempDir;

    fn make_table(path: &Path) {
        fs::create_dir_all(path.join("_delta_log")).unwrap();
    }

    fn detect(root: &Path) -> Result<Layout> {
        let reader = DeltaLogReader::default();
        let config = Config::default();
        LayoutDetector::new(&reader, &config).detect(root)
    }

    #[test]
    fn direct_tables_are_single_schema() {
        let dir = TempDir::new().unwrap();
        make_table(&dir.path().join("table_a"));
        make_table(&dir.path().join("table_b"));
        fs::create_dir_all(dir.path().join("scratch")).unwrap();
        assert_eq!(detect(dir.path()).unwrap(), Layout::SingleSchema);
    }

    #[test]
    fn wrapped_tables_are_multi_schema() {
        let dir = TempDir::new().unwrap();
        make_table(&dir.path().join("schema1").join("table_x"));
        make_table(&dir.path().join("schema2").join("table_z"));
        assert_eq!(detect(dir.path()).unwrap(), Layout::MultiSchema);
    }

    #[test]
    fn mixed_root_is_ambiguous() {
        let dir = TempDir::new().unwrap();
        make_table(&dir.path().join("table_a"));
        make_table(&dir.path().join("schema1").join("table_x"));
        assert_eq!(detect(dir.path()).unwrap_err().kind, ErrorKind::InvalidLayout);
    }

    #[test]
    fn missing_and_empty_roots_fail() {
        let dir = TempDir::new().unwrap();
        assert_eq!(detect(&dir.path().join("nope")).unwrap_err().kind, ErrorKind::PathNotFound);
        assert_eq!(detect(dir.path()).unwrap_err().kind, ErrorKind::InvalidLayout);
    }

    #[test]
    fn hidden_directories_do_not_count() {
        let dir = TempDir::new().unwrap();
        make_table(&dir.path().join("_staging").join("t"));
        make_table(&dir.path().join(".trash"));
        make_table(&dir.path().join("table_a"));
        assert_eq!(detect(dir.path()).unwrap(), Layout::SingleSchema);
    }

    #[test]
    fn table_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        make_table(dir.path());
        assert_eq!(detect(dir.path()).unwrap_err().kind, ErrorKind::InvalidLayout);
    }
}
