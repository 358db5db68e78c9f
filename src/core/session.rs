use std::sync::Arc;
use crate::catalog::attachments::TableBinding;
use crate::catalog::lifecycle::{AttachOutcome, OnConflict};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::extension::Extension;
use crate::core::types::{default_database_name, normalize_root, AttachOptions, ObjectName};
use crate::query::ast::{AttachOption, AttachStatement, DetachStatement, Statement};
use crate::query::parser::StatementParser;

/// What a statement did to the catalog
#[derive(Debug, Clone, PartialEq)]
pub enum StatementOutcome {
    Attached { name: String, replaced: bool },
    Detached { name: String },
    Used { database: String },
    /// IF NOT EXISTS / IF EXISTS matched nothing to do
    Ignored,
    /// Not ours; the host engine runs it
    PassThrough,
}

/// One connection's view of the extension: the statement entry point plus a current database.
pub struct Session {
    extension: Arc<Extension>,
    parser: StatementParser,
    current_database: Option<String>,
}

impl Session {
    pub fn new(extension: Arc<Extension>) -> Self {
        Session {
            extension,
            parser: StatementParser::new(),
            current_database: None,
        }
    }

    pub fn extension(&self) -> &Arc<Extension> {
        &self.extension
    }

    pub fn current_database(&self) -> Option<&str> {
        self.current_database.as_deref()
    }

    pub fn execute(&mut self, sql: &str) -> Result<StatementOutcome> {
        let statement = self.parser.parse(sql)?;
        self.run(statement)
    }

    /// Runs a `;` separated script, stopping at the first failure
    pub fn execute_batch(&mut self, sql: &str) -> Result<Vec<StatementOutcome>> {
        let statements = self.parser.parse_batch(sql)?;
        statements.into_iter().map(|s| self.run(s)).collect()
    }

    /// Binds a table referenced as `table`, `schema.table`, `db.table` or `db.schema.table`
    pub fn bind(&self, name: &str) -> Result<TableBinding> {
        self.extension.bind_name(&ObjectName::parse(name), self.current_database())
    }

    fn run(&mut self, statement: Statement) -> Result<StatementOutcome> {
        match statement {
            Statement::Attach(attach) => self.attach(attach),
            Statement::Detach(detach) => self.detach(detach),
            Statement::Use(use_stmt) => {
                // Only our own databases are tracked here
                let Some(database) = use_stmt.target.first() else {
                    return Ok(StatementOutcome::PassThrough);
                };
                let handle = match self.extension.database(database) {
                    Ok(handle) => handle,
                    Err(_) => {
                        self.current_database = None;
                        return Ok(StatementOutcome::PassThrough);
                    }
                };
                if let Some(schema) = use_stmt.target.parts.get(1) {
                    handle.schema(schema)?;
                }
                self.current_database = Some(handle.name().to_string());
                Ok(StatementOutcome::Used { database: handle.name().to_string() })
            }
            Statement::Mutation(mutation) => {
                self.extension.check_mutation(&mutation, self.current_database())?;
                Ok(StatementOutcome::PassThrough)
            }
            Statement::PassThrough => Ok(StatementOutcome::PassThrough),
        }
    }

    fn attach(&mut self, attach: AttachStatement) -> Result<StatementOutcome> {
        let config = self.extension.config();
        match &attach.db_type {
            Some(t) if t.eq_ignore_ascii_case(&config.extension_type) => {}
            _ => return Ok(StatementOutcome::PassThrough),
        }

        let mut options = AttachOptions { pin_snapshot: config.pin_snapshot_by_default };
        for option in &attach.options {
            apply_option(&mut options, option, &attach)?;
        }

        let name = match &attach.alias {
            Some(alias) => alias.clone(),
            None => default_database_name(&normalize_root(&attach.path)).ok_or_else(|| Error::new(
                ErrorKind::InvalidArgument,
                format!("cannot derive a database name from \"{}\"", attach.path),
            ))?,
        };

        let on_conflict = if attach.or_replace {
            OnConflict::Replace
        } else if attach.if_not_exists {
            OnConflict::Ignore
        } else {
            OnConflict::Error
        };

        match self.extension.attach_with(&name, &attach.path, options, on_conflict)? {
            AttachOutcome::Attached(handle) => Ok(StatementOutcome::Attached {
                name: handle.name().to_string(),
                replaced: false,
            }),
            AttachOutcome::Replaced(handle) => Ok(StatementOutcome::Attached {
                name: handle.name().to_string(),
                replaced: true,
            }),
            AttachOutcome::Existing(_) => Ok(StatementOutcome::Ignored),
        }
    }

    fn detach(&mut self, detach: DetachStatement) -> Result<StatementOutcome> {
        let detached = if detach.if_exists {
            self.extension.detach_if_exists(&detach.name)?
        } else {
            self.extension.detach(&detach.name)?;
            true
        };
        if !detached {
            return Ok(StatementOutcome::Ignored);
        }
        if self.current_database.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(&detach.name)) {
            self.current_database = None;
        }
        Ok(StatementOutcome::Detached { name: detach.name })
    }
}

fn apply_option(options: &mut AttachOptions, option: &AttachOption, attach: &AttachStatement) -> Result<()> {
    let key = option.key.to_ascii_uppercase();
    match key.as_str() {
        "PIN_SNAPSHOT" => {
            options.pin_snapshot = flag_value(option)?;
        }
        "READ_ONLY" => {
            if !flag_value(option)? {
                return Err(Error::read_only(&attach_name(attach), "READ_ONLY false"));
            }
        }
        "READ_WRITE" => {
            if flag_value(option)? {
                return Err(Error::read_only(&attach_name(attach), "READ_WRITE"));
            }
        }
        "ACCESS_MODE" => {
            let mode = option.value.as_deref().unwrap_or_default();
            if !mode.eq_ignore_ascii_case("read_only") && !mode.eq_ignore_ascii_case("automatic") {
                return Err(Error::read_only(&attach_name(attach), format!("ACCESS_MODE {}", mode)));
            }
        }
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("unrecognized ATTACH option \"{}\" for delta_classic", option.key),
            ));
        }
    }
    Ok(())
}

/// A bare flag means true
fn flag_value(option: &AttachOption) -> Result<bool> {
    let Some(value) = option.value.as_deref() else {
        return Ok(true);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        other => Err(Error::new(
            ErrorKind::InvalidArgument,
            format!("option {} expects a boolean, got \"{}\"", option.key, other),
        )),
    }
}

fn attach_name(attach: &AttachStatement) -> String {
    attach.alias.clone()
        .or_else(|| default_database_name(&normalize_root(&attach.path)))
        .unwrap_or_else(|| attach.path.clone())
}
