use crate::catalog::registry::CatalogRegistry;
use crate::core::error::{Error, Result};
use crate::query::ast::{MutationKind, MutationStatement, ObjectKind};

/// What happens to a mutation aimed at an attached database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Reject,
}

/// Rejects every write aimed at an attached database.
///
/// Works on the statement alone, so a database is protected whether or not
/// any of its tables has been materialized yet.
pub struct ReadOnlyGuard;

impl ReadOnlyGuard {
    pub fn verdict(kind: MutationKind) -> Verdict {
        match kind {
            MutationKind::Create
            | MutationKind::Drop
            | MutationKind::Alter
            | MutationKind::Insert
            | MutationKind::Update
            | MutationKind::Delete
            | MutationKind::Truncate
            | MutationKind::Merge
            | MutationKind::CreateIndex
            | MutationKind::CreateView => Verdict::Reject,
        }
    }

    /// Database a mutation writes into, or None when it stays in the current
    /// database and there is none.
    ///
    /// Database targets name the database itself and schema statements take
    /// `db.schema`. Everything else takes `db.schema.object`, or `x.object`
    /// where `x` is a database when one by that name is attached and a schema
    /// of the current database otherwise.
    pub fn target_database(
        statement: &MutationStatement,
        current: Option<&str>,
        registry: &CatalogRegistry,
    ) -> Option<String> {
        let parts = &statement.target.parts;
        let qualified_len = match statement.object {
            ObjectKind::Database => 1,
            ObjectKind::Schema => 2,
            _ => 3,
        };

        if parts.len() >= qualified_len {
            return parts.first().cloned();
        }
        if statement.object != ObjectKind::Schema && parts.len() == 2 && registry.contains(&parts[0]) {
            return Some(parts[0].clone());
        }
        current.map(str::to_string)
    }

    /// Ok when the statement does not touch an attached database
    pub fn check(
        statement: &MutationStatement,
        current: Option<&str>,
        registry: &CatalogRegistry,
    ) -> Result<()> {
        let Some(database) = Self::target_database(statement, current, registry) else {
            return Ok(());
        };
        let Ok(handle) = registry.get(&database) else {
            return Ok(());
        };
        match Self::verdict(statement.kind) {
            Verdict::Reject => {
                tracing::debug!(database = handle.name(), statement = %statement, "rejected write");
                Err(Error::read_only(handle.name(), statement))
            }
        }
    }
}
