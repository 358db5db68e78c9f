use std::fmt;
use crate::core::types::ObjectName;

/// Statements the catalog cares about. Everything else is `PassThrough`.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Attach(AttachStatement),
    Detach(DetachStatement),
    Use(UseStatement),
    Mutation(MutationStatement),
    PassThrough,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachStatement {
    pub path: String,
    pub alias: Option<String>,
    pub or_replace: bool,
    pub if_not_exists: bool,
    pub db_type: Option<String>,
    pub options: Vec<AttachOption>,
}

/// `KEY [value]` inside the ATTACH option list; TYPE is lifted out into `db_type`
#[derive(Debug, Clone, PartialEq)]
pub struct AttachOption {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetachStatement {
    pub name: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UseStatement {
    pub target: ObjectName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutationStatement {
    pub kind: MutationKind,
    pub object: ObjectKind,
    pub target: ObjectName,
}

/// Closed set of statement kinds that would change an attached database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Drop,
    Alter,
    Insert,
    Update,
    Delete,
    Truncate,
    Merge,
    CreateIndex,
    CreateView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Database,
    Schema,
    Table,
    View,
    Index,
    Sequence,
    Macro,
    Function,
    Type,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MutationKind::Create => "CREATE",
            MutationKind::Drop => "DROP",
            MutationKind::Alter => "ALTER",
            MutationKind::Insert => "INSERT",
            MutationKind::Update => "UPDATE",
            MutationKind::Delete => "DELETE",
            MutationKind::Truncate => "TRUNCATE",
            MutationKind::Merge => "MERGE",
            MutationKind::CreateIndex => "CREATE INDEX",
            MutationKind::CreateView => "CREATE VIEW",
        }
    }
}

impl ObjectKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "SCHEMA" => Some(ObjectKind::Schema),
            "TABLE" => Some(ObjectKind::Table),
            "VIEW" => Some(ObjectKind::View),
            "INDEX" => Some(ObjectKind::Index),
            "SEQUENCE" => Some(ObjectKind::Sequence),
            "MACRO" => Some(ObjectKind::Macro),
            "FUNCTION" => Some(ObjectKind::Function),
            "TYPE" => Some(ObjectKind::Type),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Database => "DATABASE",
            ObjectKind::Schema => "SCHEMA",
            ObjectKind::Table => "TABLE",
            ObjectKind::View => "VIEW",
            ObjectKind::Index => "INDEX",
            ObjectKind::Sequence => "SEQUENCE",
            ObjectKind::Macro => "MACRO",
            ObjectKind::Function => "FUNCTION",
            ObjectKind::Type => "TYPE",
        }
    }
}

impl fmt::Display for MutationStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            MutationKind::Create | MutationKind::Drop | MutationKind::Alter => {
                write!(f, "{} {}", self.kind.as_str(), self.object.as_str())
            }
            MutationKind::Truncate => f.write_str("TRUNCATE TABLE"),
            kind => f.write_str(kind.as_str()),
        }
    }
}

impl AttachStatement {
    pub fn option(&self, key: &str) -> Option<&AttachOption> {
        self.options.iter().find(|o| o.key.eq_ignore_ascii_case(key))
    }
}
