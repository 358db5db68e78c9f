use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    InvalidArgument,
    Internal,
    PathNotFound,
    InvalidLayout,
    DuplicateName,
    NoSuchDatabase,
    NoSuchSchema,
    NoSuchTable,
    ReadOnlyViolation,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Every write rejection goes through here so the message always carries "read-only".
    pub fn read_only(database: &str, action: impl fmt::Display) -> Self {
        Error {
            kind: ErrorKind::ReadOnlyViolation,
            context: format!(
                "delta_classic database \"{}\" is read-only: {} is not allowed",
                database, action
            ),
        }
    }

    pub fn no_such_database(name: &str) -> Self {
        Error {
            kind: ErrorKind::NoSuchDatabase,
            context: format!("database \"{}\" is not attached", name),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: format!("JSON error: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
