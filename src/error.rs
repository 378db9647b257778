use rusqlite::ErrorCode;
use thiserror::Error;

/// Marker that prefixes every legacy error payload.
pub const ERROR_MARKER: &str = "**ERROR**";

/// Machine-readable category of an [`AccessError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The database could not be opened or is unreadable.
    Connection,
    /// The statement was rejected by the engine.
    Statement,
    /// A caller-supplied table or view name is not in the live catalog.
    Identifier,
}

/// Error type for SQLite access operations
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("unable to open database {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{0}")]
    Statement(#[source] rusqlite::Error),

    #[error("no such table or view: {0}")]
    UnknownObject(String),
}

/// Result type alias for SQLite access operations
pub type Result<T> = std::result::Result<T, AccessError>;

impl AccessError {
    /// Classify an engine failure raised while a statement was running.
    ///
    /// File-level failures (unreadable, corrupt or not a database) are
    /// reported as connection errors even though SQLite only notices them
    /// once the first page is read.
    pub(crate) fn from_engine(target: &str, err: rusqlite::Error) -> Self {
        let file_level = matches!(
            err.sqlite_error_code(),
            Some(
                ErrorCode::CannotOpen
                    | ErrorCode::NotADatabase
                    | ErrorCode::DatabaseCorrupt
                    | ErrorCode::PermissionDenied
            )
        );
        if file_level {
            AccessError::Connection {
                target: target.to_string(),
                source: err,
            }
        } else {
            AccessError::Statement(err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AccessError::Connection { .. } => ErrorKind::Connection,
            AccessError::Statement(_) => ErrorKind::Statement,
            AccessError::UnknownObject(_) => ErrorKind::Identifier,
        }
    }

    /// Render the error in the marker-prefixed text form older callers
    /// display as a notice, e.g. `**ERROR**\nrun_query : no such table: X`.
    pub fn legacy_payload(&self, operation: &str) -> String {
        format!("{}\n{} : {}", ERROR_MARKER, operation, self)
    }
}

/// An option string (object kind, page action, detail) was not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised {what}: {value:?}")]
pub struct ParseOptionError {
    pub what: &'static str,
    pub value: String,
}

impl ParseOptionError {
    pub(crate) fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}

/// True when `text` is a legacy error payload rather than data.
pub fn is_error_payload(text: &str) -> bool {
    text.starts_with(ERROR_MARKER)
}
