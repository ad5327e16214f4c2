use rusqlite::ffi;
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Input rejected before it reached the database.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
        value: String,
    },

    #[error("an author cannot follow themselves")]
    SelfFollow,

    #[error("already following this author")]
    DuplicateFollow,

    #[error("group slug '{0}' is already taken")]
    DuplicateSlug(String),

    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn validation(field: &'static str, message: impl Into<String>, value: &str) -> Self {
        Self::Validation {
            field,
            message: message.into(),
            value: value.to_string(),
        }
    }

    /// True for the storage-constraint family: self-follow, duplicate follow,
    /// duplicate slug or username.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            Self::SelfFollow
                | Self::DuplicateFollow
                | Self::DuplicateSlug(_)
                | Self::DuplicateUsername(_)
        )
    }
}

/// Which constraint a failed statement tripped, read from SQLite's extended
/// result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    Check,
    Unique,
    ForeignKey,
}

pub(crate) fn violation(err: &rusqlite::Error) -> Option<Violation> {
    let rusqlite::Error::SqliteFailure(code, _) = err else {
        return None;
    };
    match code.extended_code {
        ffi::SQLITE_CONSTRAINT_CHECK => Some(Violation::Check),
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Some(Violation::Unique),
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Violation::ForeignKey),
        _ => None,
    }
}
