//! Error types for the school records model, its storage and the reports.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The entity tables known to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Course,
    Student,
    Teacher,
    ScheduleSlot,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Course => "course",
            EntityKind::Student => "student",
            EntityKind::Teacher => "teacher",
            EntityKind::ScheduleSlot => "schedule slot",
        };
        f.write_str(name)
    }
}

/// Errors raised while navigating or mutating the in-memory entity graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A handle does not point at any registered entity
    #[error("Unknown {kind} handle #{index}")]
    UnknownEntity { kind: EntityKind, index: usize },

    /// A wall-clock time could not be built from its components
    #[error("Invalid time of day {hour:02}:{minute:02}:{second:02}")]
    InvalidTime { hour: u32, minute: u32, second: u32 },
}

/// Errors raised by a storage collaborator.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// The SQLite engine rejected a statement or transaction
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    /// The connection lock was poisoned by a panicking holder
    #[error("Database connection lock poisoned")]
    LockPoisoned,

    /// An entity referenced another one that has no identity yet
    #[error("Referenced {kind} has no identity")]
    MissingIdentity { kind: EntityKind },

    /// A stored foreign key points at a row that does not exist
    #[error("Dangling reference to {kind} #{id}")]
    DanglingReference { kind: EntityKind, id: i64 },

    /// The in-memory graph handed to the store is inconsistent
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sqlite {
            message: err.to_string(),
        }
    }
}

/// Errors raised while exporting a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The destination (or its temporary sibling) could not be created or written
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV writer failed to serialise a record
    #[error("CSV error on {}: {message}", .path.display())]
    Csv { path: PathBuf, message: String },

    /// The root entity handed to `export` is absent or unknown
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Two jobs in the same batch target the same destination
    #[error("Destination {} is used by more than one report", .path.display())]
    DuplicatePath { path: PathBuf },
}

impl ReportError {
    /// Returns true if this error was caused by the caller's arguments rather than the file system.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            ReportError::InvalidArgument { .. } | ReportError::DuplicatePath { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ModelError> for ReportError {
    fn from(err: ModelError) -> Self {
        ReportError::InvalidArgument {
            message: err.to_string(),
        }
    }
}

/// Errors raised while loading the application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Unknown log level `{level}`")]
    LogLevel { level: String },
}
