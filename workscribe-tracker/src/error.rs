//! Error types for the tracker engine

use crate::types::EntityKind;
use rusqlite::ErrorCode;
use thiserror::Error;
use workscribe_config::ConfigError;

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors that can occur in tracker operations
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Referenced entity does not exist, or belongs to another organization
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// Operation is illegal in the entity's current state
    #[error("conflict on {entity} '{id}': {reason}")]
    Conflict {
        entity: EntityKind,
        id: String,
        reason: String,
    },

    /// Exclusive access could not be obtained in time; safe to retry
    #[error("contention on {resource} after {waited_ms}ms")]
    Contention { resource: String, waited_ms: u64 },

    /// Caller supplied malformed or inconsistent input
    #[error("invalid value for {field}: {message}")]
    InvalidArgument { field: String, message: String },

    /// Store error
    #[error("database error: {0}")]
    Database(rusqlite::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A blocking store task panicked or was cancelled
    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Coarse classification surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Contention,
    InvalidArgument,
    Internal,
}

/// How loudly an error should be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Expected outcome of a caller mistake or a lost race
    Warning,
    /// Operation failed but the store is intact
    Error,
    /// Store or runtime is unhealthy
    Critical,
}

impl TrackerError {
    /// Create a not found error
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a conflict error
    pub fn conflict(entity: EntityKind, id: impl ToString, reason: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a contention error
    pub fn contention(resource: impl Into<String>, waited_ms: u64) -> Self {
        Self::Contention {
            resource: resource.into(),
            waited_ms,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Contention { .. } => ErrorKind::Contention,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Database(_) | Self::Json(_) | Self::Io(_) | Self::Config(_) | Self::Join(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Contention { .. })
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.kind() {
            ErrorKind::NotFound
            | ErrorKind::Conflict
            | ErrorKind::Contention
            | ErrorKind::InvalidArgument => ErrorSeverity::Warning,
            ErrorKind::Internal => match self {
                Self::Database(_) | Self::Join(_) => ErrorSeverity::Critical,
                _ => ErrorSeverity::Error,
            },
        }
    }
}

impl From<rusqlite::Error> for TrackerError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                Self::contention("database", 0)
            }
            Some(ErrorCode::ConstraintViolation) => constraint_conflict(&err),
            _ => Self::Database(err),
        }
    }
}

/// Conflict for a violated constraint, naming the table and columns involved.
///
/// SQLite reports `UNIQUE constraint failed: sprints.project_id` style
/// messages; constraints without a column list (foreign keys) fall back to
/// [`EntityKind::Record`].
fn constraint_conflict(err: &rusqlite::Error) -> TrackerError {
    let message = match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => message.as_str(),
        _ => "",
    };
    let columns = message
        .split_once(": ")
        .map(|(_, columns)| columns.trim())
        .unwrap_or_default();
    let entity = columns
        .split_once('.')
        .map(|(table, _)| EntityKind::from_table(table))
        .unwrap_or(EntityKind::Record);
    let id = if columns.is_empty() { message } else { columns };
    TrackerError::Conflict {
        entity,
        id: id.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackerError::not_found(EntityKind::Task, "abc123");
        assert_eq!(err.to_string(), "task not found: abc123");
    }

    #[test]
    fn test_only_contention_is_retryable() {
        assert!(TrackerError::contention("project P1", 5000).is_retryable());
        assert!(!TrackerError::conflict(EntityKind::Sprint, "S1", "already active").is_retryable());
        assert!(!TrackerError::invalid_argument("position", "out of range").is_retryable());
    }

    #[test]
    fn test_kinds_and_severity() {
        let err = TrackerError::conflict(EntityKind::Sprint, "S1", "another sprint is active");
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = TrackerError::Database(rusqlite::Error::InvalidQuery);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_busy_maps_to_contention() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(TrackerError::from(busy).is_retryable());

        let constraint = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            Some("UNIQUE constraint failed".into()),
        );
        assert_eq!(TrackerError::from(constraint).kind(), ErrorKind::Conflict);
    }

    fn sqlite_failure(code: i32, message: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), Some(message.to_string()))
    }

    #[test]
    fn test_constraint_violation_names_the_table() {
        let err = TrackerError::from(sqlite_failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: sprints.project_id",
        ));
        match err {
            TrackerError::Conflict { entity, id, .. } => {
                assert_eq!(entity, EntityKind::Sprint);
                assert_eq!(id, "sprints.project_id");
            }
            other => panic!("expected conflict, got {other:?}"),
        }

        let err = TrackerError::from(sqlite_failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            "FOREIGN KEY constraint failed",
        ));
        match err {
            TrackerError::Conflict { entity, id, .. } => {
                assert_eq!(entity, EntityKind::Record);
                assert_eq!(id, "FOREIGN KEY constraint failed");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }
}
