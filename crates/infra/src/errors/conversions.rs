//! Conversions from external infrastructure errors into domain errors.

use fflbro_common::error::{ErrorClassification, ErrorSeverity};
use fflbro_common::storage::StorageError;
use fflbro_domain::FflBroError;
use rusqlite::Error as SqlError;
use thiserror::Error;
use tracing::{debug, warn};

const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(pub FflBroError);

impl From<InfraError> for FflBroError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<FflBroError> for InfraError {
    fn from(value: FflBroError) -> Self {
        InfraError(value)
    }
}

/// Constraint failures that repositories translate with call-site context
/// (which id collided, which reference dangled).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    Unique,
    ForeignKey,
}

/// Classify a storage error as a uniqueness or foreign-key violation.
pub fn constraint_violation(err: &StorageError) -> Option<ConstraintViolation> {
    match err {
        StorageError::Rusqlite(SqlError::SqliteFailure(failure, _)) => match failure.extended_code {
            SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => {
                Some(ConstraintViolation::Unique)
            }
            SQLITE_CONSTRAINT_FOREIGNKEY => Some(ConstraintViolation::ForeignKey),
            _ => None,
        },
        _ => None,
    }
}

trait IntoFflBroError {
    fn into_fflbro(self) -> FflBroError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → FflBroError */
/* -------------------------------------------------------------------------- */

impl IntoFflBroError for SqlError {
    fn into_fflbro(self) -> FflBroError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => FflBroError::Database("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        FflBroError::Database("database is locked".into())
                    }
                    (
                        ErrorCode::ConstraintViolation,
                        SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY,
                    ) => FflBroError::AlreadyExists(format!("unique constraint violation: {message}")),
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_FOREIGNKEY) => {
                        FflBroError::Database("foreign key constraint violation".into())
                    }
                    _ => FflBroError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => FflBroError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                FflBroError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                FflBroError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => FflBroError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => FflBroError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_fflbro())
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → FflBroError */
/* -------------------------------------------------------------------------- */

impl IntoFflBroError for StorageError {
    fn into_fflbro(self) -> FflBroError {
        log_storage_error(&self);
        let retryable = self.is_retryable();
        match self {
            StorageError::Rusqlite(err) => err.into_fflbro(),
            StorageError::InvalidConfig(message) => FflBroError::Config(message),
            StorageError::SchemaVersionMismatch { expected, found } => FflBroError::Database(
                format!("database schema version {found} is newer than supported version {expected}"),
            ),
            other if retryable => FflBroError::Database(format!("transient: {other}")),
            other => FflBroError::Database(other.to_string()),
        }
    }
}

fn log_storage_error(err: &StorageError) {
    if err.is_critical() {
        tracing::error!(error = %err, severity = %err.severity(), "critical storage error");
    } else if err.is_retryable() {
        warn!(error = %err, severity = %err.severity(), "transient storage error");
    } else if err.severity() >= ErrorSeverity::Error {
        debug!(error = %err, "storage error");
    }
}

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        InfraError(value.into_fflbro())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → FflBroError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(FflBroError::Database(format!("invalid JSON column: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use rusqlite::ffi::{Error as FfiError, ErrorCode};

    use super::*;

    fn failure(code: ErrorCode, extended_code: i32) -> SqlError {
        SqlError::SqliteFailure(FfiError { code, extended_code }, Some("boom".into()))
    }

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let err = FflBroError::from(InfraError::from(failure(ErrorCode::DatabaseBusy, 5)));
        assert_eq!(err, FflBroError::Database("database is busy".into()));
    }

    #[test]
    fn unique_violation_maps_to_already_exists() {
        let err = FflBroError::from(InfraError::from(failure(
            ErrorCode::ConstraintViolation,
            SQLITE_CONSTRAINT_UNIQUE,
        )));
        assert!(matches!(err, FflBroError::AlreadyExists(_)));
    }

    #[test]
    fn constraint_classification_reads_extended_codes() {
        let unique = StorageError::from(failure(ErrorCode::ConstraintViolation, 1555));
        let fk = StorageError::from(failure(ErrorCode::ConstraintViolation, 787));
        let check = StorageError::from(failure(ErrorCode::ConstraintViolation, 275));
        assert_eq!(constraint_violation(&unique), Some(ConstraintViolation::Unique));
        assert_eq!(constraint_violation(&fk), Some(ConstraintViolation::ForeignKey));
        assert_eq!(constraint_violation(&check), None);
        assert_eq!(constraint_violation(&StorageError::PoolExhausted), None);
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let err = FflBroError::from(InfraError::from(SqlError::QueryReturnedNoRows));
        assert!(matches!(err, FflBroError::NotFound(_)));
    }

    #[test]
    fn transient_storage_errors_are_marked() {
        let exhausted = FflBroError::from(InfraError::from(StorageError::PoolExhausted));
        let timeout = FflBroError::from(InfraError::from(StorageError::Timeout(5)));
        assert_eq!(exhausted, FflBroError::Database(format!("transient: {}", StorageError::PoolExhausted)));
        assert_eq!(timeout, FflBroError::Database("transient: Connection timeout after 5s".into()));

        let query = FflBroError::from(InfraError::from(StorageError::Query("bad sql".into())));
        assert_eq!(query, FflBroError::Database(StorageError::Query("bad sql".into()).to_string()));
    }

    #[test]
    fn storage_config_errors_map_to_config() {
        let err = FflBroError::from(InfraError::from(StorageError::InvalidConfig("size".into())));
        assert_eq!(err, FflBroError::Config("size".into()));
    }
}
