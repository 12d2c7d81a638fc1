//! Conversions from external infrastructure errors into domain errors.

use jobsync_common::CryptoError;
use jobsync_domain::JobSyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// SQLite extended result code for `SQLITE_CONSTRAINT_UNIQUE`.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
/// SQLite extended result code for `SQLITE_CONSTRAINT_PRIMARYKEY`.
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
/// SQLite extended result code for `SQLITE_CONSTRAINT_FOREIGNKEY`.
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub JobSyncError);

impl From<InfraError> for JobSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<JobSyncError> for InfraError {
    fn from(value: JobSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoJobSyncError {
    fn into_jobsync(self) -> JobSyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → JobSyncError */
/* -------------------------------------------------------------------------- */

impl IntoJobSyncError for SqlError {
    fn into_jobsync(self) -> JobSyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        fn looks_like_wrong_key(message: &str) -> bool {
            let lower = message.to_ascii_lowercase();
            lower.contains("not a database") || lower.contains("encrypted")
        }

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => JobSyncError::Database("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        JobSyncError::Database("database is locked".into())
                    }
                    (
                        ErrorCode::ConstraintViolation,
                        SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY,
                    ) => JobSyncError::Conflict(format!("unique constraint violation: {message}")),
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_FOREIGNKEY) => {
                        JobSyncError::NotFound(format!("foreign key constraint violation: {message}"))
                    }
                    (_, _) if looks_like_wrong_key(&message) => JobSyncError::Security(
                        "SQLCipher key rejected or database not encrypted".into(),
                    ),
                    _ => JobSyncError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => JobSyncError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                JobSyncError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                JobSyncError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => JobSyncError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => JobSyncError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_jobsync())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → JobSyncError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        let message = value.to_string();
        let lower = message.to_ascii_lowercase();
        if lower.contains("not a database") || lower.contains("encrypted") {
            return InfraError(JobSyncError::Security(
                "SQLCipher key rejected or database not encrypted".into(),
            ));
        }
        InfraError(JobSyncError::Database(format!("connection pool error: {message}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → JobSyncError */
/* -------------------------------------------------------------------------- */

impl IntoJobSyncError for HttpError {
    fn into_jobsync(self) -> JobSyncError {
        if self.is_builder() {
            return JobSyncError::Config(format!("invalid HTTP client configuration: {self}"));
        }
        if self.is_timeout() {
            return JobSyncError::Network("HTTP request timed out".into());
        }
        if self.is_connect() {
            return JobSyncError::Network("HTTP connection failure".into());
        }
        JobSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_jobsync())
    }
}

/* -------------------------------------------------------------------------- */
/* Serialization and crypto errors → JobSyncError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(JobSyncError::Config(format!("invalid JSON: {value}")))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(JobSyncError::Config(format!("invalid TOML: {value}")))
    }
}

impl From<CryptoError> for InfraError {
    fn from(value: CryptoError) -> Self {
        match value {
            CryptoError::InvalidKey(reason) => {
                InfraError(JobSyncError::Config(format!("invalid encryption key: {reason}")))
            }
            other => InfraError(JobSyncError::Security(other.to_string())),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use rusqlite::Error as SqlError;

    use super::*;

    fn sqlite_failure(code: ErrorCode, extended_code: i32, message: &str) -> SqlError {
        SqlError::SqliteFailure(FfiError { code, extended_code }, Some(message.into()))
    }

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let err = sqlite_failure(ErrorCode::DatabaseBusy, 5, "database is locked");

        let mapped: JobSyncError = InfraError::from(err).into();
        match mapped {
            JobSyncError::Database(msg) => {
                assert!(msg.contains("busy") || msg.contains("locked"));
            }
            other => panic!("expected database error, got {:?}", other),
        }
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = sqlite_failure(
            ErrorCode::ConstraintViolation,
            SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: job_history.job_id, job_history.version",
        );

        let mapped: JobSyncError = InfraError::from(err).into();
        assert!(matches!(mapped, JobSyncError::Conflict(msg) if msg.contains("job_history")));
    }

    #[test]
    fn foreign_key_violation_maps_to_not_found() {
        let err = sqlite_failure(
            ErrorCode::ConstraintViolation,
            SQLITE_CONSTRAINT_FOREIGNKEY,
            "FOREIGN KEY constraint failed",
        );

        let mapped: JobSyncError = InfraError::from(err).into();
        assert!(matches!(mapped, JobSyncError::NotFound(_)));
    }

    #[test]
    fn crypto_key_error_maps_to_config() {
        let mapped: JobSyncError = InfraError::from(CryptoError::InvalidKey("short".into())).into();
        assert!(matches!(mapped, JobSyncError::Config(_)));

        let mapped: JobSyncError =
            InfraError::from(CryptoError::DecryptFailed("tag mismatch")).into();
        assert!(matches!(mapped, JobSyncError::Security(_)));
    }
}
