//! Centralized error handling.
//!
//! Every database failure is classified into one of five outcomes before it
//! leaves the repository layer. Callers branch on [`AppError::kind`] and decide
//! for themselves whether a [`ErrorKind::Retryable`] outcome is worth another try.

use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;
use validator::ValidationErrors;

use crate::config::{
    SELF_FOLLOW_CONSTRAINT, UNIQUE_EMAIL_INDEX, UNIQUE_RELATIONSHIP_INDEX,
};

/// PostgreSQL SQLSTATE codes the repository distinguishes.
pub mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const SERIALIZATION_FAILURE: &str = "40001";
    pub const DEADLOCK_DETECTED: &str = "40P01";
    /// Raised by the `follow` / `unfollow` procedures when a row is missing.
    pub const NO_DATA_FOUND: &str = "P0002";
}

/// The five-way outcome taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidArgument,
    Retryable,
    Internal,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The transaction was aborted by a concurrent writer (or ran out of time)
    /// and left no trace; running it again may succeed.
    #[error("Transaction aborted, safe to retry: {0}")]
    Retryable(String),

    #[error("Database error")]
    Database(#[source] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AppError::Retryable(_) => ErrorKind::Retryable,
            AppError::Database(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable error code for callers
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::Retryable => "RETRYABLE",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Retryable
    }
}

/// Maps a SQLSTATE (and the violated constraint, if any) to a taxonomy bucket.
pub fn classify_sqlstate(code: Option<&str>, constraint: Option<&str>) -> ErrorKind {
    match code {
        Some(sqlstate::UNIQUE_VIOLATION) => ErrorKind::Conflict,
        Some(sqlstate::FOREIGN_KEY_VIOLATION) | Some(sqlstate::NO_DATA_FOUND) => {
            ErrorKind::NotFound
        }
        Some(sqlstate::SERIALIZATION_FAILURE) | Some(sqlstate::DEADLOCK_DETECTED) => {
            ErrorKind::Retryable
        }
        Some(sqlstate::CHECK_VIOLATION) if constraint == Some(SELF_FOLLOW_CONSTRAINT) => {
            ErrorKind::InvalidArgument
        }
        // Includes the non-negative counter checks: an underflow is a bug.
        _ => ErrorKind::Internal,
    }
}

fn conflict_subject(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(UNIQUE_EMAIL_INDEX) => "User with this email",
        Some(UNIQUE_RELATIONSHIP_INDEX) => "Relationship",
        _ => "Record",
    }
}

fn sqlx_error(err: &DbErr) -> Option<&sea_orm::sqlx::Error> {
    match err {
        DbErr::Conn(RuntimeErr::SqlxError(e))
        | DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e)) => Some(e),
        _ => None,
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(_) => return AppError::NotFound,
            DbErr::ConnectionAcquire(_) => return AppError::Retryable(err.to_string()),
            _ => {}
        }

        let classified = sqlx_error(&err)
            .and_then(|e| e.as_database_error())
            .map(|db| {
                let kind = classify_sqlstate(db.code().as_deref(), db.constraint());
                (kind, db.constraint().map(str::to_owned), db.message().to_owned())
            });

        let Some((kind, constraint, message)) = classified else {
            return AppError::Database(err);
        };

        match kind {
            ErrorKind::NotFound => AppError::NotFound,
            ErrorKind::Conflict => AppError::conflict(conflict_subject(constraint.as_deref())),
            ErrorKind::InvalidArgument => AppError::InvalidArgument(message),
            ErrorKind::Retryable => {
                tracing::debug!(%message, "transaction aborted by a concurrent writer");
                AppError::Retryable(message)
            }
            ErrorKind::Internal => AppError::Database(err),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::InvalidArgument(errors.to_string())
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_integrity_violations() {
        assert_eq!(
            classify_sqlstate(Some("23505"), Some(UNIQUE_EMAIL_INDEX)),
            ErrorKind::Conflict
        );
        assert_eq!(classify_sqlstate(Some("23503"), None), ErrorKind::NotFound);
        assert_eq!(classify_sqlstate(Some("P0002"), None), ErrorKind::NotFound);
    }

    #[test]
    fn classifies_concurrency_failures_as_retryable() {
        assert_eq!(classify_sqlstate(Some("40001"), None), ErrorKind::Retryable);
        assert_eq!(classify_sqlstate(Some("40P01"), None), ErrorKind::Retryable);
    }

    #[test]
    fn only_the_self_follow_check_is_an_invalid_argument() {
        assert_eq!(
            classify_sqlstate(Some("23514"), Some(SELF_FOLLOW_CONSTRAINT)),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            classify_sqlstate(Some("23514"), Some("users_follower_count_non_negative")),
            ErrorKind::Internal
        );
    }

    #[test]
    fn unknown_codes_are_internal() {
        assert_eq!(classify_sqlstate(Some("08006"), None), ErrorKind::Internal);
        assert_eq!(classify_sqlstate(None, None), ErrorKind::Internal);
    }

    #[test]
    fn record_not_found_maps_to_not_found() {
        let err = AppError::from(DbErr::RecordNotFound("users".to_string()));
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn driver_errors_keep_their_source() {
        let err = AppError::from(DbErr::Custom("socket closed".to_string()));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.code(), "INTERNAL_ERROR");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert!(source.unwrap_or_default().contains("socket closed"));
    }

    #[test]
    fn codes_follow_the_taxonomy() {
        assert_eq!(AppError::NotFound.code(), "NOT_FOUND");
        assert_eq!(AppError::conflict("Relationship").code(), "CONFLICT");
        assert_eq!(AppError::invalid_argument("x").code(), "INVALID_ARGUMENT");
        assert_eq!(AppError::Retryable("x".into()).code(), "RETRYABLE");
        assert_eq!(AppError::internal("x").code(), "INTERNAL_ERROR");
        assert!(AppError::Retryable("x".into()).is_retryable());
        assert!(!AppError::NotFound.is_retryable());
    }

    #[test]
    fn conflict_message_names_the_subject() {
        assert_eq!(
            AppError::conflict(conflict_subject(Some(UNIQUE_EMAIL_INDEX))).to_string(),
            "User with this email already exists"
        );
    }

    #[test]
    fn option_ext_maps_none_to_not_found() {
        let missing: Option<i32> = None;
        assert!(matches!(missing.ok_or_not_found(), Err(AppError::NotFound)));
        assert_eq!(Some(3).ok_or_not_found().ok(), Some(3));
    }
}
