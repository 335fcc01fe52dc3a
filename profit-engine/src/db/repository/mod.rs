//! Repository Module
//!
//! Read access to the ledger tables, plus the inserts used to seed them.
//! All functions are tenant-scoped free functions over a `SqlitePool`.

pub mod inventory;
pub mod purchase;
pub mod sale;
pub mod waste;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".into()),
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Reject negative or non-finite amounts before they reach the ledger
fn validate_amount(value: f64, field_name: &str) -> RepoResult<()> {
    if !value.is_finite() {
        return Err(RepoError::Validation(format!(
            "{} must be a finite number",
            field_name
        )));
    }
    if value < 0.0 {
        return Err(RepoError::Validation(format!(
            "{} must be non-negative",
            field_name
        )));
    }
    Ok(())
}
