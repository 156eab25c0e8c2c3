//! Database error type.

use thiserror::Error;

/// Errors returned by the database layer.
///
/// Driver failures are passed through untouched in [`DbError::Sqlx`].
#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("unsupported database dialect: {0}")]
    UnsupportedDialect(String),

    #[error("connection url scheme `{scheme}` does not match dialect `{dialect}`")]
    DialectMismatch { dialect: String, scheme: String },

    #[error("database connection is not open")]
    NotConnected,
}
