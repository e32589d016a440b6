//! Store error types.

use thiserror::Error;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the database.
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    /// A unique constraint rejected the write.
    ///
    /// `constraint` names the violated constraint or unique index so callers
    /// can tell a case ID collision apart from other conflicts.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// Failed to execute a query.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),

    /// Migration directory not found in the current environment.
    #[error("migration directory not found; tried {tried}. Last error: {last_error}")]
    MigrationDirNotFound { tried: String, last_error: String },

    /// A stored row could not be mapped back into a domain value.
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

impl StoreError {
    /// Returns true if this is a unique violation on `constraint`.
    pub fn is_unique_violation_on(&self, constraint: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint: c } if c == constraint)
    }

    /// Maps a query error, lifting Postgres unique violations (SQLSTATE 23505)
    /// into [`StoreError::UniqueViolation`].
    pub(crate) fn from_query(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.code().as_deref() == Some("23505") {
                return StoreError::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or_default().to_string(),
                };
            }
        }
        StoreError::Query(e)
    }
}
