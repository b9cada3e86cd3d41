// src/infrastructure/repositories/sqlite/error.rs

use crate::domain::error::DomainError;
use diesel::r2d2;
use diesel::result::Error as DieselError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DieselError),

    #[error("Connection pool error: {0}")]
    ConnectionPoolError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Repository operation failed: {0}")]
    OperationFailed(String),
}

pub type SqliteResult<T> = Result<T, SqliteRepositoryError>;

impl From<r2d2::PoolError> for SqliteRepositoryError {
    fn from(err: r2d2::PoolError) -> Self {
        SqliteRepositoryError::ConnectionPoolError(err.to_string())
    }
}

impl From<SqliteRepositoryError> for DomainError {
    fn from(err: SqliteRepositoryError) -> Self {
        match err {
            SqliteRepositoryError::DatabaseError(DieselError::DatabaseError(_, info)) => {
                DomainError::Store(format!("Database error: {}", info.message()))
            }
            SqliteRepositoryError::IoError(e) => DomainError::Store(format!("IO error: {}", e)),
            other => DomainError::Store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::r2d2::ConnectionManager;
    use diesel::sqlite::SqliteConnection;
    use std::time::Duration;

    fn checkout(pool: &r2d2::Pool<ConnectionManager<SqliteConnection>>) -> SqliteResult<()> {
        let _conn = pool.get()?;
        Ok(())
    }

    #[test]
    fn given_exhausted_pool_when_get_then_connection_pool_error() {
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_millis(50))
            .build(ConnectionManager::<SqliteConnection>::new(":memory:"))
            .unwrap();
        let _held = pool.get().unwrap();

        let err = checkout(&pool).unwrap_err();

        assert!(matches!(err, SqliteRepositoryError::ConnectionPoolError(_)));
        assert!(matches!(DomainError::from(err), DomainError::Store(_)));
    }
}
