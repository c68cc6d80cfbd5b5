//! Infrastructure error types shared by the services.

use sqlx::{Error as SqlxError, migrate::MigrateError};
use thiserror::Error;

/// Failure while configuring, reaching or migrating the database
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The configuration could not be read or is unusable
    #[error("invalid database configuration: {0}")]
    Configuration(String),

    /// The pool could not establish a connection
    #[error("failed to connect to the database: {0}")]
    Connection(#[source] SqlxError),

    /// A statement failed
    #[error("database query failed: {0}")]
    Query(#[source] SqlxError),

    /// Embedded migrations could not be applied
    #[error("database migration failed: {0}")]
    Migration(#[from] MigrateError),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
