use thiserror::Error;

pub mod connection;
pub mod migrations;

pub use connection::*;

/// Errors raised while setting up or reaching the SQLite store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    /// `initialize_database_pool` was called twice
    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    /// Repositories treat this as the signal to use in-memory storage
    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    /// DB_TYPE names a backend other than sqlite
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}
