use crate::sql::base::error::{ConnectorError, DbError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// Failed to initialize a data connector/adapter.
    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    /// Database-related error.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Unsupported driver error.
    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),
}
