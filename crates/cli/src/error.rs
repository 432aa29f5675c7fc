use connectors::{error::AdapterError, sql::base::error::DbError};
use engine_core::error::QueryError;
use model::pagination::page::PageError;
use planner::error::PlanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read the input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to deserialize the input file as JSON: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown repository: {0}")]
    UnknownRepository(String),

    #[error("Failed to plan the query: {0}")]
    Plan(#[from] PlanError),

    #[error("Invalid page request: {0}")]
    Page(#[from] PageError),

    #[error("Failed to run the query: {0}")]
    Query(#[from] QueryError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Connection error: {0}")]
    Adapter(#[from] AdapterError),
}
