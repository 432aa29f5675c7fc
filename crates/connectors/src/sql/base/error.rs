use planner::query::renderer::RenderError;
use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Any Postgres driver error.
    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Any MySQL driver error.
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    /// A named parameter had no binding, or the plan could not be rendered.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// An error occurred while building a SQL query.
    #[error("Query build error: {0}")]
    QueryBuildError(String),

    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),
}

/// Errors happening during adapter or connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Invalid connection string: {0}")]
    InvalidUrl(String),

    #[error("Postgres connection failed: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("MySQL connection failed: {0}")]
    MySql(#[from] mysql_async::Error),
}
