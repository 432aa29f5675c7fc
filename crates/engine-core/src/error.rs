use connectors::sql::base::error::DbError;
use model::pagination::page::PageError;
use planner::error::PlanError;
use thiserror::Error;

/// How a failed query should be reported to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// The request itself is malformed; resending it unchanged will fail again.
    BadRequest,
    /// The data source failed; its error is passed on unmodified.
    Backend,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("Unknown repository: {0}")]
    UnknownRepository(String),

    #[error(transparent)]
    Backend(#[from] DbError),
}

impl QueryError {
    pub fn kind(&self) -> QueryErrorKind {
        match self {
            QueryError::Plan(_) | QueryError::Page(_) | QueryError::UnknownRepository(_) => {
                QueryErrorKind::BadRequest
            }
            QueryError::Backend(_) => QueryErrorKind::Backend,
        }
    }
}
