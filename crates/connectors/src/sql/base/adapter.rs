use crate::sql::base::error::{ConnectorError, DbError};
use async_trait::async_trait;
use model::{core::value::Value, records::row::Row};
use planner::query::dialect::Dialect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseKind {
    MySql,
    Postgres,
}

/// A connected SQL database able to run rendered queries.
#[async_trait]
pub trait SqlAdapter: Send + Sync {
    async fn connect(url: &str) -> Result<Self, ConnectorError>
    where
        Self: Sized;

    /// Runs a query and converts every returned row.
    async fn query_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, DbError>;

    /// Runs a query whose first column of the first row is a count.
    async fn query_count(&self, sql: &str, params: Vec<Value>) -> Result<u64, DbError>;

    /// Round-trips a trivial statement to check the connection.
    async fn ping(&self) -> Result<(), DbError>;

    fn kind(&self) -> DatabaseKind;
    fn dialect(&self) -> &dyn Dialect;
}

/// Reads a count column that drivers may report as signed, unsigned or
/// decimal text.
pub(crate) fn count_from_value(value: &Value) -> Result<u64, DbError> {
    match value {
        Value::Int(n) if *n >= 0 => Ok(*n as u64),
        Value::Uint(n) => Ok(*n),
        Value::String(s) => s
            .parse::<u64>()
            .map_err(|_| DbError::UnexpectedResult(format!("count is not a number: {s}"))),
        other => Err(DbError::UnexpectedResult(format!(
            "count is not a non-negative integer: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_from_value() {
        assert_eq!(count_from_value(&Value::Int(3)).unwrap(), 3);
        assert_eq!(count_from_value(&Value::Uint(7)).unwrap(), 7);
        assert_eq!(count_from_value(&Value::String("12".into())).unwrap(), 12);
        assert!(count_from_value(&Value::Int(-1)).is_err());
        assert!(count_from_value(&Value::Null).is_err());
    }
}
