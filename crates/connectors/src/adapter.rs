use crate::{
    error::AdapterError,
    executor::{QueryExecutor, SqlExecutor},
    sql::{base::adapter::SqlAdapter, mysql::adapter::MySqlAdapter, postgres::adapter::PgAdapter},
};
use planner::repository::Catalog;
use std::{fmt, str::FromStr, sync::Arc};

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    MySql,
    Postgres,
}

impl FromStr for Driver {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Driver::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Driver::Postgres),
            other => Err(AdapterError::UnsupportedDriver(other.to_string())),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::MySql => f.write_str("mysql"),
            Driver::Postgres => f.write_str("postgres"),
        }
    }
}

impl Driver {
    /// Guesses the driver from a connection string's scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let (scheme, _) = url.split_once("://")?;
        scheme.parse().ok()
    }
}

#[derive(Clone)]
pub enum Adapter {
    MySql(MySqlAdapter),
    Postgres(PgAdapter),
}

impl Adapter {
    pub async fn sql(driver: Driver, conn_str: &str) -> Result<Self, AdapterError> {
        match driver {
            Driver::MySql => {
                let adapter = MySqlAdapter::connect(conn_str).await?;
                Ok(Adapter::MySql(adapter))
            }
            Driver::Postgres => {
                let adapter = PgAdapter::connect(conn_str).await?;
                Ok(Adapter::Postgres(adapter))
            }
        }
    }

    pub fn get_sql(&self) -> &dyn SqlAdapter {
        match self {
            Adapter::MySql(adapter) => adapter,
            Adapter::Postgres(adapter) => adapter,
        }
    }

    /// Wraps the connection in an executor that resolves joins through
    /// `catalog`.
    pub fn into_executor(self, catalog: Catalog) -> Arc<dyn QueryExecutor> {
        match self {
            Adapter::MySql(adapter) => Arc::new(SqlExecutor::new(adapter, catalog)),
            Adapter::Postgres(adapter) => Arc::new(SqlExecutor::new(adapter, catalog)),
        }
    }
}
