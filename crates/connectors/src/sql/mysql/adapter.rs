use crate::sql::{
    base::{
        adapter::{DatabaseKind, SqlAdapter, count_from_value},
        error::{ConnectorError, DbError},
        row::DbRow,
    },
    mysql::params::MySqlParamStore,
};
use async_trait::async_trait;
use model::{core::value::Value, records::row::Row};
use mysql_async::{Opts, Pool, Row as MySqlRow, prelude::Queryable};
use planner::query::dialect::{self, Dialect};
use tracing::debug;

#[derive(Clone)]
pub struct MySqlAdapter {
    pool: Pool,
    dialect: dialect::MySql,
}

impl MySqlAdapter {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<MySqlRow>, DbError> {
        let mut conn = self.pool.get_conn().await?;
        let bindings = MySqlParamStore::from_values(params);
        debug!("Executing MySQL query: {sql}");
        Ok(conn.exec(sql, bindings.params()).await?)
    }
}

#[async_trait]
impl SqlAdapter for MySqlAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let opts = Opts::from_url(url).map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;
        let pool = Pool::new(opts);
        // The pool connects lazily; fail here rather than on the first query.
        pool.get_conn().await?;
        Ok(MySqlAdapter {
            pool,
            dialect: dialect::MySql,
        })
    }

    async fn query_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, DbError> {
        let rows = self.query(sql, &params).await?;
        Ok(rows.iter().map(|row| DbRow::MySqlRow(row).to_row()).collect())
    }

    async fn query_count(&self, sql: &str, params: Vec<Value>) -> Result<u64, DbError> {
        let rows = self.query(sql, &params).await?;
        let row = rows
            .first()
            .ok_or_else(|| DbError::UnexpectedResult("count query returned no rows".into()))?;
        count_from_value(&DbRow::MySqlRow(row).get_value(0))
    }

    async fn ping(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get_conn().await?;
        conn.ping().await?;
        Ok(())
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::MySql
    }

    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }
}
