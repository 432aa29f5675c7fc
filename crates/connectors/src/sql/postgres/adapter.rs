use crate::sql::{
    base::{
        adapter::{DatabaseKind, SqlAdapter, count_from_value},
        error::{ConnectorError, DbError},
        row::DbRow,
    },
    postgres::{params::PgParamStore, utils::connect_client},
};
use async_trait::async_trait;
use model::{core::value::Value, records::row::Row};
use planner::query::dialect::{self, Dialect};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::Client;
use tracing::debug;

#[derive(Clone)]
pub struct PgAdapter {
    client: Arc<RwLock<Client>>,
    dialect: dialect::Postgres,
}

impl PgAdapter {
    async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<tokio_postgres::Row>, DbError> {
        let client = self.client.read().await;
        let statement = client.prepare(sql).await?;
        let bindings = PgParamStore::for_types(params, statement.params());
        debug!("Executing Postgres query: {sql}");
        Ok(client.query(&statement, &bindings.as_refs()).await?)
    }
}

#[async_trait]
impl SqlAdapter for PgAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let client = Arc::new(RwLock::new(connect_client(url).await?));
        Ok(PgAdapter {
            client,
            dialect: dialect::Postgres,
        })
    }

    async fn query_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, DbError> {
        let rows = self.query(sql, params).await?;
        Ok(rows.iter().map(|row| DbRow::PostgresRow(row).to_row()).collect())
    }

    async fn query_count(&self, sql: &str, params: Vec<Value>) -> Result<u64, DbError> {
        let rows = self.query(sql, params).await?;
        let row = rows
            .first()
            .ok_or_else(|| DbError::UnexpectedResult("count query returned no rows".into()))?;
        count_from_value(&DbRow::PostgresRow(row).get_value(0))
    }

    async fn ping(&self) -> Result<(), DbError> {
        let client = self.client.read().await;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Postgres
    }

    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }
}
