use crate::sql::base::{adapter::SqlAdapter, error::DbError, query::generator::QueryGenerator};
use async_trait::async_trait;
use model::records::row::Row;
use planner::{plan::QueryPlan, repository::Catalog};
use tracing::debug;

/// Runs query plans against a data source.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Number of rows the plan matches, ignoring its window and ordering.
    async fn count(&self, plan: &QueryPlan) -> Result<u64, DbError>;

    /// The rows inside the plan's window.
    async fn fetch(&self, plan: &QueryPlan) -> Result<Vec<Row>, DbError>;
}

/// Renders plans to SQL in the adapter's dialect and runs them.
pub struct SqlExecutor<A: SqlAdapter> {
    adapter: A,
    catalog: Catalog,
}

impl<A: SqlAdapter> SqlExecutor<A> {
    pub fn new(adapter: A, catalog: Catalog) -> Self {
        SqlExecutor { adapter, catalog }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    fn generator(&self) -> QueryGenerator<'_> {
        QueryGenerator::new(self.adapter.dialect(), &self.catalog)
    }
}

#[async_trait]
impl<A: SqlAdapter> QueryExecutor for SqlExecutor<A> {
    async fn count(&self, plan: &QueryPlan) -> Result<u64, DbError> {
        let (sql, params) = self.generator().count_query(plan)?;
        let count = self.adapter.query_count(&sql, params).await?;
        debug!("Count query for `{}` matched {count} row(s)", plan.repository.name);
        Ok(count)
    }

    async fn fetch(&self, plan: &QueryPlan) -> Result<Vec<Row>, DbError> {
        let (sql, params) = self.generator().page_query(plan)?;
        let rows = self.adapter.query_rows(&sql, params).await?;
        debug!("Fetched {} row(s) for `{}`", rows.len(), plan.repository.name);
        Ok(rows)
    }
}
