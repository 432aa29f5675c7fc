use crate::{error::QueryError, paginator::Paginator};
use connectors::executor::QueryExecutor;
use model::{core::params::ParamValue, pagination::page::PaginationResult, records::row::Row};
use planner::{
    assemble::Assembler,
    params::ParamBag,
    plan::QueryPlan,
    repository::{Catalog, Repository},
};
use std::sync::Arc;

/// Assembles requests against a catalog and paginates the resulting plans.
#[derive(Clone)]
pub struct QueryService {
    catalog: Catalog,
    assembler: Assembler,
    paginator: Paginator,
}

impl QueryService {
    pub fn new(catalog: Catalog, executor: Arc<dyn QueryExecutor>) -> Self {
        QueryService {
            catalog,
            assembler: Assembler::new(),
            paginator: Paginator::new(executor),
        }
    }

    pub fn with_assembler(mut self, assembler: Assembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn repository(&self, name: &str) -> Result<&Repository, QueryError> {
        self.catalog
            .get(name)
            .ok_or_else(|| QueryError::UnknownRepository(name.to_string()))
    }

    /// Plans `request` against the named repository without running it.
    pub fn plan(&self, repository: &str, params: &ParamBag) -> Result<QueryPlan, QueryError> {
        let repository = self.repository(repository)?;
        Ok(self.assembler.assemble(repository, params)?)
    }

    /// Plans and paginates a raw request value.
    pub async fn query(
        &self,
        repository: &str,
        request: &ParamValue,
    ) -> Result<PaginationResult<Row>, QueryError> {
        let params = ParamBag::from_request(request)?;
        self.query_params(repository, &params).await
    }

    pub async fn query_params(
        &self,
        repository: &str,
        params: &ParamBag,
    ) -> Result<PaginationResult<Row>, QueryError> {
        let page = params.page_request();
        // Reject a bad page size before planning or touching the backend.
        page.window()?;
        let plan = self.plan(repository, params)?;
        self.paginator.paginate(plan, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryErrorKind;
    use async_trait::async_trait;
    use connectors::sql::base::error::DbError;
    use planner::{alias::SequentialAlias, error::PlanError};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        plans: Mutex<Vec<QueryPlan>>,
    }

    #[async_trait]
    impl QueryExecutor for Recorder {
        async fn count(&self, plan: &QueryPlan) -> Result<u64, DbError> {
            self.plans.lock().unwrap().push(plan.clone());
            Ok(0)
        }

        async fn fetch(&self, _plan: &QueryPlan) -> Result<Vec<Row>, DbError> {
            Ok(Vec::new())
        }
    }

    fn service(recorder: Arc<Recorder>) -> QueryService {
        let catalog = Catalog::new([Repository::new("users", "users")]);
        QueryService::new(catalog, recorder)
            .with_assembler(Assembler::with_alias_source(Arc::new(SequentialAlias::default())))
    }

    #[test]
    fn test_plan_unknown_repository() {
        let service = service(Arc::default());

        let err = service.plan("ghosts", &ParamBag::default()).unwrap_err();

        assert!(matches!(err, QueryError::UnknownRepository(ref name) if name == "ghosts"));
        assert_eq!(err.kind(), QueryErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_query_runs_assembled_plan() {
        let recorder = Arc::new(Recorder::default());
        let service = service(recorder.clone());
        let request = ParamValue::from(serde_json::json!({
            "alias": "u",
            "where": {"name": "Alice"},
            "pageSize": 10
        }));

        let page = service.query("users", &request).await.unwrap();

        assert_eq!(page.page_size, 10);
        let plans = recorder.plans.lock().unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].alias, "u");
        assert!(plans[0].filter.is_some());
    }

    #[tokio::test]
    async fn test_bad_filter_fails_before_execution() {
        let recorder = Arc::new(Recorder::default());
        let service = service(recorder.clone());
        let request = ParamValue::from(serde_json::json!({
            "where": {"name": {"like": "A%"}}
        }));

        let err = service.query("users", &request).await.unwrap_err();

        assert!(matches!(err, QueryError::Plan(PlanError::UnknownOperator(_))));
        assert!(recorder.plans.lock().unwrap().is_empty());
    }
}
