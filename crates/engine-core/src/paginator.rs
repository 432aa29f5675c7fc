use crate::error::QueryError;
use connectors::executor::QueryExecutor;
use model::{
    pagination::page::{PageRequest, PaginationResult, total_pages},
    records::row::Row,
};
use planner::plan::{QueryPlan, ResultWindow};
use std::sync::Arc;
use tracing::info;

/// Splits a plan's result into pages.
#[derive(Clone)]
pub struct Paginator {
    executor: Arc<dyn QueryExecutor>,
}

impl Paginator {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Paginator { executor }
    }

    /// Counts the plan's rows once, then fetches the requested page.
    ///
    /// The page request is validated before anything is executed. The
    /// plan's own window is replaced by the page window.
    pub async fn paginate(
        &self,
        mut plan: QueryPlan,
        page: PageRequest,
    ) -> Result<PaginationResult<Row>, QueryError> {
        let window = page.window()?;

        let total_count = self.executor.count(&plan).await?;
        let total_pages = total_pages(total_count, window.page_size);

        plan.set_window(ResultWindow::new(window.offset, window.page_size));
        let items = self.executor.fetch(&plan).await?;

        info!(
            "Fetched page {}/{} of `{}` ({} item(s), {} total)",
            window.current_page,
            total_pages,
            plan.repository.name,
            items.len(),
            total_count
        );

        Ok(PaginationResult {
            items,
            page_size: window.page_size,
            current_page: window.current_page,
            total_pages,
            total_count,
        })
    }
}
