use crate::{
    filter::node::FilterNode,
    join::JoinDirective,
    ordering::{GroupSpec, OrderSpec},
    repository::Repository,
};
use model::core::value::Value;
use std::collections::BTreeMap;

/// One item of the select list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Every column of the aliased relation.
    Entity(String),
    /// An alias-qualified column.
    Field(String),
    /// An expression written into the query as-is, e.g. `COUNT(o.id) AS n`.
    Raw(String),
}

/// Rows to skip and rows to return. `None` means not applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultWindow {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl ResultWindow {
    pub fn new(offset: u64, limit: u64) -> Self {
        ResultWindow {
            offset: Some(offset),
            limit: Some(limit),
        }
    }
}

/// A fully planned, backend-agnostic query. Nothing has been executed.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub repository: Repository,
    pub alias: String,
    pub projection: Vec<Projection>,
    pub distinct: bool,
    pub filter: Option<FilterNode>,
    pub joins: Vec<JoinDirective>,
    pub order_by: OrderSpec,
    pub group_by: GroupSpec,
    pub parameters: BTreeMap<String, Value>,
    pub window: ResultWindow,
}

impl QueryPlan {
    /// A plan selecting every row of `repository`.
    pub fn new(repository: Repository, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        QueryPlan {
            repository,
            projection: vec![Projection::Entity(alias.clone())],
            alias,
            distinct: false,
            filter: None,
            joins: Vec::new(),
            order_by: Vec::new(),
            group_by: Vec::new(),
            parameters: BTreeMap::new(),
            window: ResultWindow::default(),
        }
    }

    /// Replaces the result window, as the paginator does before fetching a
    /// page.
    pub fn set_window(&mut self, window: ResultWindow) {
        self.window = window;
    }

    pub fn with_window(mut self, window: ResultWindow) -> Self {
        self.window = window;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_plan_selects_root_entity() {
        let plan = QueryPlan::new(Repository::new("users", "users"), "u");
        assert_eq!(plan.projection, vec![Projection::Entity("u".into())]);
        assert_eq!(plan.window, ResultWindow::default());
    }

    #[test]
    fn test_set_window_overwrites() {
        let mut plan = QueryPlan::new(Repository::new("users", "users"), "u")
            .with_window(ResultWindow::new(5, 10));
        plan.set_window(ResultWindow::new(50, 50));
        assert_eq!(plan.window, ResultWindow::new(50, 50));
    }
}
