use crate::sql::base::{error::DbError, query::lower::projection_expr};
use crate::{add_joins, add_where};
use model::core::value::Value;
use planner::{
    join::{ConditionType, JoinDirective},
    plan::QueryPlan,
    query::{
        ast::{
            common::{JoinKind, TableRef},
            expr::{BinaryOperator, Expr, FunctionCall, Ident},
            select::Select,
        },
        builder::select::{FromState, SelectBuilder},
        dialect::Dialect,
        ident,
        renderer::{Render, Renderer},
    },
    repository::{Catalog, Repository},
};
use planner::{table_ref, value};
use std::collections::BTreeMap;
use tracing::debug;

/// Alias of the derived table wrapped by distinct or grouped count queries.
pub const COUNT_ALIAS: &str = "count_q";

/// A join directive resolved against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedJoin {
    pub kind: JoinKind,
    pub table: TableRef,
    pub alias: String,
    pub on: Expr,
}

pub struct QueryGenerator<'a> {
    dialect: &'a dyn Dialect,
    catalog: &'a Catalog,
}

impl<'a> QueryGenerator<'a> {
    pub fn new(dialect: &'a dyn Dialect, catalog: &'a Catalog) -> Self {
        Self { dialect, catalog }
    }

    /// The page query: projection, joins, filter, grouping, ordering and
    /// the result window.
    pub fn select(&self, plan: &QueryPlan) -> Result<Select, DbError> {
        let columns = plan.projection.iter().map(projection_expr).collect();
        let mut select = self.base(plan, columns, plan.distinct)?;

        for field in &plan.group_by {
            select = select.group_by(ident(field));
        }
        for order in &plan.order_by {
            select = select.order_by(ident(&order.field), order.direction);
        }
        if let Some(limit) = plan.window.limit {
            select = select.limit(value!(window_value(limit)));
        }
        if let Some(offset) = plan.window.offset {
            select = select.offset(value!(window_value(offset)));
        }

        Ok(select.build())
    }

    /// The counting variant of the plan. Ordering and the window are
    /// ignored. Distinct and grouped plans are counted through a derived
    /// table so that the count matches the number of page rows.
    pub fn count(&self, plan: &QueryPlan) -> Result<Select, DbError> {
        if plan.distinct || !plan.group_by.is_empty() {
            let columns = plan.projection.iter().map(projection_expr).collect();
            let mut inner = self.base(plan, columns, plan.distinct)?;
            for field in &plan.group_by {
                inner = inner.group_by(ident(field));
            }
            return Ok(SelectBuilder::new()
                .select(vec![count_star()])
                .from_derived(inner.build(), COUNT_ALIAS)
                .build());
        }

        Ok(self.base(plan, vec![count_star()], false)?.build())
    }

    pub fn page_query(&self, plan: &QueryPlan) -> Result<(String, Vec<Value>), DbError> {
        let ast = self.select(plan)?;
        self.render(&ast, &plan.parameters)
    }

    pub fn count_query(&self, plan: &QueryPlan) -> Result<(String, Vec<Value>), DbError> {
        let ast = self.count(plan)?;
        self.render(&ast, &plan.parameters)
    }

    fn render(
        &self,
        ast: &impl Render,
        bindings: &BTreeMap<String, Value>,
    ) -> Result<(String, Vec<Value>), DbError> {
        let mut renderer = Renderer::with_bindings(self.dialect, bindings);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish()?;
        debug!("Rendered {} query: {sql}", self.dialect.name());
        Ok((sql, params))
    }

    /// `SELECT columns FROM root JOIN ... WHERE ...`
    fn base(
        &self,
        plan: &QueryPlan,
        columns: Vec<Expr>,
        distinct: bool,
    ) -> Result<SelectBuilder<FromState>, DbError> {
        let select = SelectBuilder::new()
            .select(columns)
            .distinct(distinct)
            .from(repository_table(&plan.repository), Some(&plan.alias));

        let select = add_joins!(select, self.resolve_joins(plan)?);
        let select = add_where!(select, &plan.filter);
        Ok(select)
    }

    /// Resolves each join's table and ON expression. A join's owner is
    /// either the root alias or the alias of an earlier join.
    pub fn resolve_joins(&self, plan: &QueryPlan) -> Result<Vec<ResolvedJoin>, DbError> {
        let mut owners: BTreeMap<&str, Option<&Repository>> = BTreeMap::new();
        owners.insert(&plan.alias, Some(&plan.repository));

        let mut resolved = Vec::with_capacity(plan.joins.len());
        for join in &plan.joins {
            let owner_alias = join.owner().unwrap_or(&plan.alias);
            let owner = owners.get(owner_alias).copied().flatten();
            let relation = owner.and_then(|repo| repo.relation(join.relation()));

            let (table, target) = match relation {
                Some(relation) => match self.catalog.get(&relation.target) {
                    Some(repo) => (repository_table(repo), Some(repo)),
                    None => (table_ref!(&relation.target), None),
                },
                None => match self.catalog.get(join.relation()) {
                    Some(repo) => (repository_table(repo), Some(repo)),
                    None => (table_ref!(join.relation()), None),
                },
            };

            let key_condition = relation.map(|relation| {
                Expr::binary(
                    Expr::Identifier(Ident {
                        qualifier: Some(owner_alias.to_string()),
                        name: relation.local_column.clone(),
                    }),
                    BinaryOperator::Eq,
                    Expr::Identifier(Ident {
                        qualifier: Some(join.alias.clone()),
                        name: relation.foreign_column.clone(),
                    }),
                )
            });

            let on = join_condition(join, key_condition)?;
            owners.insert(&join.alias, target);
            resolved.push(ResolvedJoin {
                kind: join.kind,
                table,
                alias: join.alias.clone(),
                on,
            });
        }
        Ok(resolved)
    }
}

fn join_condition(join: &JoinDirective, key_condition: Option<Expr>) -> Result<Expr, DbError> {
    let extra = join.condition.as_ref().map(|c| Expr::Raw(c.clone()));
    let on = match (join.condition_type, key_condition, extra) {
        (ConditionType::On, _, Some(extra)) => extra,
        (ConditionType::With, Some(key), Some(extra)) => {
            Expr::binary(key, BinaryOperator::And, extra)
        }
        (_, Some(key), None) => key,
        (_, None, Some(extra)) => extra,
        (_, None, None) => {
            return Err(DbError::QueryBuildError(format!(
                "Cannot join `{}`: no known relation and no condition given.",
                join.target_path
            )));
        }
    };
    Ok(on)
}

fn repository_table(repository: &Repository) -> TableRef {
    match &repository.schema {
        Some(schema) => table_ref!(schema, &repository.table),
        None => table_ref!(&repository.table),
    }
}

fn count_star() -> Expr {
    Expr::FunctionCall(FunctionCall {
        name: "COUNT".to_string(),
        args: vec![],
        wildcard: true,
    })
}

fn window_value(n: u64) -> Value {
    i64::try_from(n).map_or(Value::Uint(n), Value::Int)
}
