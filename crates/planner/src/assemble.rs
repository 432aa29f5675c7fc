use crate::{
    alias::{AliasSource, RandomAlias, validate_alias},
    error::PlanError,
    filter::compiler::compile,
    join::{JoinDirective, plan_joins},
    ordering::{plan_group, plan_order},
    params::{LIMIT, OFFSET, ParamBag, SELECT, UNLIMITED},
    plan::{Projection, QueryPlan, ResultWindow},
    repository::Repository,
    resolve::{SEPARATOR, resolve},
};
use model::core::{params::ParamValue, value::Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns a repository and a parameter bag into a [`QueryPlan`].
#[derive(Clone)]
pub struct Assembler {
    aliases: Arc<dyn AliasSource>,
}

impl Default for Assembler {
    fn default() -> Self {
        Assembler::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Assembler {
            aliases: Arc::new(RandomAlias),
        }
    }

    pub fn with_alias_source(aliases: Arc<dyn AliasSource>) -> Self {
        Assembler { aliases }
    }

    pub fn assemble(&self, repository: &Repository, params: &ParamBag) -> Result<QueryPlan, PlanError> {
        let alias = match &params.alias {
            Some(alias) => {
                validate_alias(alias)?;
                alias.clone()
            }
            None => self.aliases.next_alias(),
        };

        let mut plan = QueryPlan::new(repository.clone(), alias);
        plan.joins = plan_joins(&params.join, &plan.alias)?;
        plan.projection = projection(&params.select, &plan.alias, &plan.joins)?;
        plan.distinct = params.distinct;

        if let Some(spec) = params.filter.as_ref().filter(|spec| !spec.is_empty()) {
            plan.filter = Some(compile(spec, &plan.alias)?);
        }

        plan.window = window(params.limit, params.offset)?;
        plan.order_by = plan_order(&params.order_by, &plan.alias)?;
        plan.group_by = plan_group(&params.group_by, &plan.alias)?;
        plan.parameters = params.params.clone();

        info!(
            "Assembled query plan for `{}` as `{}`: {} join(s), {} condition(s), {} bound parameter(s)",
            repository.name,
            plan.alias,
            plan.joins.len(),
            plan.filter.as_ref().map_or(0, |f| f.leaf_count()),
            plan.parameters.len()
        );
        debug!("Query plan: {plan:?}");

        Ok(plan)
    }
}

fn window(limit: i64, offset: i64) -> Result<ResultWindow, PlanError> {
    let limit = match limit {
        UNLIMITED | 0 => None,
        n if n < 0 => {
            return Err(PlanError::invalid_param(
                LIMIT,
                format!("must be -1 (unlimited) or positive, got {n}"),
            ));
        }
        n => Some(n as u64),
    };
    let offset = match offset {
        0 => None,
        n if n < 0 => {
            return Err(PlanError::invalid_param(
                OFFSET,
                format!("must not be negative, got {n}"),
            ));
        }
        n => Some(n as u64),
    };
    Ok(ResultWindow { offset, limit })
}

/// Splits a select list at commas that are outside parentheses and quotes.
fn split_top_level(list: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, c) in list.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                items.push(&list[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    items.push(&list[start..]);
    items
}

fn projection(
    select: &ParamValue,
    alias: &str,
    joins: &[JoinDirective],
) -> Result<Vec<Projection>, PlanError> {
    let items: Vec<&str> = match select {
        ParamValue::Scalar(Value::Null) => Vec::new(),
        ParamValue::Scalar(Value::String(s)) => split_top_level(s),
        ParamValue::Sequence(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| PlanError::invalid_param(SELECT, "entries must be strings"))
            })
            .collect::<Result<_, _>>()?,
        _ => {
            return Err(PlanError::invalid_param(
                SELECT,
                "expected a comma-separated string or a sequence",
            ));
        }
    };

    let is_entity = |name: &str| name == alias || joins.iter().any(|j| j.alias == name);

    let projection: Vec<Projection> = items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            if is_entity(item) {
                Projection::Entity(item.to_string())
            } else if item.contains('(') || item.contains(char::is_whitespace) {
                Projection::Raw(item.to_string())
            } else if let Some(entity) = item.strip_suffix(".*")
                && !entity.contains(SEPARATOR)
            {
                Projection::Entity(entity.to_string())
            } else {
                Projection::Field(resolve(item, alias))
            }
        })
        .collect();

    if projection.is_empty() {
        return Ok(vec![Projection::Entity(alias.to_string())]);
    }
    Ok(projection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alias::SequentialAlias,
        filter::{
            node::{FilterNode, Operand, Term},
            operator::OperatorKind,
        },
        query::ast::common::OrderDir,
    };
    use serde_json::json;
    use tracing_test::traced_test;

    fn assembler() -> Assembler {
        Assembler::with_alias_source(Arc::new(SequentialAlias::new("t")))
    }

    fn users() -> Repository {
        Repository::new("users", "users").with_relation("orders", "orders", "id", "user_id")
    }

    fn assemble(json: serde_json::Value) -> Result<QueryPlan, PlanError> {
        assembler().assemble(&users(), &ParamBag::from_json(&json)?)
    }

    #[traced_test]
    #[test]
    fn test_assembles_every_part() {
        let plan = assemble(json!({
            "alias": "u",
            "select": "u, o.total, COUNT(o.id) AS n",
            "distinct": true,
            "join": {"orders": {"alias": "o", "type": "left"}},
            "where": {"o.total": {"gt": ":min"}},
            "params": {"min": 10},
            "limit": 5,
            "offset": 10,
            "orderBy": {"name": "DESC"},
            "groupBy": "id"
        }))
        .unwrap();

        assert_eq!(plan.alias, "u");
        assert_eq!(
            plan.projection,
            vec![
                Projection::Entity("u".into()),
                Projection::Field("o.total".into()),
                Projection::Raw("COUNT(o.id) AS n".into()),
            ]
        );
        assert!(plan.distinct);
        assert_eq!(plan.joins.len(), 1);
        assert_eq!(
            plan.filter,
            Some(FilterNode::condition(
                "o.total",
                OperatorKind::Gt,
                Operand::Single(Term::Parameter("min".into()))
            ))
        );
        assert_eq!(plan.window, ResultWindow::new(10, 5));
        assert_eq!(plan.order_by[0].field, "u.name");
        assert_eq!(plan.order_by[0].direction, Some(OrderDir::Desc));
        assert_eq!(plan.group_by, vec!["u.id"]);
        assert_eq!(plan.parameters.get("min"), Some(&Value::Int(10)));
        assert!(logs_contain("Assembled query plan for `users` as `u`"));
    }

    #[test]
    fn test_generated_alias_and_defaults() {
        let plan = assemble(json!({})).unwrap();
        assert_eq!(plan.alias, "t0");
        assert_eq!(plan.projection, vec![Projection::Entity("t0".into())]);
        assert_eq!(plan.filter, None);
        assert_eq!(plan.window, ResultWindow { offset: None, limit: Some(20) });
    }

    #[test]
    fn test_unlimited_window() {
        let plan = assemble(json!({"limit": -1})).unwrap();
        assert_eq!(plan.window, ResultWindow::default());
        assert!(matches!(
            assemble(json!({"limit": -5})),
            Err(PlanError::InvalidParam { ref name, .. }) if name == "limit"
        ));
        assert!(matches!(
            assemble(json!({"offset": -1})),
            Err(PlanError::InvalidParam { ref name, .. }) if name == "offset"
        ));
    }

    #[test]
    fn test_scalar_where_is_rejected() {
        assert!(matches!(
            assemble(json!({"where": "name"})),
            Err(PlanError::MalformedFilter(_))
        ));
    }

    #[test]
    fn test_parameters_are_copied_without_validation() {
        let plan = assemble(json!({"params": {"unused": 1}})).unwrap();
        assert_eq!(plan.parameters.get("unused"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_star_projection_and_bad_alias() {
        let plan = assemble(json!({"alias": "u", "select": ["u.*", "email"]})).unwrap();
        assert_eq!(
            plan.projection,
            vec![
                Projection::Entity("u".into()),
                Projection::Field("u.email".into())
            ]
        );
        assert_eq!(
            assemble(json!({"alias": "u x"})),
            Err(PlanError::InvalidAlias("u x".into()))
        );
    }

    #[test]
    fn test_select_string_splits_at_top_level_commas() {
        let plan = assemble(json!({
            "alias": "u",
            "select": "u.id, COALESCE(u.nick,u.name) AS label, CONCAT(u.a, ',', u.b)"
        }))
        .unwrap();
        assert_eq!(
            plan.projection,
            vec![
                Projection::Field("u.id".into()),
                Projection::Raw("COALESCE(u.nick,u.name) AS label".into()),
                Projection::Raw("CONCAT(u.a, ',', u.b)".into()),
            ]
        );
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("a,b"), vec!["a", "b"]);
        assert_eq!(split_top_level("f(a,(b,c)),d"), vec!["f(a,(b,c))", "d"]);
        assert_eq!(split_top_level("'x,y',z"), vec!["'x,y'", "z"]);
        assert_eq!(split_top_level("a"), vec!["a"]);
    }
}
