use crate::{
    error::PlanError,
    filter::operator::{Combinator, OperatorKind},
    query::ast::expr::Expr,
};
use model::core::value::Value;

/// A compiled predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Condition(Condition),
    Composite {
        combinator: Combinator,
        children: Vec<FilterNode>,
    },
    Precompiled(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Always alias-qualified.
    pub field: String,
    pub operator: OperatorKind,
    pub operand: Operand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Single(Term),
    Pair(Term, Term),
    List(Vec<Term>),
}

/// One right-hand-side value of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Bound as a quoted literal.
    Literal(Value),
    /// Reference to a bound parameter, written `:name` in the request.
    Parameter(String),
    /// Written into the query as-is.
    Raw(String),
}

impl FilterNode {
    /// Wraps `children` under `combinator`. Composite nodes are never empty.
    pub fn composite(combinator: Combinator, children: Vec<FilterNode>) -> Result<Self, PlanError> {
        if children.is_empty() {
            return Err(PlanError::bad_filter(
                combinator.token(),
                "requires at least one condition",
            ));
        }
        Ok(FilterNode::Composite {
            combinator,
            children,
        })
    }

    /// Folds predicates under an implicit AND. A single predicate is
    /// returned unwrapped.
    pub fn all(mut predicates: Vec<FilterNode>) -> Result<Self, PlanError> {
        if predicates.len() == 1 {
            return Ok(predicates.remove(0));
        }
        FilterNode::composite(Combinator::And, predicates)
    }

    pub fn condition(field: impl Into<String>, operator: OperatorKind, operand: Operand) -> Self {
        FilterNode::Condition(Condition {
            field: field.into(),
            operator,
            operand,
        })
    }

    /// Number of atomic conditions and precompiled expressions in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            FilterNode::Condition(_) | FilterNode::Precompiled(_) => 1,
            FilterNode::Composite { children, .. } => children.iter().map(Self::leaf_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(field: &str, v: i64) -> FilterNode {
        FilterNode::condition(
            field,
            OperatorKind::Eq,
            Operand::Single(Term::Literal(Value::Int(v))),
        )
    }

    #[test]
    fn test_empty_composite_is_rejected() {
        let err = FilterNode::composite(Combinator::Or, vec![]).unwrap_err();
        assert_eq!(err, PlanError::bad_filter("OR", "requires at least one condition"));
    }

    #[test]
    fn test_all_unwraps_single_predicate() {
        assert_eq!(FilterNode::all(vec![eq("u.a", 1)]).unwrap(), eq("u.a", 1));
        let both = FilterNode::all(vec![eq("u.a", 1), eq("u.b", 2)]).unwrap();
        assert!(matches!(
            both,
            FilterNode::Composite { combinator: Combinator::And, ref children } if children.len() == 2
        ));
        assert_eq!(both.leaf_count(), 2);
    }
}
