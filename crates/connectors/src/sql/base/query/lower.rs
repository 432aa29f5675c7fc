//! Lowers compiled filter trees and projections to SQL expressions.

use crate::sql::base::error::DbError;
use planner::{
    filter::{Combinator, Condition, FilterNode, Operand, OperatorKind, Term},
    plan::Projection,
    query::{
        ast::expr::{BinaryOperator, Expr},
        ident,
    },
};

pub fn filter_expr(node: &FilterNode) -> Result<Expr, DbError> {
    match node {
        FilterNode::Condition(condition) => condition_expr(condition),
        FilterNode::Composite {
            combinator,
            children,
        } => {
            let op = match combinator {
                Combinator::And => BinaryOperator::And,
                Combinator::Or => BinaryOperator::Or,
            };
            let children = children
                .iter()
                .map(filter_expr)
                .collect::<Result<Vec<_>, _>>()?;
            Expr::fold(children, op).ok_or_else(|| {
                DbError::QueryBuildError(format!(
                    "{} expressions cannot be empty.",
                    combinator.token()
                ))
            })
        }
        FilterNode::Precompiled(expr) => Ok(expr.clone()),
    }
}

fn condition_expr(condition: &Condition) -> Result<Expr, DbError> {
    let field = ident(&condition.field);
    let operator = condition.operator;
    let mismatch = || {
        DbError::QueryBuildError(format!(
            "Operand of `{}` on `{}` has the wrong shape",
            operator, condition.field
        ))
    };

    let expr = match (operator, &condition.operand) {
        (OperatorKind::IsNull | OperatorKind::NotNull, _) => Expr::IsNull {
            expr: Box::new(field),
            negated: operator == OperatorKind::NotNull,
        },
        (OperatorKind::In | OperatorKind::NotIn, Operand::List(terms)) => Expr::InList {
            expr: Box::new(field),
            list: terms.iter().map(term_expr).collect(),
            negated: operator == OperatorKind::NotIn,
        },
        (OperatorKind::Between, Operand::Pair(low, high)) => Expr::Between {
            expr: Box::new(field),
            low: Box::new(term_expr(low)),
            high: Box::new(term_expr(high)),
        },
        (_, Operand::Single(term)) => {
            let op = comparison(operator).ok_or_else(mismatch)?;
            Expr::binary(field, op, term_expr(term))
        }
        _ => return Err(mismatch()),
    };
    Ok(expr)
}

fn comparison(operator: OperatorKind) -> Option<BinaryOperator> {
    Some(match operator {
        OperatorKind::Eq | OperatorKind::SameAs => BinaryOperator::Eq,
        OperatorKind::NotEq | OperatorKind::NotSameAs => BinaryOperator::NotEq,
        OperatorKind::StartsWith | OperatorKind::EndsWith | OperatorKind::Contains => {
            BinaryOperator::Like
        }
        OperatorKind::NotContains => BinaryOperator::NotLike,
        OperatorKind::Lt => BinaryOperator::Lt,
        OperatorKind::Lte => BinaryOperator::LtEq,
        OperatorKind::Gt => BinaryOperator::Gt,
        OperatorKind::Gte => BinaryOperator::GtEq,
        _ => return None,
    })
}

fn term_expr(term: &Term) -> Expr {
    match term {
        Term::Literal(value) => Expr::Value(value.clone()),
        Term::Parameter(name) => Expr::Parameter(name.clone()),
        Term::Raw(fragment) => Expr::Raw(fragment.clone()),
    }
}

pub fn projection_expr(projection: &Projection) -> Expr {
    match projection {
        Projection::Entity(alias) => Expr::Wildcard(Some(alias.clone())),
        Projection::Field(field) => ident(field),
        Projection::Raw(fragment) => Expr::Raw(fragment.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::Value;
    use planner::query::ast::expr::Ident;

    fn col(path: &str) -> Expr {
        Expr::Identifier(Ident::parse(path))
    }

    #[test]
    fn test_like_and_null_conditions() {
        let like = FilterNode::condition(
            "u.name",
            OperatorKind::StartsWith,
            Operand::Single(Term::Literal(Value::String("Jo%".into()))),
        );
        assert_eq!(
            filter_expr(&like).unwrap(),
            Expr::binary(
                col("u.name"),
                BinaryOperator::Like,
                Expr::Value(Value::String("Jo%".into()))
            )
        );

        let not_null = FilterNode::condition("u.deleted", OperatorKind::NotNull, Operand::None);
        assert_eq!(
            filter_expr(&not_null).unwrap(),
            Expr::IsNull {
                expr: Box::new(col("u.deleted")),
                negated: true
            }
        );
    }

    #[test]
    fn test_composite_folds_left() {
        let eq = |v| {
            FilterNode::condition(
                "u.a",
                OperatorKind::Eq,
                Operand::Single(Term::Literal(Value::Int(v))),
            )
        };
        let node = FilterNode::Composite {
            combinator: Combinator::Or,
            children: vec![eq(1), eq(2), eq(3)],
        };
        let expected = Expr::binary(
            Expr::binary(
                Expr::binary(col("u.a"), BinaryOperator::Eq, Expr::Value(Value::Int(1))),
                BinaryOperator::Or,
                Expr::binary(col("u.a"), BinaryOperator::Eq, Expr::Value(Value::Int(2))),
            ),
            BinaryOperator::Or,
            Expr::binary(col("u.a"), BinaryOperator::Eq, Expr::Value(Value::Int(3))),
        );
        assert_eq!(filter_expr(&node).unwrap(), expected);
    }

    #[test]
    fn test_shape_mismatch_is_a_build_error() {
        let broken = FilterNode::condition(
            "u.a",
            OperatorKind::In,
            Operand::Single(Term::Literal(Value::Int(1))),
        );
        assert!(matches!(
            filter_expr(&broken),
            Err(DbError::QueryBuildError(_))
        ));
    }

    #[test]
    fn test_projection() {
        assert_eq!(
            projection_expr(&Projection::Entity("u".into())),
            Expr::Wildcard(Some("u".into()))
        );
        assert_eq!(projection_expr(&Projection::Field("u.id".into())), col("u.id"));
    }

    #[test]
    fn test_every_operator_lowers() {
        use planner::filter::operator::Arity;

        let one = || Term::Literal(Value::Int(1));
        for operator in OperatorKind::ALL {
            let operand = match operator.arity() {
                Arity::Nullary => Operand::None,
                Arity::Single => Operand::Single(one()),
                Arity::Pair => Operand::Pair(one(), Term::Literal(Value::Int(2))),
                Arity::List => Operand::List(vec![one()]),
            };
            let lowered = filter_expr(&FilterNode::condition("u.a", operator, operand)).unwrap();

            let binary = |op| Expr::binary(col("u.a"), op, Expr::Value(Value::Int(1)));
            let in_list = |negated| Expr::InList {
                expr: Box::new(col("u.a")),
                list: vec![Expr::Value(Value::Int(1))],
                negated,
            };
            let is_null = |negated| Expr::IsNull {
                expr: Box::new(col("u.a")),
                negated,
            };
            let expected = match operator {
                OperatorKind::Eq | OperatorKind::SameAs => binary(BinaryOperator::Eq),
                OperatorKind::NotEq | OperatorKind::NotSameAs => binary(BinaryOperator::NotEq),
                OperatorKind::StartsWith | OperatorKind::EndsWith | OperatorKind::Contains => {
                    binary(BinaryOperator::Like)
                }
                OperatorKind::NotContains => binary(BinaryOperator::NotLike),
                OperatorKind::Lt => binary(BinaryOperator::Lt),
                OperatorKind::Lte => binary(BinaryOperator::LtEq),
                OperatorKind::Gt => binary(BinaryOperator::Gt),
                OperatorKind::Gte => binary(BinaryOperator::GtEq),
                OperatorKind::In => in_list(false),
                OperatorKind::NotIn => in_list(true),
                OperatorKind::IsNull => is_null(false),
                OperatorKind::NotNull => is_null(true),
                OperatorKind::Between => Expr::Between {
                    expr: Box::new(col("u.a")),
                    low: Box::new(Expr::Value(Value::Int(1))),
                    high: Box::new(Expr::Value(Value::Int(2))),
                },
            };
            assert_eq!(lowered, expected, "{operator}");
        }
    }
}
