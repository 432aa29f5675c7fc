//! Compiles a nested filter specification into a [`FilterNode`] tree.
//!
//! Mapping keys are read as follows:
//! - a digit-only key (or a sequence position) splices the predicates of its
//!   value into the current level;
//! - `AND` / `OR` wrap the predicates of their value in a composite node;
//! - anything else is a field, qualified with the query alias when bare.
//!
//! A field maps either to `{operator: operand, ...}` or to a bare value,
//! which means `eq` unless it is one of the `isNull` / `notNull` sentinels.

use crate::{
    error::PlanError,
    filter::{
        node::{FilterNode, Operand, Term},
        operator::{Arity, OperatorKind},
        spec::{FilterKey, FilterSpec},
    },
    resolve::resolve,
};
use model::core::value::Value;
use tracing::debug;

/// Deepest nesting accepted before compilation is refused.
pub const MAX_DEPTH: usize = 64;

static NULL_OPERAND: FilterSpec = FilterSpec::Scalar(Value::Null);

/// Compiles `spec` into a single predicate: the implicit AND of everything
/// at the top level, or the lone predicate when there is only one.
pub fn compile(spec: &FilterSpec, alias: &str) -> Result<FilterNode, PlanError> {
    let predicates = compile_predicates(spec, alias)?;
    if predicates.is_empty() {
        return Err(PlanError::MalformedFilter(
            "the filter contains no conditions".to_string(),
        ));
    }
    let node = FilterNode::all(predicates)?;
    debug!(alias, conditions = node.leaf_count(), "Compiled filter");
    Ok(node)
}

/// Compiles the top level of `spec` without joining the results.
pub fn compile_predicates(spec: &FilterSpec, alias: &str) -> Result<Vec<FilterNode>, PlanError> {
    Compiler { alias }.level(spec, 0)
}

struct Compiler<'a> {
    alias: &'a str,
}

impl Compiler<'_> {
    fn level(&self, spec: &FilterSpec, depth: usize) -> Result<Vec<FilterNode>, PlanError> {
        if depth > MAX_DEPTH {
            return Err(PlanError::FilterTooDeep(MAX_DEPTH));
        }

        match spec {
            FilterSpec::Expr(expr) => Ok(vec![FilterNode::Precompiled(expr.clone())]),
            FilterSpec::Sequence(items) => {
                let mut predicates = Vec::with_capacity(items.len());
                for item in items {
                    predicates.extend(self.level(item, depth + 1)?);
                }
                Ok(predicates)
            }
            FilterSpec::Mapping(entries) => {
                let mut predicates = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    self.entry(key, value, depth, &mut predicates)?;
                }
                Ok(predicates)
            }
            FilterSpec::Scalar(value) => Err(PlanError::MalformedFilter(format!(
                "expected a mapping or sequence of conditions, got {value}"
            ))),
        }
    }

    fn entry(
        &self,
        key: &str,
        value: &FilterSpec,
        depth: usize,
        out: &mut Vec<FilterNode>,
    ) -> Result<(), PlanError> {
        if let FilterSpec::Expr(expr) = value {
            out.push(FilterNode::Precompiled(expr.clone()));
            return Ok(());
        }

        match FilterKey::parse(key) {
            FilterKey::Index(_) => out.extend(self.level(value, depth + 1)?),
            FilterKey::Combinator(combinator) => {
                let children = self.level(value, depth + 1)?;
                out.push(FilterNode::composite(combinator, children)?);
            }
            FilterKey::Field(field) => {
                if field.is_empty() {
                    return Err(PlanError::MalformedFilter(
                        "empty field name".to_string(),
                    ));
                }
                let field = resolve(field, self.alias);
                for (operator, operand) in operators(&field, value)? {
                    let operand = operand_for(operator, operand)?;
                    out.push(FilterNode::condition(field.clone(), operator, operand));
                }
            }
        }
        Ok(())
    }
}

/// Normalizes a field's value into `(operator, operand)` pairs.
fn operators<'s>(
    field: &str,
    value: &'s FilterSpec,
) -> Result<Vec<(OperatorKind, &'s FilterSpec)>, PlanError> {
    match value {
        FilterSpec::Mapping(entries) => entries
            .iter()
            .map(|(token, operand)| Ok((token.parse::<OperatorKind>()?, operand)))
            .collect(),
        FilterSpec::Scalar(scalar) => {
            let sentinel = match scalar {
                Value::String(token) => OperatorKind::from_sentinel(token),
                _ => None,
            };
            Ok(vec![match sentinel {
                Some(operator) => (operator, &NULL_OPERAND),
                None => (OperatorKind::Eq, value),
            }])
        }
        FilterSpec::Sequence(_) | FilterSpec::Expr(_) => Err(PlanError::MalformedFilter(format!(
            "field `{field}` expects a value or an operator mapping, got {}",
            value.shape()
        ))),
    }
}

fn operand_for(operator: OperatorKind, spec: &FilterSpec) -> Result<Operand, PlanError> {
    match operator.arity() {
        Arity::Nullary => Ok(Operand::None),
        Arity::Single => Ok(Operand::Single(term(operator, single(operator, spec)?))),
        Arity::Pair => {
            let items = elements(operator, spec)?;
            match items.as_slice() {
                [low, high] => Ok(Operand::Pair(term(operator, low), term(operator, high))),
                _ => Err(PlanError::bad_filter(
                    operator.token(),
                    format!("requires an array with two values, got {}", items.len()),
                )),
            }
        }
        Arity::List => {
            let items = elements(operator, spec)?;
            if items.is_empty() {
                return Err(PlanError::bad_filter(
                    operator.token(),
                    "requires a non-empty array",
                ));
            }
            Ok(Operand::List(
                items.into_iter().map(|v| term(operator, v)).collect(),
            ))
        }
    }
}

fn single(operator: OperatorKind, spec: &FilterSpec) -> Result<&Value, PlanError> {
    match spec {
        FilterSpec::Scalar(value) => Ok(value),
        other => Err(PlanError::bad_filter(
            operator.token(),
            format!("expects a single value, got {}", other.shape()),
        )),
    }
}

/// The values of an array operand. Keyed arrays contribute their values in
/// order.
fn elements(operator: OperatorKind, spec: &FilterSpec) -> Result<Vec<&Value>, PlanError> {
    let items: Vec<&FilterSpec> = match spec {
        FilterSpec::Sequence(items) => items.iter().collect(),
        FilterSpec::Mapping(entries) => entries.iter().map(|(_, v)| v).collect(),
        other => {
            return Err(PlanError::bad_filter(
                operator.token(),
                format!("requires an array, got {}", other.shape()),
            ));
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            FilterSpec::Scalar(value) => Ok(value),
            other => Err(PlanError::bad_filter(
                operator.token(),
                format!("array elements must be values, got {}", other.shape()),
            )),
        })
        .collect()
}

fn term(operator: OperatorKind, value: &Value) -> Term {
    match operator {
        OperatorKind::Eq | OperatorKind::NotEq => Term::Literal(value.clone()),
        OperatorKind::StartsWith => pattern(format!("{}%", value.as_text())),
        OperatorKind::EndsWith => pattern(format!("%{}", value.as_text())),
        OperatorKind::Contains | OperatorKind::NotContains => {
            pattern(format!("%{}%", value.as_text()))
        }
        OperatorKind::SameAs | OperatorKind::NotSameAs => match value {
            Value::String(s) => match parameter_name(s) {
                Some(name) => Term::Parameter(name.to_string()),
                None => Term::Raw(s.clone()),
            },
            other => Term::Literal(other.clone()),
        },
        _ => match value {
            Value::String(s) => match parameter_name(s) {
                Some(name) => Term::Parameter(name.to_string()),
                None => Term::Literal(value.clone()),
            },
            other => Term::Literal(other.clone()),
        },
    }
}

fn pattern(text: String) -> Term {
    Term::Literal(Value::String(text))
}

/// `":since"` names the bound parameter `since`.
fn parameter_name(s: &str) -> Option<&str> {
    let name = s.strip_prefix(':')?;
    let mut chars = name.chars();
    let first = chars.next()?;
    if (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Some(name)
    } else {
        None
    }
}
