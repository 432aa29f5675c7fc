//! Uncompiled filter input.
//!
//! The shape of every node is decided once, when the request value is
//! converted, so the compiler can match exhaustively instead of probing.

use crate::{filter::operator::Combinator, query::ast::expr::Expr};
use model::core::{params::ParamValue, value::Value};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    Scalar(Value),
    Sequence(Vec<FilterSpec>),
    Mapping(Vec<(String, FilterSpec)>),
    /// A backend expression built by the caller and passed through as-is.
    Expr(Expr),
}

/// A mapping key, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKey<'a> {
    /// Positional entry; its predicates are spliced into the current level.
    Index(usize),
    Combinator(Combinator),
    Field(&'a str),
}

impl<'a> FilterKey<'a> {
    pub fn parse(key: &'a str) -> Self {
        if let Some(combinator) = Combinator::from_key(key) {
            return FilterKey::Combinator(combinator);
        }
        if !key.is_empty()
            && key.bytes().all(|b| b.is_ascii_digit())
            && let Ok(index) = key.parse::<usize>()
        {
            return FilterKey::Index(index);
        }
        FilterKey::Field(key)
    }
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        match self {
            FilterSpec::Sequence(items) => items.is_empty(),
            FilterSpec::Mapping(entries) => entries.is_empty(),
            FilterSpec::Scalar(Value::Null) => true,
            _ => false,
        }
    }

    /// A short description of the node shape for error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            FilterSpec::Scalar(_) => "a scalar",
            FilterSpec::Sequence(_) => "a sequence",
            FilterSpec::Mapping(_) => "a mapping",
            FilterSpec::Expr(_) => "an expression",
        }
    }

    /// Builds a mapping from `(key, spec)` pairs, keeping their order.
    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, FilterSpec)>) -> Self {
        FilterSpec::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<&ParamValue> for FilterSpec {
    fn from(value: &ParamValue) -> Self {
        match value {
            ParamValue::Scalar(v) => FilterSpec::Scalar(v.clone()),
            ParamValue::Sequence(items) => {
                FilterSpec::Sequence(items.iter().map(FilterSpec::from).collect())
            }
            ParamValue::Mapping(entries) => FilterSpec::Mapping(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), FilterSpec::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<ParamValue> for FilterSpec {
    fn from(value: ParamValue) -> Self {
        FilterSpec::from(&value)
    }
}

impl From<serde_json::Value> for FilterSpec {
    fn from(json: serde_json::Value) -> Self {
        FilterSpec::from(&ParamValue::from(&json))
    }
}

impl From<Expr> for FilterSpec {
    fn from(expr: Expr) -> Self {
        FilterSpec::Expr(expr)
    }
}
