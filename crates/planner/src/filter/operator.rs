use crate::error::PlanError;
use serde::Serialize;
use std::{fmt, str::FromStr};

/// Boolean composition of child predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn token(self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }

    /// Combinator keys are matched exactly so a field called `or` stays a field.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "AND" => Some(Combinator::And),
            "OR" => Some(Combinator::Or),
            _ => None,
        }
    }
}

/// What an operator expects on its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No operand; anything supplied is ignored.
    Nullary,
    Single,
    /// Exactly two values.
    Pair,
    /// A non-empty sequence.
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperatorKind {
    Eq,
    /// Equality without literal quoting; compares against another field or a
    /// pre-validated fragment.
    SameAs,
    NotEq,
    NotSameAs,
    StartsWith,
    EndsWith,
    Contains,
    NotContains,
    In,
    NotIn,
    Between,
    IsNull,
    NotNull,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 17] = [
        OperatorKind::Eq,
        OperatorKind::SameAs,
        OperatorKind::NotEq,
        OperatorKind::NotSameAs,
        OperatorKind::StartsWith,
        OperatorKind::EndsWith,
        OperatorKind::Contains,
        OperatorKind::NotContains,
        OperatorKind::In,
        OperatorKind::NotIn,
        OperatorKind::Between,
        OperatorKind::IsNull,
        OperatorKind::NotNull,
        OperatorKind::Lt,
        OperatorKind::Lte,
        OperatorKind::Gt,
        OperatorKind::Gte,
    ];

    pub fn token(self) -> &'static str {
        match self {
            OperatorKind::Eq => "eq",
            OperatorKind::SameAs => "sameAs",
            OperatorKind::NotEq => "notEq",
            OperatorKind::NotSameAs => "notSameAs",
            OperatorKind::StartsWith => "startsWith",
            OperatorKind::EndsWith => "endsWith",
            OperatorKind::Contains => "contains",
            OperatorKind::NotContains => "notContains",
            OperatorKind::In => "in",
            OperatorKind::NotIn => "notIn",
            OperatorKind::Between => "between",
            OperatorKind::IsNull => "isNull",
            OperatorKind::NotNull => "notNull",
            OperatorKind::Lt => "lt",
            OperatorKind::Lte => "lte",
            OperatorKind::Gt => "gt",
            OperatorKind::Gte => "gte",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            OperatorKind::IsNull | OperatorKind::NotNull => Arity::Nullary,
            OperatorKind::In | OperatorKind::NotIn => Arity::List,
            OperatorKind::Between => Arity::Pair,
            _ => Arity::Single,
        }
    }

    /// The operators that may stand alone as a bare filter value,
    /// e.g. `{"deletedAt": "isNull"}`.
    pub fn from_sentinel(token: &str) -> Option<Self> {
        match token {
            "isNull" => Some(OperatorKind::IsNull),
            "notNull" => Some(OperatorKind::NotNull),
            _ => None,
        }
    }
}

impl FromStr for OperatorKind {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperatorKind::ALL
            .into_iter()
            .find(|op| op.token() == s)
            .ok_or_else(|| PlanError::UnknownOperator(s.to_string()))
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_round_trip() {
        for op in OperatorKind::ALL {
            assert_eq!(op.token().parse::<OperatorKind>(), Ok(op));
        }
    }

    #[test]
    fn test_unknown_token_is_named() {
        assert_eq!(
            "like".parse::<OperatorKind>(),
            Err(PlanError::UnknownOperator("like".to_string()))
        );
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(OperatorKind::from_sentinel("isNull"), Some(OperatorKind::IsNull));
        assert_eq!(OperatorKind::from_sentinel("notNull"), Some(OperatorKind::NotNull));
        assert_eq!(OperatorKind::from_sentinel("null"), None);
    }

    #[test]
    fn test_combinator_keys_are_exact() {
        assert_eq!(Combinator::from_key("OR"), Some(Combinator::Or));
        assert_eq!(Combinator::from_key("AND"), Some(Combinator::And));
        assert_eq!(Combinator::from_key("or"), None);
    }
}
