//! Defines the AST for SQL expressions.

use crate::resolve::SEPARATOR;
use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or table identifier, e.g., `users` or `users.id`.
    Identifier(Ident),

    /// Every column of a relation, e.g. `u.*`.
    Wildcard(Option<String>),

    /// A literal value, bound as a positional parameter.
    Value(Value),

    /// A named parameter (`:name`) looked up in the query bindings at render time.
    Parameter(String),

    /// A fragment written into the query as-is. Named parameters inside it
    /// are still bound.
    Raw(String),

    /// A binary operation, e.g., `column = 'value'` or `a AND b`.
    BinaryOp(Box<BinaryOp>),

    /// `expr [NOT] IN (a, b, ...)`
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// `expr BETWEEN low AND high`
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },

    /// `expr IS [NOT] NULL`
    IsNull { expr: Box<Expr>, negated: bool },

    /// A function call, e.g., `COUNT(*)` or `MAX(price)`.
    FunctionCall(FunctionCall),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'users' in 'users.id'
    pub name: String,              // e.g., the 'id' in 'users.id'
}

impl Ident {
    /// Splits a field path at its first separator: `u.email` becomes
    /// qualifier `u`, name `email`.
    pub fn parse(path: &str) -> Self {
        match path.split_once(SEPARATOR) {
            Some((qualifier, name)) if !qualifier.is_empty() => Ident {
                qualifier: Some(qualifier.to_string()),
                name: name.to_string(),
            },
            _ => Ident {
                qualifier: None,
                name: path.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub wildcard: bool, // represents the '*' in 'COUNT(*)'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    // Pattern
    Like,
    NotLike,

    // Logical
    And,
    Or,
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }

    /// Folds `exprs` left to right with `op`. Returns `None` when empty.
    pub fn fold(exprs: Vec<Expr>, op: BinaryOperator) -> Option<Expr> {
        exprs
            .into_iter()
            .reduce(|left, right| Expr::binary(left, op, right))
    }
}
