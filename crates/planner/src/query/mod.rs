use crate::query::ast::expr::{Expr, Ident};
use model::core::value::Value;

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod macros;
pub mod renderer;

/// An identifier for a (possibly alias-qualified) field path.
pub fn ident(path: &str) -> Expr {
    Expr::Identifier(Ident::parse(path))
}

pub fn value(val: Value) -> Expr {
    Expr::Value(val)
}
