//! Defines the core rendering trait and context for converting AST to SQL.

use crate::query::dialect::Dialect;
use lazy_static::lazy_static;
use model::core::value::Value;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::warn;

pub mod expr;
pub mod select;

lazy_static! {
    // Quoted strings, quoted identifiers and `::type` casts are matched too
    // so they can be copied through untouched.
    static ref NAMED_PARAM: Regex = Regex::new(
        r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|`(?:[^`]|``)*`|::?[A-Za-z_][A-Za-z0-9_]*"#
    )
    .expect("named parameter pattern is valid");
}

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("Unbound query parameter(s): {}", .0.join(", "))]
    UnboundParameters(Vec<String>),
}

/// A context that holds the state during the rendering process.
///
/// It accumulates the SQL string and the positional parameters, resolves
/// named parameters against the query bindings, and provides access to the
/// dialect for syntax-specific details.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: &'a dyn Dialect,
    bindings: Option<&'a BTreeMap<String, Value>>,
    used: BTreeSet<String>,
    unbound: Vec<String>,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
            bindings: None,
            used: BTreeSet::new(),
            unbound: Vec::new(),
        }
    }

    pub fn with_bindings(dialect: &'a dyn Dialect, bindings: &'a BTreeMap<String, Value>) -> Self {
        Self {
            bindings: Some(bindings),
            ..Self::new(dialect)
        }
    }

    /// Consumes the renderer and returns the final SQL string and parameters.
    ///
    /// Fails if any named parameter had no binding.
    pub fn finish(self) -> Result<(String, Vec<Value>), RenderError> {
        if !self.unbound.is_empty() {
            return Err(RenderError::UnboundParameters(self.unbound));
        }

        if let Some(bindings) = self.bindings {
            for name in bindings.keys().filter(|name| !self.used.contains(*name)) {
                warn!(parameter = %name, "Bound parameter is never referenced by the query");
            }
        }

        Ok((self.sql, self.params))
    }

    pub fn add_param(&mut self, value: Value) {
        self.params.push(value);
        let placeholder = self.dialect.get_placeholder(self.params.len() - 1);
        self.sql.push_str(&placeholder);
    }

    /// Writes the placeholder(s) for a named parameter. List bindings expand
    /// to one placeholder per element.
    pub fn add_named_param(&mut self, name: &str) {
        let bindings = self.bindings;
        match bindings.and_then(|b| b.get(name)) {
            Some(Value::List(items)) => {
                self.used.insert(name.to_string());
                if items.is_empty() {
                    self.sql.push_str("NULL");
                }
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.add_param(item.clone());
                }
            }
            Some(value) => {
                self.used.insert(name.to_string());
                self.add_param(value.clone());
            }
            None => {
                if !self.unbound.iter().any(|n| n == name) {
                    self.unbound.push(name.to_string());
                }
                self.sql.push_str("NULL");
            }
        }
    }

    /// Copies a raw fragment into the output, binding every `:name` it
    /// references.
    pub fn push_raw(&mut self, fragment: &str) {
        let mut last = 0;
        for found in NAMED_PARAM.find_iter(fragment) {
            self.sql.push_str(&fragment[last..found.start()]);
            let token = found.as_str();
            match token.strip_prefix(':') {
                Some(name) if !name.starts_with(':') => self.add_named_param(name),
                _ => self.sql.push_str(token),
            }
            last = found.end();
        }
        self.sql.push_str(&fragment[last..]);
    }

    pub fn push_list<T: Render>(&mut self, items: &[T]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            item.render(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::dialect::{MySql, Postgres};

    #[test]
    fn test_push_raw_binds_named_parameters() {
        let bindings = BTreeMap::from([
            ("min".to_string(), Value::Int(5)),
            ("ids".to_string(), Value::List(vec![Value::Int(1), Value::Int(2)])),
        ]);
        let dialect = Postgres;
        let mut r = Renderer::with_bindings(&dialect, &bindings);
        r.push_raw("o.total > :min AND o.id IN (:ids) AND o.code::text <> ''");
        let (sql, params) = r.finish().unwrap();

        assert_eq!(
            sql,
            "o.total > $1 AND o.id IN ($2, $3) AND o.code::text <> ''"
        );
        assert_eq!(params, vec![Value::Int(5), Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_push_raw_skips_quoted_sections() {
        let bindings = BTreeMap::from([("state".to_string(), Value::String("open".into()))]);
        let dialect = Postgres;
        let mut r = Renderer::with_bindings(&dialect, &bindings);
        r.push_raw(r#"o.status <> 'x:void' AND o.note <> 'it''s :late' AND "a:b" = :state"#);
        let (sql, params) = r.finish().unwrap();

        assert_eq!(
            sql,
            r#"o.status <> 'x:void' AND o.note <> 'it''s :late' AND "a:b" = $1"#
        );
        assert_eq!(params, vec![Value::String("open".into())]);
    }

    #[test]
    fn test_push_raw_skips_backtick_identifiers() {
        let dialect = MySql;
        let mut r = Renderer::new(&dialect);
        r.push_raw("`o`.`x:y` IS NOT NULL");
        assert_eq!(r.finish().unwrap().0, "`o`.`x:y` IS NOT NULL");
    }

    #[test]
    fn test_unbound_parameter_fails_on_finish() {
        let dialect = MySql;
        let mut r = Renderer::new(&dialect);
        r.push_raw("a = :missing OR b = :missing");
        assert_eq!(
            r.finish(),
            Err(RenderError::UnboundParameters(vec!["missing".to_string()]))
        );
    }

    #[test]
    fn test_empty_list_binding_renders_null() {
        let bindings = BTreeMap::from([("ids".to_string(), Value::List(vec![]))]);
        let dialect = Postgres;
        let mut r = Renderer::with_bindings(&dialect, &bindings);
        r.add_named_param("ids");
        let (sql, params) = r.finish().unwrap();
        assert_eq!(sql, "NULL");
        assert!(params.is_empty());
    }
}
