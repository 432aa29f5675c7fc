use crate::error::PlanError;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;
use uuid::Uuid;

/// Supplies root aliases for queries that did not name one.
pub trait AliasSource: Send + Sync {
    fn next_alias(&self) -> String;
}

/// `q` followed by eight hex digits of a v4 UUID.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomAlias;

impl AliasSource for RandomAlias {
    fn next_alias(&self) -> String {
        let uuid = Uuid::new_v4().simple().to_string();
        let alias = format!("q{}", &uuid[..8]);
        debug!(alias = %alias, "Generated query alias");
        alias
    }
}

/// Deterministic aliases: `prefix0`, `prefix1`, ...
#[derive(Debug)]
pub struct SequentialAlias {
    prefix: String,
    counter: AtomicUsize,
}

impl SequentialAlias {
    pub fn new(prefix: impl Into<String>) -> Self {
        SequentialAlias {
            prefix: prefix.into(),
            counter: AtomicUsize::new(0),
        }
    }
}

impl Default for SequentialAlias {
    fn default() -> Self {
        SequentialAlias::new("t")
    }
}

impl AliasSource for SequentialAlias {
    fn next_alias(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{n}", self.prefix)
    }
}

/// Aliases end up quoted in SQL and spliced into field paths, so they must be
/// plain identifiers.
pub fn validate_alias(alias: &str) -> Result<(), PlanError> {
    let mut chars = alias.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(PlanError::InvalidAlias(alias.to_string()))
    }
}
