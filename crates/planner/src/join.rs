//! Interprets the `join` request parameter.
//!
//! ```json
//! "join": {
//!     "orders": "o",
//!     "o.items": {"alias": "i", "type": "left", "conditionType": "WITH", "condition": "i.qty > 0"}
//! }
//! ```

use crate::{alias::validate_alias, error::PlanError, query::ast::common::JoinKind, resolve::resolve};
use model::core::{params::ParamValue, value::Value};
use serde::Serialize;
use std::{fmt, str::FromStr};

/// How a join's `condition` relates to the relation's own key condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConditionType {
    /// Replaces the key condition.
    On,
    /// Is ANDed onto the key condition.
    With,
}

impl FromStr for ConditionType {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ON" => Ok(ConditionType::On),
            "WITH" => Ok(ConditionType::With),
            _ => Err(PlanError::UnknownConditionType(s.to_string())),
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionType::On => f.write_str("ON"),
            ConditionType::With => f.write_str("WITH"),
        }
    }
}

pub fn parse_join_kind(s: &str) -> Result<JoinKind, PlanError> {
    match s.to_ascii_lowercase().as_str() {
        "inner" => Ok(JoinKind::Inner),
        "left" => Ok(JoinKind::Left),
        _ => Err(PlanError::UnknownJoinKind(s.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinDirective {
    /// Alias-qualified relation path, e.g. `u.orders`.
    pub target_path: String,
    pub alias: String,
    pub kind: JoinKind,
    pub condition_type: ConditionType,
    pub condition: Option<String>,
    /// Carried for callers that key results by a joined column. Not used
    /// when rendering SQL.
    pub index_by: Option<String>,
}

impl JoinDirective {
    /// The relation name without its owner alias: `orders` for `u.orders`.
    pub fn relation(&self) -> &str {
        self.target_path
            .rsplit_once(crate::resolve::SEPARATOR)
            .map_or(self.target_path.as_str(), |(_, name)| name)
    }

    /// The alias that owns the relation: `u` for `u.orders`.
    pub fn owner(&self) -> Option<&str> {
        self.target_path
            .rsplit_once(crate::resolve::SEPARATOR)
            .map(|(owner, _)| owner)
    }
}

/// Builds one directive per entry of `spec`, in declaration order.
pub fn plan_joins(spec: &ParamValue, alias: &str) -> Result<Vec<JoinDirective>, PlanError> {
    let entries = match spec {
        ParamValue::Mapping(entries) => entries,
        ParamValue::Scalar(Value::Null) => return Ok(Vec::new()),
        _ => {
            return Err(PlanError::invalid_param(
                "join",
                "expected a mapping of relation paths to join options",
            ));
        }
    };

    entries
        .iter()
        .map(|(path, options)| directive(path, options, alias))
        .collect()
}

fn directive(path: &str, options: &ParamValue, alias: &str) -> Result<JoinDirective, PlanError> {
    let malformed = |reason: &str| PlanError::MalformedJoin {
        relation: path.to_string(),
        reason: reason.to_string(),
    };

    if path.is_empty() {
        return Err(malformed("empty relation path"));
    }
    let target_path = resolve(path, alias);

    if let Some(join_alias) = options.as_str() {
        validate_alias(join_alias)?;
        return Ok(JoinDirective {
            target_path,
            alias: join_alias.to_string(),
            kind: JoinKind::Inner,
            condition_type: ConditionType::With,
            condition: None,
            index_by: None,
        });
    }

    if !matches!(options, ParamValue::Mapping(_)) {
        return Err(malformed("expected an alias or a mapping of join options"));
    }

    let text = |key: &str| option_text(options, path, key);

    let join_alias = text("alias")?.ok_or_else(|| malformed("missing `alias`"))?;
    validate_alias(join_alias)?;

    let kind = match text("type")?.or(text("kind")?) {
        Some(kind) => parse_join_kind(kind)?,
        None => JoinKind::Inner,
    };
    let condition_type = match text("conditionType")? {
        Some(ct) => ct.parse()?,
        None => ConditionType::With,
    };

    Ok(JoinDirective {
        target_path,
        alias: join_alias.to_string(),
        kind,
        condition_type,
        condition: text("condition")?.map(String::from),
        index_by: text("indexBy")?.map(String::from),
    })
}

fn option_text<'a>(
    options: &'a ParamValue,
    path: &str,
    key: &str,
) -> Result<Option<&'a str>, PlanError> {
    match options.get(key) {
        None | Some(ParamValue::Scalar(Value::Null)) => Ok(None),
        Some(ParamValue::Scalar(Value::String(s))) => Ok(Some(s.as_str())),
        Some(_) => Err(PlanError::MalformedJoin {
            relation: path.to_string(),
            reason: format!("`{key}` must be a string"),
        }),
    }
}
