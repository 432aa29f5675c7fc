use crate::{error::PlanError, query::ast::common::OrderDir, resolve::resolve};
use model::core::{params::ParamValue, value::Value};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderField {
    pub field: String,
    pub direction: Option<OrderDir>,
}

pub type OrderSpec = Vec<OrderField>;
pub type GroupSpec = Vec<String>;

pub fn parse_direction(s: &str) -> Result<OrderDir, PlanError> {
    match s.trim().to_ascii_uppercase().as_str() {
        "ASC" => Ok(OrderDir::Asc),
        "DESC" => Ok(OrderDir::Desc),
        _ => Err(PlanError::UnknownDirection(s.to_string())),
    }
}

/// Normalizes `orderBy`: a string (`"name"`, `"name DESC"`), a sequence of
/// such strings, or a mapping of field to direction.
pub fn plan_order(spec: &ParamValue, alias: &str) -> Result<OrderSpec, PlanError> {
    match spec {
        ParamValue::Scalar(Value::Null) => Ok(Vec::new()),
        ParamValue::Scalar(Value::String(s)) => Ok(vec![order_string(s, alias)?]),
        ParamValue::Sequence(items) => items
            .iter()
            .map(|item| order_item(item, alias))
            .collect(),
        ParamValue::Mapping(entries) => entries
            .iter()
            .map(|(key, value)| {
                if is_index(key) {
                    return order_item(value, alias);
                }
                let direction = match value {
                    ParamValue::Scalar(Value::Null) => None,
                    ParamValue::Scalar(Value::String(dir)) => Some(parse_direction(dir)?),
                    _ => {
                        return Err(PlanError::invalid_param(
                            "orderBy",
                            format!("direction for `{key}` must be ASC or DESC"),
                        ));
                    }
                };
                Ok(OrderField {
                    field: field_name(key, alias, "orderBy")?,
                    direction,
                })
            })
            .collect(),
        ParamValue::Scalar(_) => Err(PlanError::invalid_param(
            "orderBy",
            "expected a field name, a sequence or a mapping",
        )),
    }
}

/// Normalizes `groupBy`: a string, a sequence of strings, or a mapping whose
/// keys (or, for index keys, values) are the fields.
pub fn plan_group(spec: &ParamValue, alias: &str) -> Result<GroupSpec, PlanError> {
    match spec {
        ParamValue::Scalar(Value::Null) => Ok(Vec::new()),
        ParamValue::Scalar(Value::String(s)) => Ok(vec![field_name(s, alias, "groupBy")?]),
        ParamValue::Sequence(items) => items.iter().map(|item| group_item(item, alias)).collect(),
        ParamValue::Mapping(entries) => entries
            .iter()
            .map(|(key, value)| {
                if is_index(key) {
                    group_item(value, alias)
                } else {
                    field_name(key, alias, "groupBy")
                }
            })
            .collect(),
        ParamValue::Scalar(_) => Err(PlanError::invalid_param(
            "groupBy",
            "expected a field name, a sequence or a mapping",
        )),
    }
}

fn order_item(item: &ParamValue, alias: &str) -> Result<OrderField, PlanError> {
    match item.as_str() {
        Some(s) => order_string(s, alias),
        None => Err(PlanError::invalid_param(
            "orderBy",
            "sequence entries must be field names",
        )),
    }
}

fn order_string(s: &str, alias: &str) -> Result<OrderField, PlanError> {
    let s = s.trim();
    match s.rsplit_once(char::is_whitespace) {
        Some((field, dir)) => Ok(OrderField {
            field: field_name(field, alias, "orderBy")?,
            direction: Some(parse_direction(dir)?),
        }),
        None => Ok(OrderField {
            field: field_name(s, alias, "orderBy")?,
            direction: None,
        }),
    }
}

fn group_item(item: &ParamValue, alias: &str) -> Result<String, PlanError> {
    match item.as_str() {
        Some(s) => field_name(s, alias, "groupBy"),
        None => Err(PlanError::invalid_param(
            "groupBy",
            "sequence entries must be field names",
        )),
    }
}

fn field_name(field: &str, alias: &str, param: &str) -> Result<String, PlanError> {
    let field = field.trim();
    if field.is_empty() || field.contains(char::is_whitespace) {
        return Err(PlanError::invalid_param(
            param,
            format!("`{field}` is not a field name"),
        ));
    }
    Ok(resolve(field, alias))
}

fn is_index(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(json: serde_json::Value) -> Result<OrderSpec, PlanError> {
        plan_order(&ParamValue::from(json), "u")
    }

    fn group(json: serde_json::Value) -> Result<GroupSpec, PlanError> {
        plan_group(&ParamValue::from(json), "u")
    }

    fn field(name: &str, direction: Option<OrderDir>) -> OrderField {
        OrderField {
            field: name.to_string(),
            direction,
        }
    }

    #[test]
    fn test_order_string() {
        assert_eq!(order(json!("name")).unwrap(), vec![field("u.name", None)]);
        assert_eq!(
            order(json!("o.total desc")).unwrap(),
            vec![field("o.total", Some(OrderDir::Desc))]
        );
        assert_eq!(
            order(json!("name sideways")),
            Err(PlanError::UnknownDirection("sideways".into()))
        );
    }

    #[test]
    fn test_order_mapping_mixes_index_and_field_keys() {
        let spec = order(json!({"0": "id", "name": "ASC", "o.created": "DESC", "rank": null}));
        assert_eq!(
            spec.unwrap(),
            vec![
                field("u.id", None),
                field("u.name", Some(OrderDir::Asc)),
                field("o.created", Some(OrderDir::Desc)),
                field("u.rank", None),
            ]
        );
    }

    #[test]
    fn test_order_sequence() {
        assert_eq!(
            order(json!(["name", "id DESC"])).unwrap(),
            vec![field("u.name", None), field("u.id", Some(OrderDir::Desc))]
        );
        assert!(order(json!([{"a": 1}])).is_err());
        assert!(order(json!(3)).is_err());
    }

    #[test]
    fn test_group_shapes() {
        assert_eq!(group(json!("status")).unwrap(), vec!["u.status"]);
        assert_eq!(
            group(json!(["status", "o.kind"])).unwrap(),
            vec!["u.status", "o.kind"]
        );
        assert_eq!(
            group(json!({"0": "status", "country": true})).unwrap(),
            vec!["u.status", "u.country"]
        );
        assert_eq!(group(json!(null)).unwrap(), Vec::<String>::new());
    }
}
