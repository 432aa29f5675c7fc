//! The generic, already-parsed request value every planner consumes.
//!
//! Request decoding happens upstream; by the time a value reaches this crate
//! it is one of three shapes. Mapping keys keep their arrival order because
//! join and ordering semantics depend on it.

use crate::core::value::Value;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(Value),
    Sequence(Vec<ParamValue>),
    Mapping(Vec<(String, ParamValue)>),
}

impl ParamValue {
    pub fn null() -> Self {
        ParamValue::Scalar(Value::Null)
    }

    /// Looks up a key in a mapping. Returns `None` for other shapes.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        match self {
            ParamValue::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            ParamValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// True for null, empty strings, `false`, zero and empty collections.
    pub fn is_blank(&self) -> bool {
        match self {
            ParamValue::Scalar(Value::Null) => true,
            ParamValue::Scalar(Value::String(s)) => s.is_empty() || s == "0",
            ParamValue::Scalar(Value::Boolean(b)) => !b,
            ParamValue::Scalar(Value::Int(i)) => *i == 0,
            ParamValue::Scalar(Value::Uint(u)) => *u == 0,
            ParamValue::Scalar(Value::Float(f)) => *f == 0.0,
            ParamValue::Scalar(_) => false,
            ParamValue::Sequence(items) => items.is_empty(),
            ParamValue::Mapping(entries) => entries.is_empty(),
        }
    }

    /// Collapses the tree into a bindable value: sequences become lists and
    /// mappings are kept as JSON documents.
    pub fn to_value(&self) -> Value {
        match self {
            ParamValue::Scalar(v) => v.clone(),
            ParamValue::Sequence(items) => Value::List(items.iter().map(|i| i.to_value()).collect()),
            ParamValue::Mapping(_) => Value::Json(self.to_json()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Scalar(v) => v.to_json(),
            ParamValue::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(|i| i.to_json()).collect())
            }
            ParamValue::Mapping(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for ParamValue {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Array(items) => {
                ParamValue::Sequence(items.iter().map(ParamValue::from).collect())
            }
            serde_json::Value::Object(map) => ParamValue::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), ParamValue::from(v)))
                    .collect(),
            ),
            scalar => ParamValue::Scalar(Value::from(scalar)),
        }
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(json: serde_json::Value) -> Self {
        ParamValue::from(&json)
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::Scalar(value)
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Ok(ParamValue::from(&json))
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapping_preserves_key_order() {
        let value = ParamValue::from(json!({"z": 1, "a": 2, "m": 3}));
        let ParamValue::Mapping(entries) = value else {
            panic!("expected mapping");
        };
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_get_and_blank() {
        let value = ParamValue::from(json!({"limit": "0", "where": {}, "alias": "u"}));
        assert!(value.get("limit").unwrap().is_blank());
        assert!(value.get("where").unwrap().is_blank());
        assert_eq!(value.get("alias").unwrap().as_str(), Some("u"));
        assert!(value.get("missing").is_none());
    }

    #[test]
    fn test_deserialize_from_json_text() {
        let value: ParamValue = serde_json::from_str(r#"{"ids": [1, 2]}"#).unwrap();
        assert_eq!(
            value.get("ids").unwrap().to_value(),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
    }
}
