use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// A scalar (or list of scalars) that can be bound to a query or read back
/// from a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Boolean(bool),
    Json(serde_json::Value),
    Uuid(Uuid),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    /// Expanded into one placeholder per element when bound by name.
    List(Vec<Value>),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Uint(v) => i64::try_from(*v).ok(),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            Value::String(v) => v.trim().parse::<i64>().ok(),
            Value::Boolean(v) => Some(i64::from(*v)),
            Value::Json(v) => v.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Int(v) => Some(*v != 0),
            Value::Uint(v) => Some(*v != 0),
            Value::Float(v) => Some(*v != 0.0),
            Value::String(v) => match v.to_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" | "" => Some(false),
                _ => None,
            },
            Value::Boolean(v) => Some(*v),
            Value::Json(v) => v.as_bool(),
            Value::Null => Some(false),
            _ => None,
        }
    }

    /// Textual form used when a value is spliced into a pattern such as
    /// `%value%`. Null renders as the empty string.
    pub fn as_text(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Uint(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::String(v) => v.clone(),
            Value::Boolean(v) => v.to_string(),
            Value::Json(v) => match v.as_str() {
                Some(s) => s.to_string(),
                None => v.to_string(),
            },
            Value::Uuid(v) => v.to_string(),
            Value::Bytes(v) => String::from_utf8_lossy(v).into_owned(),
            Value::Date(v) => v.to_string(),
            Value::Timestamp(v) => v.to_rfc3339(),
            Value::List(items) => items
                .iter()
                .map(Value::as_text)
                .collect::<Vec<_>>()
                .join(","),
            Value::Null => String::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Int(v) => Json::from(*v),
            Value::Uint(v) => Json::from(*v),
            Value::Float(v) => Json::from(*v),
            Value::String(v) => Json::String(v.clone()),
            Value::Boolean(v) => Json::Bool(*v),
            Value::Json(v) => v.clone(),
            Value::Uuid(v) => Json::String(v.to_string()),
            Value::Bytes(v) => Json::String(
                v.iter()
                    .fold(String::from("\\x"), |acc, byte| acc + &format!("{byte:02x}")),
            ),
            Value::Date(v) => Json::String(v.to_string()),
            Value::Timestamp(v) => Json::String(v.to_rfc3339()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Null => Json::Null,
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Boolean(*b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            Json::Object(_) => Value::Json(json.clone()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Json(v) => write!(f, "'{}'", v.to_string().replace('\'', "''")),
            Value::Uuid(v) => write!(f, "'{v}'"),
            Value::Bytes(v) => {
                let hex = v
                    .iter()
                    .fold(String::new(), |acc, byte| acc + &format!("{byte:02x}"));
                write!(f, "E'\\\\x{hex}'")
            }
            Value::Date(v) => write!(f, "'{v}'"),
            Value::Timestamp(v) => write!(f, "'{v}'"),
            Value::List(items) => {
                let rendered = items
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "({rendered})")
            }
            Value::Null => write!(f, "NULL"),
        }
    }
}
