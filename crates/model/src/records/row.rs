use crate::core::value::Value;
use serde::{Serialize, Serializer, ser::SerializeMap};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

/// One result row, columns in the order the backend returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub field_values: Vec<FieldValue>,
}

impl Row {
    pub fn new(field_values: Vec<FieldValue>) -> Self {
        Row { field_values }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.field_values.len()))?;
        for field in &self.field_values {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_serializes_as_object() {
        let row = Row::new(vec![
            FieldValue {
                name: "id".into(),
                value: Value::Int(7),
            },
            FieldValue {
                name: "email".into(),
                value: Value::Null,
            },
        ]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":7,"email":null}"#);
        assert_eq!(row.get_value("ID"), Value::Int(7));
        assert_eq!(row.get_value("missing"), Value::Null);
    }
}
