use crate::sql::postgres::coercion::coerce_param;
use model::core::value::Value;
use tokio_postgres::types::{Json as PgJson, ToSql, Type};

pub struct PgParam(Box<dyn ToSql + Sync + Send>);

impl PgParam {
    pub fn new<T: ToSql + Sync + Send + 'static>(value: T) -> Self {
        PgParam(Box::new(value))
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Int(v) => PgParam(Box::new(v)),
            Value::Uint(v) => match i64::try_from(v) {
                Ok(v) => PgParam(Box::new(v)),
                Err(_) => PgParam(Box::new(v.to_string())),
            },
            Value::Float(v) => PgParam(Box::new(v)),
            Value::String(v) => PgParam(Box::new(v)),
            Value::Boolean(v) => PgParam(Box::new(v)),
            Value::Json(v) => PgParam(Box::new(PgJson(v))),
            Value::Uuid(v) => PgParam(Box::new(v)),
            Value::Bytes(v) => PgParam(Box::new(v)),
            Value::Date(v) => PgParam(Box::new(v)),
            Value::Timestamp(v) => PgParam(Box::new(v)),
            // Lists are expanded into separate placeholders before binding;
            // one reaching this point is bound as a JSON array.
            Value::List(_) => PgParam(Box::new(PgJson(value.to_json()))),
            Value::Null => PgParam(Box::new(Option::<String>::None)),
        }
    }
}

impl AsRef<dyn ToSql + Sync> for PgParam {
    fn as_ref(&self) -> &(dyn ToSql + Sync + 'static) {
        &*self.0
    }
}

pub struct PgParamStore {
    pub params: Vec<PgParam>,
}

impl PgParamStore {
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            params: values.into_iter().map(PgParam::from_value).collect(),
        }
    }

    /// Converts each value to the type Postgres inferred for its placeholder.
    pub fn for_types(values: Vec<Value>, types: &[Type]) -> Self {
        Self {
            params: values
                .into_iter()
                .enumerate()
                .map(|(idx, value)| match types.get(idx) {
                    Some(ty) => coerce_param(value, ty),
                    None => PgParam::from_value(value),
                })
                .collect(),
        }
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|param| param.as_ref())
            .collect::<Vec<_>>()
    }
}
