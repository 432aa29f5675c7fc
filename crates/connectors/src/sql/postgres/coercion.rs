//! Request values arrive loosely typed (JSON numbers and strings) while
//! Postgres binds parameters strictly by the type it inferred for each
//! placeholder. Values are converted to that type before binding.

use crate::sql::postgres::params::PgParam;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::core::value::Value;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::str::FromStr;
use tokio_postgres::types::{Json as PgJson, Type};

/// Converts `value` for a placeholder of type `ty`. Values that cannot be
/// converted are bound as they are and left for the server to reject.
pub(crate) fn coerce_param(value: Value, ty: &Type) -> PgParam {
    if value.is_null() {
        return PgParam::from_value(value);
    }

    let coerced = match *ty {
        Type::INT2 => value.as_i64().and_then(|v| i16::try_from(v).ok()).map(PgParam::new),
        Type::INT4 => value.as_i64().and_then(|v| i32::try_from(v).ok()).map(PgParam::new),
        Type::INT8 => value.as_i64().map(PgParam::new),
        Type::FLOAT4 => as_f64(&value).map(|v| PgParam::new(v as f32)),
        Type::FLOAT8 => as_f64(&value).map(PgParam::new),
        Type::NUMERIC => match &value {
            Value::Float(f) => Decimal::from_f64(*f).map(PgParam::new),
            other => Decimal::from_str(other.as_text().trim()).ok().map(PgParam::new),
        },
        Type::BOOL => value.as_bool().map(PgParam::new),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => match &value {
            Value::String(_) => None,
            other => Some(PgParam::new(other.as_text())),
        },
        Type::UUID => match &value {
            Value::String(s) => uuid::Uuid::parse_str(s).ok().map(PgParam::new),
            _ => None,
        },
        Type::DATE => match &value {
            Value::String(s) => NaiveDate::from_str(s).ok().map(PgParam::new),
            Value::Timestamp(ts) => Some(PgParam::new(ts.date_naive())),
            _ => None,
        },
        Type::TIMESTAMPTZ => match &value {
            Value::String(s) => parse_timestamp(s).map(PgParam::new),
            Value::Date(d) => d.and_hms_opt(0, 0, 0).map(|n| PgParam::new(n.and_utc())),
            _ => None,
        },
        Type::TIMESTAMP => match &value {
            Value::String(s) => parse_timestamp(s).map(|ts| PgParam::new(ts.naive_utc())),
            Value::Timestamp(ts) => Some(PgParam::new(ts.naive_utc())),
            Value::Date(d) => d.and_hms_opt(0, 0, 0).map(PgParam::new),
            _ => None,
        },
        Type::JSON | Type::JSONB => Some(PgParam::new(PgJson(value.to_json()))),
        _ => None,
    };

    coerced.unwrap_or_else(|| PgParam::from_value(value))
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::Uint(u) => Some(*u as f64),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (read as UTC) and bare dates.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::from_str(s)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}
