use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use core::fmt;
use model::{
    core::value::Value,
    records::row::{FieldValue, Row},
};
use mysql_async::{Column as MySqlColumn, Row as MySqlRow, Value as MySqlValue, consts::ColumnType};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::fmt::Formatter;
use tokio_postgres::{
    Row as PgRow,
    types::{FromSql, Type},
};
use tracing::warn;

/// MySQL's character set id for binary data.
const MYSQL_BINARY_CHARSET: u16 = 63;

pub enum DbRow<'a> {
    MySqlRow(&'a MySqlRow),
    PostgresRow(&'a PgRow),
}

impl DbRow<'_> {
    pub fn to_row(&self) -> Row {
        let field_values = self
            .columns()
            .into_iter()
            .enumerate()
            .map(|(idx, name)| FieldValue {
                value: self.get_value(idx),
                name,
            })
            .collect();

        Row::new(field_values)
    }

    pub fn columns(&self) -> Vec<String> {
        match self {
            DbRow::MySqlRow(row) => row
                .columns_ref()
                .iter()
                .map(|col| col.name_str().into_owned())
                .collect(),
            DbRow::PostgresRow(row) => row
                .columns()
                .iter()
                .map(|col| col.name().to_string())
                .collect(),
        }
    }

    pub fn get_value(&self, idx: usize) -> Value {
        match self {
            DbRow::MySqlRow(row) => match (row.as_ref(idx), row.columns_ref().get(idx)) {
                (Some(value), Some(column)) => mysql_value(value, column),
                _ => Value::Null,
            },
            DbRow::PostgresRow(row) => pg_value(row, idx),
        }
    }
}

fn pg_get<'a, T: FromSql<'a>>(row: &'a PgRow, idx: usize) -> Option<T> {
    row.try_get::<_, Option<T>>(idx).ok().flatten()
}

fn pg_value(row: &PgRow, idx: usize) -> Value {
    let ty = row.columns()[idx].type_();
    let value = match *ty {
        Type::BOOL => pg_get::<bool>(row, idx).map(Value::Boolean),
        Type::INT2 => pg_get::<i16>(row, idx).map(|v| Value::Int(v.into())),
        Type::INT4 => pg_get::<i32>(row, idx).map(|v| Value::Int(v.into())),
        Type::INT8 => pg_get::<i64>(row, idx).map(Value::Int),
        Type::OID => pg_get::<u32>(row, idx).map(|v| Value::Uint(v.into())),
        Type::FLOAT4 => pg_get::<f32>(row, idx).map(|v| Value::Float(v.into())),
        Type::FLOAT8 => pg_get::<f64>(row, idx).map(Value::Float),
        Type::NUMERIC => pg_get::<Decimal>(row, idx).map(|d| match d.to_f64() {
            Some(f) => Value::Float(f),
            None => Value::String(d.to_string()),
        }),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            pg_get::<String>(row, idx).map(Value::String)
        }
        Type::JSON | Type::JSONB => pg_get::<serde_json::Value>(row, idx).map(Value::Json),
        Type::UUID => pg_get::<uuid::Uuid>(row, idx).map(Value::Uuid),
        Type::BYTEA => pg_get::<Vec<u8>>(row, idx).map(Value::Bytes),
        Type::DATE => pg_get::<NaiveDate>(row, idx).map(Value::Date),
        Type::TIMESTAMPTZ => pg_get::<DateTime<Utc>>(row, idx).map(Value::Timestamp),
        Type::TIMESTAMP => {
            pg_get::<NaiveDateTime>(row, idx).map(|naive| Value::Timestamp(naive.and_utc()))
        }
        _ => match row.try_get::<_, Option<String>>(idx) {
            Ok(text) => text.map(Value::String),
            Err(_) => {
                warn!("Unsupported column type: {}", ty.name());
                None
            }
        },
    };
    value.unwrap_or(Value::Null)
}

fn mysql_value(value: &MySqlValue, column: &MySqlColumn) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Int(i) => Value::Int(*i),
        MySqlValue::UInt(u) => Value::Uint(*u),
        MySqlValue::Float(f) => Value::Float((*f).into()),
        MySqlValue::Double(d) => Value::Float(*d),
        MySqlValue::Bytes(bytes) => mysql_bytes(bytes, column),
        MySqlValue::Date(year, month, day, hour, minute, second, micros) => {
            let Some(date) = NaiveDate::from_ymd_opt((*year).into(), (*month).into(), (*day).into())
            else {
                return Value::Null;
            };
            if column.column_type() == ColumnType::MYSQL_TYPE_DATE {
                return Value::Date(date);
            }
            date.and_hms_micro_opt((*hour).into(), (*minute).into(), (*second).into(), *micros)
                .map_or(Value::Null, |naive| Value::Timestamp(naive.and_utc()))
        }
        MySqlValue::Time(negative, days, hours, minutes, seconds, micros) => {
            let hours = u32::from(*hours) + days * 24;
            let sign = if *negative { "-" } else { "" };
            Value::String(format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{micros:06}"))
        }
    }
}

/// Text-protocol results arrive as bytes regardless of the column type.
fn mysql_bytes(bytes: &[u8], column: &MySqlColumn) -> Value {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) if column.character_set() != MYSQL_BINARY_CHARSET => text,
        _ => return Value::Bytes(bytes.to_vec()),
    };

    match column.column_type() {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_YEAR => text
            .parse::<i64>()
            .map(Value::Int)
            .or_else(|_| text.parse::<u64>().map(Value::Uint))
            .unwrap_or_else(|_| Value::String(text.to_string())),
        ColumnType::MYSQL_TYPE_FLOAT
        | ColumnType::MYSQL_TYPE_DOUBLE
        | ColumnType::MYSQL_TYPE_DECIMAL
        | ColumnType::MYSQL_TYPE_NEWDECIMAL => text
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        ColumnType::MYSQL_TYPE_JSON => serde_json::from_str(text)
            .map(Value::Json)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        _ => Value::String(text.to_string()),
    }
}

impl fmt::Debug for DbRow<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DbRow::MySqlRow(row) => write!(f, "{row:?}"),
            DbRow::PostgresRow(row) => write!(f, "{row:?}"),
        }
    }
}
