use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use core::fmt;
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use mysql_async::{Column as MySqlColumn, Row as MySqlRow, Value as MySqlValue, consts::ColumnType};
use rust_decimal::Decimal;
use std::{fmt::Formatter, str::FromStr};
use tokio_postgres::{Row as PgRow, types::FromSql};
use tracing::warn;
use uuid::Uuid;

/// MySQL collation id of the `binary` character set.
const MYSQL_BINARY_CHARSET: u16 = 63;

pub enum DbRow<'a> {
    MySqlRow(&'a MySqlRow),
    PostgresRow(&'a PgRow),
}

impl DbRow<'_> {
    pub fn to_row_data(&self, table: &str) -> RowData {
        let columns = self
            .columns()
            .into_iter()
            .enumerate()
            .map(|(idx, name)| FieldValue {
                value: self.get_value(idx, &name),
                name,
            })
            .collect();

        RowData::new(table, columns)
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

    pub fn get_value(&self, idx: usize, name: &str) -> Value {
        match self {
            DbRow::MySqlRow(row) => match (row.columns_ref().get(idx), row.as_ref(idx)) {
                (Some(column), Some(value)) => mysql_value(column, value),
                _ => Value::Null,
            },
            DbRow::PostgresRow(row) => pg_value(row, idx).unwrap_or_else(|err| {
                warn!(column = name, error = %err, "Failed to decode column, using NULL");
                Value::Null
            }),
        }
    }
}

fn mysql_value(column: &MySqlColumn, value: &MySqlValue) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Int(v) => Value::Int(*v),
        MySqlValue::UInt(v) => Value::Uint(*v),
        MySqlValue::Float(v) => Value::Float32(*v),
        MySqlValue::Double(v) => Value::Float(*v),
        MySqlValue::Date(year, month, day, hour, minute, second, micros) => {
            let Some(date) = NaiveDate::from_ymd_opt(*year as i32, *month as u32, *day as u32)
            else {
                // zero dates such as 0000-00-00 have no chrono counterpart
                return Value::String(format!("{year:04}-{month:02}-{day:02}"));
            };
            if column.column_type() == ColumnType::MYSQL_TYPE_DATE {
                return Value::Date(date);
            }
            date.and_hms_micro_opt(*hour as u32, *minute as u32, *second as u32, *micros)
                .map(Value::DateTime)
                .unwrap_or(Value::Date(date))
        }
        MySqlValue::Time(negative, days, hours, minutes, seconds, micros) => {
            if !*negative && *days == 0 {
                if let Some(time) = NaiveTime::from_hms_micro_opt(
                    *hours as u32,
                    *minutes as u32,
                    *seconds as u32,
                    *micros,
                ) {
                    return Value::Time(time);
                }
            }
            let sign = if *negative { "-" } else { "" };
            let total_hours = *days * 24 + *hours as u32;
            Value::String(format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}"))
        }
        MySqlValue::Bytes(bytes) => mysql_bytes(column, bytes),
    }
}

fn mysql_bytes(column: &MySqlColumn, bytes: &[u8]) -> Value {
    match column.column_type() {
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
            let text = String::from_utf8_lossy(bytes);
            Decimal::from_str(&text)
                .map(Value::Decimal)
                .unwrap_or_else(|_| Value::String(text.into_owned()))
        }
        ColumnType::MYSQL_TYPE_JSON => serde_json::from_slice(bytes)
            .map(Value::Json)
            .unwrap_or_else(|_| Value::Bytes(bytes.to_vec())),
        ColumnType::MYSQL_TYPE_BIT => Value::Bytes(bytes.to_vec()),
        _ if column.character_set() == MYSQL_BINARY_CHARSET => Value::Bytes(bytes.to_vec()),
        _ => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Value::String(text),
            Err(err) => Value::Bytes(err.into_bytes()),
        },
    }
}

fn get<'a, T>(
    row: &'a PgRow,
    idx: usize,
    wrap: impl FnOnce(T) -> Value,
) -> Result<Value, tokio_postgres::Error>
where
    T: FromSql<'a>,
{
    Ok(row
        .try_get::<_, Option<T>>(idx)?
        .map(wrap)
        .unwrap_or(Value::Null))
}

fn pg_value(row: &PgRow, idx: usize) -> Result<Value, tokio_postgres::Error> {
    let type_name = row.columns()[idx].type_().name();
    match type_name {
        "bool" => get(row, idx, Value::Boolean),
        "int2" => get(row, idx, |v: i16| Value::Int(v as i64)),
        "int4" => get(row, idx, |v: i32| Value::Int(v as i64)),
        "int8" => get(row, idx, Value::Int),
        "oid" => get(row, idx, |v: u32| Value::Uint(v as u64)),
        "float4" => get(row, idx, Value::Float32),
        "float8" => get(row, idx, Value::Float),
        "numeric" => get(row, idx, Value::Decimal),
        "date" => get(row, idx, Value::Date),
        "time" => get(row, idx, Value::Time),
        "timestamp" => get(row, idx, |v: NaiveDateTime| Value::DateTime(v)),
        "timestamptz" => get(row, idx, |v: DateTime<Utc>| Value::Timestamp(v)),
        "json" | "jsonb" => get(row, idx, Value::Json),
        "uuid" => get(row, idx, |v: Uuid| Value::Uuid(v)),
        "bytea" => get(row, idx, Value::Bytes),
        _ => get(row, idx, Value::String),
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
