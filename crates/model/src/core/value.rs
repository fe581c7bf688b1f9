use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single typed column value as returned by the data source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Int(i64),
    Uint(u64),
    /// Single-precision column, kept narrow so it renders the way it was stored.
    Float32(f32),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Boolean(bool),
    Json(serde_json::Value),
    Uuid(Uuid),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Natural text form of the value, `None` for SQL NULL.
    ///
    /// Strings pass through unchanged, numbers render in base 10 and temporal
    /// values use chrono's default `Display` (no reformatting, no timezone shift).
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Uint(v) => i64::try_from(*v).ok(),
            Value::String(v) => v.parse::<i64>().ok(),
            _ => None,
        }
    }

    /// JSON form of the value for object-shaped event bodies.
    ///
    /// Numbers, booleans and embedded JSON keep their JSON type; everything
    /// else (decimals included, so no precision is lost) becomes its text form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Int(v) => serde_json::Value::from(*v),
            Value::Uint(v) => serde_json::Value::from(*v),
            Value::Float32(v) => v
                .to_string()
                .parse::<f64>()
                .map(serde_json::Value::from)
                .unwrap_or(serde_json::Value::Null),
            Value::Float(v) => serde_json::Value::from(*v),
            Value::Boolean(v) => serde_json::Value::Bool(*v),
            Value::Json(v) => v.clone(),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Json(v) => write!(f, "{v}"),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Bytes(v) => {
                for byte in v {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Value::Date(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::Null => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A named value inside a row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

impl FieldValue {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn strings_pass_through_unchanged() {
        let v = Value::String("it's a 'quoted' value".to_string());
        assert_eq!(v.to_text().as_deref(), Some("it's a 'quoted' value"));
    }

    #[test]
    fn numbers_render_base_ten() {
        assert_eq!(Value::Int(-42).to_text().as_deref(), Some("-42"));
        assert_eq!(Value::Uint(7).to_text().as_deref(), Some("7"));
        assert_eq!(Value::Float(1.5).to_text().as_deref(), Some("1.5"));
        let dec = Decimal::from_str("12.50").unwrap();
        assert_eq!(Value::Decimal(dec).to_text().as_deref(), Some("12.50"));
    }

    #[test]
    fn single_precision_floats_keep_their_short_form() {
        assert_eq!(Value::Float32(0.1).to_text().as_deref(), Some("0.1"));
        assert_eq!(Value::Float32(2.5).to_json(), serde_json::json!(2.5));
        assert_eq!(Value::Float32(0.1).to_json().to_string(), "0.1");
    }

    #[test]
    fn json_form_keeps_numbers_and_renders_the_rest_as_text() {
        assert_eq!(Value::Int(7).to_json(), serde_json::json!(7));
        assert_eq!(Value::Boolean(true).to_json(), serde_json::json!(true));
        assert_eq!(Value::Null.to_json(), serde_json::Value::Null);

        let dec = Decimal::from_str("12.50").unwrap();
        assert_eq!(Value::Decimal(dec).to_json(), serde_json::json!("12.50"));

        let dt = NaiveDate::from_ymd_opt(2015, 1, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(Value::DateTime(dt).to_json(), serde_json::json!("2015-01-01 10:30:00"));
    }

    #[test]
    fn temporal_values_use_default_display() {
        let date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        assert_eq!(Value::Date(date).to_text().as_deref(), Some("2015-01-01"));

        let dt = date.and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(
            Value::DateTime(dt).to_text().as_deref(),
            Some("2015-01-01 10:30:00")
        );
    }

    #[test]
    fn null_has_no_text() {
        assert_eq!(Value::Null.to_text(), None);
        assert!(Value::from(None::<i64>).is_null());
    }

    #[test]
    fn bytes_render_as_hex() {
        assert_eq!(
            Value::Bytes(vec![0x00, 0xab, 0x10]).to_text().as_deref(),
            Some("00ab10")
        );
    }
}
