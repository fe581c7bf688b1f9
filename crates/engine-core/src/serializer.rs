use crate::error::SerializeError;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use model::records::row::{RowData, SerializedRow};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Renders rows into their text form, one value per column in column order.
///
/// A missing or empty result set yields no rows; null values stay `None`.
pub fn serialize(rows: Option<&[RowData]>) -> Vec<SerializedRow> {
    let Some(rows) = rows else {
        return Vec::new();
    };

    rows.iter().map(serialize_row).collect()
}

pub fn serialize_row(row: &RowData) -> SerializedRow {
    SerializedRow::new(row.values().map(|value| value.to_text()).collect())
}

/// Shape of an event body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyFormat {
    /// One delimited record per row.
    #[default]
    Csv,
    /// One JSON object per row, keyed by column name.
    Json,
}

/// Layout of the event body built from a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFormat {
    pub body: BodyFormat,
    pub delimiter: u8,
    pub enclose_by_quotes: bool,
}

impl Default for EventFormat {
    fn default() -> Self {
        Self {
            body: BodyFormat::Csv,
            delimiter: b',',
            enclose_by_quotes: true,
        }
    }
}

/// Encodes one row as an event body in the configured shape.
pub fn encode_event_body(row: &RowData, format: &EventFormat) -> Result<Vec<u8>, SerializeError> {
    match format.body {
        BodyFormat::Csv => encode_csv_record(&serialize_row(row), format),
        BodyFormat::Json => Ok(serde_json::to_vec(&JsonRow(row))?),
    }
}

/// Encodes one serialized row as a single CSV record without a line terminator.
pub fn encode_csv_record(
    row: &SerializedRow,
    format: &EventFormat,
) -> Result<Vec<u8>, SerializeError> {
    let quote_style = if format.enclose_by_quotes {
        QuoteStyle::Always
    } else {
        QuoteStyle::Necessary
    };

    let mut writer = WriterBuilder::new()
        .delimiter(format.delimiter)
        .quote_style(quote_style)
        .terminator(Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(row.to_strings(""))?;
    let mut body = writer.into_inner().map_err(|e| e.into_error())?;

    if body.last() == Some(&b'\n') {
        body.pop();
    }
    Ok(body)
}

/// Row as a JSON object, columns in select order.
struct JsonRow<'a>(&'a RowData);

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in &self.0.field_values {
            map.serialize_entry(&field.name, &field.value.to_json())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use model::core::value::{FieldValue, Value};

    fn sample_rows() -> Vec<RowData> {
        let date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        vec![
            RowData::new(
                "t",
                vec![
                    FieldValue::new("s", "string1"),
                    FieldValue::new("n", 1i64),
                    FieldValue::new("d", date),
                ],
            ),
            RowData::new(
                "t",
                vec![
                    FieldValue::new("s", "string2"),
                    FieldValue::new("n", Value::Null),
                    FieldValue::new("d", date),
                ],
            ),
        ]
    }

    #[test]
    fn no_rows_serialize_to_nothing() {
        assert!(serialize(None).is_empty());
        assert!(serialize(Some(&[])).is_empty());
    }

    #[test]
    fn values_render_in_natural_form() {
        let rows = sample_rows();
        let out = serialize(Some(&rows));

        assert_eq!(out.len(), 2);
        assert_eq!(
            out[0].fields(),
            &[
                Some("string1".to_string()),
                Some("1".to_string()),
                Some("2015-01-01".to_string())
            ]
        );
        assert_eq!(out[1].fields()[1], None);
    }

    #[test]
    fn single_precision_values_render_short() {
        let row = RowData::new("t", vec![FieldValue::new("price", Value::Float32(0.1))]);
        assert_eq!(serialize_row(&row).fields(), &[Some("0.1".to_string())]);

        let body = encode_event_body(&row, &EventFormat::default()).unwrap();
        assert_eq!(body, br#""0.1""#.to_vec());
    }

    #[test]
    fn quoted_body_encloses_every_field() {
        let body = encode_event_body(&sample_rows()[0], &EventFormat::default()).unwrap();
        assert_eq!(body, br#""string1","1","2015-01-01""#.to_vec());
    }

    #[test]
    fn unquoted_body_uses_configured_delimiter() {
        let rows = sample_rows();
        let format = EventFormat {
            delimiter: b'|',
            enclose_by_quotes: false,
            ..EventFormat::default()
        };
        assert_eq!(
            encode_event_body(&rows[0], &format).unwrap(),
            b"string1|1|2015-01-01".to_vec()
        );
        assert_eq!(
            encode_event_body(&rows[1], &format).unwrap(),
            b"string2||2015-01-01".to_vec()
        );
    }

    #[test]
    fn json_body_is_an_object_in_column_order() {
        let format = EventFormat {
            body: BodyFormat::Json,
            ..EventFormat::default()
        };
        let rows = sample_rows();

        let body = encode_event_body(&rows[0], &format).unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"{"s":"string1","n":1,"d":"2015-01-01"}"#
        );

        let body = encode_event_body(&rows[1], &format).unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"{"s":"string2","n":null,"d":"2015-01-01"}"#
        );
    }

    #[test]
    fn json_body_ignores_csv_options() {
        let at = NaiveDate::from_ymd_opt(2015, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let row = RowData::new(
            "t",
            vec![
                FieldValue::new("note", "a,b"),
                FieldValue::new("at", Value::DateTime(at)),
            ],
        );
        let format = EventFormat {
            body: BodyFormat::Json,
            delimiter: b';',
            enclose_by_quotes: false,
        };
        let body = encode_event_body(&row, &format).unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"{"note":"a,b","at":"2015-01-01 08:00:00"}"#
        );
    }
}
