use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};

/// One result-set row: ordered field values, one per selected column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowData {
    pub entity: String,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(entity: &str, field_values: Vec<FieldValue>) -> Self {
        RowData {
            entity: entity.to_string(),
            field_values,
        }
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

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.field_values.iter().map(|f| &f.value)
    }

    pub fn len(&self) -> usize {
        self.field_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_values.is_empty()
    }
}

/// Text rendering of a [`RowData`], same column order. `None` marks SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedRow {
    fields: Vec<Option<String>>,
}

impl SerializedRow {
    pub fn new(fields: Vec<Option<String>>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Option<String>] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields as plain strings, substituting `null_marker` for NULLs.
    pub fn to_strings(&self, null_marker: &str) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.clone().unwrap_or_else(|| null_marker.to_string()))
            .collect()
    }
}
