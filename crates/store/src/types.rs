use anyhow::Result;
use base64ct::{Base64, Encoding};
use serde_json::Value;

/// A value bound to, or read from, an SQLite statement.
///
/// The variants follow SQLite's storage classes. Booleans and timestamps are
/// stored as `Integer` and `Text` respectively.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    /// SQL `NULL`.
    Null,

    /// 64-bit signed integer.
    Integer(i64),

    /// 64-bit float.
    Real(f64),

    /// UTF-8 text.
    Text(String),

    /// Raw bytes.
    Blob(Vec<u8>),
}

impl DataType {
    /// Whether this is SQL `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A named column value within a [`Row`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Column name, or alias, as reported by the statement.
    pub name: String,

    /// Column value.
    pub value: DataType,
}

/// A single result row, with fields in statement column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// The row's fields.
    pub fields: Vec<Field>,
}

impl Row {
    /// Look up a field value by column name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DataType> {
        self.fields.iter().find(|field| field.name == name).map(|field| &field.value)
    }
}

/// Render rows as a JSON array of objects keyed by column name.
///
/// Blobs are base64 encoded and non-finite floats become `null`.
///
/// # Errors
/// Transforms into JSON value types fail.
pub fn into_json(rows: Vec<Row>) -> Result<Value> {
    let json_rows: Vec<Value> = rows
        .into_iter()
        .map(|row| {
            let mut map = serde_json::Map::new();
            for field in row.fields {
                let json_value = match field.value {
                    DataType::Null => Value::Null,
                    DataType::Integer(v) => Value::Number(v.into()),
                    DataType::Real(v) => {
                        serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
                    }
                    DataType::Text(v) => Value::String(v),
                    DataType::Blob(v) => Value::String(Base64::encode_string(&v)),
                };
                map.insert(field.name, json_value);
            }
            Value::Object(map)
        })
        .collect();

    Ok(Value::Array(json_rows))
}
