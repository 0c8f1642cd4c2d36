use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_query::{IndexCreateStatement, TableCreateStatement, Value};

use crate::error::CompileError;
use crate::statement::Select;
use crate::{DataType, Row};

/// Binds a repository to a table.
///
/// Implementors declare the table, its schema and the column subsets callers
/// project. Entities that need joined or computed columns override
/// [`Entity::select_sql`]; entities that keep deleted rows override
/// [`Entity::soft_delete`].
pub trait Entity: Send + Sync + 'static {
    /// The database table name for this entity.
    const TABLE: &'static str;

    /// `CREATE TABLE IF NOT EXISTS` statement, run when the repository opens.
    fn schema() -> TableCreateStatement;

    /// Index statements run after the table is created.
    #[must_use]
    fn indexes() -> Vec<IndexCreateStatement> {
        Vec::new()
    }

    /// Default projection.
    fn columns() -> &'static [&'static str];

    /// Projection safe to return to any caller.
    #[must_use]
    fn safe_columns() -> &'static [&'static str] {
        Self::columns()
    }

    /// Minimal projection for lists and references.
    #[must_use]
    fn min_columns() -> &'static [&'static str] {
        Self::columns()
    }

    /// Every column, including sensitive ones.
    #[must_use]
    fn all_columns() -> &'static [&'static str] {
        Self::columns()
    }

    /// When set, `delete` marks rows instead of removing them and listings
    /// exclude marked rows.
    #[must_use]
    fn soft_delete() -> Option<SoftDelete> {
        None
    }

    /// Build the `SELECT` for a listing.
    ///
    /// The default selects from [`Select::source`]. Overrides typically wrap
    /// the source in a subquery that adds joined or derived columns, then
    /// hand that to [`Select::to_sql_from`].
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] if the projection, filter or ordering does
    /// not compile.
    fn select_sql(select: &Select<'_>, values: &mut Vec<Value>) -> Result<String, CompileError> {
        select.to_sql(values)
    }
}

/// The marker written by a soft delete.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftDelete {
    /// Column holding the marker, usually `status`.
    pub column: &'static str,

    /// Value marking a row as deleted.
    pub value: Value,
}

/// Trait for types that can be extracted from database rows.
///
/// This trait is implemented for the standard Rust types that can be
/// fetched from a database row (`i64`, `String`, `DateTime`, etc.).
pub trait FetchValue: Sized {
    /// Fetch a value from a row by column name.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or the value cannot be converted to the target type.
    fn fetch(row: &Row, col: &str) -> Result<Self>;
}

/// Types decoded from a whole row. Usually implemented with [`record!`](crate::record).
pub trait FromRow: Sized {
    /// Decode a row.
    ///
    /// # Errors
    ///
    /// Returns an error if any required column is missing or cannot be converted to the expected type.
    fn from_row(row: &Row) -> Result<Self>;
}

/// Declares a struct decoded from rows by column name.
///
/// # Examples
///
/// ```ignore
/// record! {
///     #[derive(Debug, Clone)]
///     pub struct PluginCard {
///         pub id: i64,
///         pub name: String,
///         pub author: Option<String>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        pub struct $struct_name:ident {
            $(
                $(#[$field_meta:meta])*
                pub $field_name:ident : $field_type:ty
            ),* $(,)?
        }
    ) => {
        #[allow(missing_docs)]
        $(#[$meta])*
        pub struct $struct_name {
            $(
                $(#[$field_meta])*
                pub $field_name : $field_type
            ),*
        }

        impl $crate::FromRow for $struct_name {
            fn from_row(row: &$crate::Row) -> $crate::__private::anyhow::Result<Self> {
                Ok(Self {
                    $(
                        $field_name: <$field_type as $crate::FetchValue>::fetch(row, stringify!($field_name))?,
                    )*
                })
            }
        }
    };
}

// Inbound conversion
impl FetchValue for bool {
    fn fetch(row: &Row, col: &str) -> Result<Self> {
        Ok(as_i64(row_field(row, col)?)? != 0)
    }
}

impl FetchValue for i32 {
    fn fetch(row: &Row, col: &str) -> Result<Self> {
        let value = as_i64(row_field(row, col)?)?;
        Self::try_from(value).map_err(|e| anyhow!("column '{col}' out of range for i32: {e}"))
    }
}

impl FetchValue for i64 {
    fn fetch(row: &Row, col: &str) -> Result<Self> {
        as_i64(row_field(row, col)?)
    }
}

impl FetchValue for u32 {
    fn fetch(row: &Row, col: &str) -> Result<Self> {
        let value = as_i64(row_field(row, col)?)?;
        Self::try_from(value).map_err(|e| anyhow!("column '{col}' out of range for u32: {e}"))
    }
}

impl FetchValue for u64 {
    fn fetch(row: &Row, col: &str) -> Result<Self> {
        let value = as_i64(row_field(row, col)?)?;
        Self::try_from(value).map_err(|e| anyhow!("column '{col}' out of range for u64: {e}"))
    }
}

impl FetchValue for f64 {
    fn fetch(row: &Row, col: &str) -> Result<Self> {
        as_f64(row_field(row, col)?)
    }
}

impl FetchValue for String {
    fn fetch(row: &Row, col: &str) -> Result<Self> {
        as_string(row_field(row, col)?)
    }
}

impl FetchValue for Vec<u8> {
    fn fetch(row: &Row, col: &str) -> Result<Self> {
        as_binary(row_field(row, col)?)
    }
}

impl FetchValue for DateTime<Utc> {
    fn fetch(row: &Row, col: &str) -> Result<Self> {
        as_timestamp(row_field(row, col)?)
    }
}

impl FetchValue for NaiveDate {
    fn fetch(row: &Row, col: &str) -> Result<Self> {
        as_date(row_field(row, col)?)
    }
}

impl FetchValue for serde_json::Value {
    fn fetch(row: &Row, col: &str) -> Result<Self> {
        as_json(row_field(row, col)?)
    }
}

impl<T: FetchValue> FetchValue for Option<T> {
    fn fetch(row: &Row, col: &str) -> Result<Self> {
        match row_field(row, col) {
            Ok(field) if !field.is_null() => Ok(Some(T::fetch(row, col)?)),
            _ => Ok(None),
        }
    }
}

fn row_field<'a>(row: &'a Row, name: &str) -> Result<&'a DataType> {
    row.get(name).ok_or_else(|| anyhow!("missing column '{name}'"))
}

fn as_i64(value: &DataType) -> Result<i64> {
    match value {
        DataType::Integer(v) => Ok(*v),
        _ => bail!("expected integer data type"),
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(value: &DataType) -> Result<f64> {
    match value {
        DataType::Real(v) => Ok(*v),
        // SQLite stores whole-valued REAL columns as integers
        DataType::Integer(v) => Ok(*v as f64),
        _ => bail!("expected real data type"),
    }
}

fn as_string(value: &DataType) -> Result<String> {
    match value {
        DataType::Text(raw) => Ok(raw.clone()),
        _ => bail!("expected text data type"),
    }
}

fn as_binary(value: &DataType) -> Result<Vec<u8>> {
    match value {
        DataType::Blob(bytes) => Ok(bytes.clone()),
        _ => bail!("expected blob data type"),
    }
}

fn as_timestamp(value: &DataType) -> Result<DateTime<Utc>> {
    let DataType::Text(raw) = value else {
        bail!("expected timestamp text");
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    // CURRENT_TIMESTAMP yields "%Y-%m-%d %H:%M:%S"
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(parsed, Utc));
        }
    }

    bail!("unsupported timestamp: {raw}; expected RFC3339 or \"%Y-%m-%d %H:%M:%S%.f\" format")
}

fn as_date(value: &DataType) -> Result<NaiveDate> {
    match value {
        DataType::Text(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_e| anyhow!("unsupported date: {raw}; expected \"%Y-%m-%d\" format")),
        _ => bail!("expected date text"),
    }
}

fn as_json(value: &DataType) -> Result<serde_json::Value> {
    match value {
        DataType::Text(raw) => Ok(serde_json::from_str(raw)?),
        DataType::Blob(bytes) => Ok(serde_json::from_slice(bytes)?),
        _ => bail!("expected json compatible data type"),
    }
}
