//! # Execution adapter
//!
//! Binds a statement's values and runs it on the shared connection. Failures
//! are logged with the table, SQL and parameters, then reported as
//! `table<TABLE> sql execution failed.` with the driver error as the source.

use anyhow::{Result, bail};
use bazaar_store::{Connection, DataType, Row};
use chrono::{DateTime, Utc};
use sea_query::Value;

use crate::statement::Statement;

/// Run `statement` and return every row it produces. Writers return no rows.
///
/// # Errors
///
/// Returns an error if a value cannot be bound, or the statement fails to
/// prepare or execute.
pub async fn exec_sql(
    conn: &dyn Connection, table: &str, statement: Statement,
) -> Result<Vec<Row>> {
    let Statement { sql, values } = statement;
    let result = match values_to_datatypes(&values) {
        Ok(params) => conn.run(sql.clone(), params).await,
        Err(err) => Err(err),
    };
    result.map_err(|err| failed(table, &sql, &values, err))
}

/// Run a writer and return the number of rows it changed.
///
/// # Errors
///
/// Returns an error under the same conditions as [`exec_sql`].
pub async fn exec_sql_affected(
    conn: &dyn Connection, table: &str, statement: Statement,
) -> Result<u64> {
    let Statement { sql, values } = statement;
    let result = match values_to_datatypes(&values) {
        Ok(params) => conn.exec(sql.clone(), params).await,
        Err(err) => Err(err),
    };
    result.map_err(|err| failed(table, &sql, &values, err))
}

fn failed(table: &str, sql: &str, values: &[Value], err: anyhow::Error) -> anyhow::Error {
    tracing::error!(
        table,
        sql = %sql,
        values = ?values,
        error = %err,
        "sql execution failed"
    );
    err.context(format!("table{table} sql execution failed."))
}

/// Run `statement` and return its first row, if any.
///
/// # Errors
///
/// Returns an error under the same conditions as [`exec_sql`].
pub async fn exec_sql_get(
    conn: &dyn Connection, table: &str, statement: Statement,
) -> Result<Option<Row>> {
    Ok(exec_sql(conn, table, statement).await?.into_iter().next())
}

/// Lower bound values to the store's storage classes.
///
/// # Errors
///
/// Returns an error for unsigned values above `i64::MAX` and for value kinds
/// SQLite cannot store.
pub fn values_to_datatypes(values: &[Value]) -> Result<Vec<DataType>> {
    values.iter().map(value_to_datatype).collect()
}

fn value_to_datatype(value: &Value) -> Result<DataType> {
    let data_type = match value {
        Value::Bool(Some(v)) => DataType::Integer(i64::from(*v)),
        Value::TinyInt(Some(v)) => DataType::Integer(i64::from(*v)),
        Value::SmallInt(Some(v)) => DataType::Integer(i64::from(*v)),
        Value::Int(Some(v)) => DataType::Integer(i64::from(*v)),
        Value::BigInt(Some(v)) => DataType::Integer(*v),
        Value::TinyUnsigned(Some(v)) => DataType::Integer(i64::from(*v)),
        Value::SmallUnsigned(Some(v)) => DataType::Integer(i64::from(*v)),
        Value::Unsigned(Some(v)) => DataType::Integer(i64::from(*v)),
        Value::BigUnsigned(Some(v)) => match i64::try_from(*v) {
            Ok(v) => DataType::Integer(v),
            Err(_) => bail!("unsigned value {v} does not fit in a 64-bit integer"),
        },
        Value::Float(Some(v)) => DataType::Real(f64::from(*v)),
        Value::Double(Some(v)) => DataType::Real(*v),
        Value::String(Some(v)) => DataType::Text(v.to_string()),
        Value::Char(Some(v)) => DataType::Text(v.to_string()),
        Value::Bytes(Some(v)) => DataType::Blob(v.to_vec()),
        Value::ChronoDate(Some(v)) => DataType::Text(v.to_string()), // "%Y-%m-%d"
        Value::ChronoTime(Some(v)) => DataType::Text(v.to_string()), // "%H:%M:%S%.f"
        Value::ChronoDateTime(Some(v)) => DataType::Text(v.to_string()), // "%Y-%m-%d %H:%M:%S%.f"
        Value::ChronoDateTimeUtc(Some(v)) => {
            let dt: &DateTime<Utc> = v;
            DataType::Text(dt.to_rfc3339())
        }
        Value::ChronoDateTimeLocal(Some(v)) => DataType::Text(v.to_rfc3339()),
        Value::ChronoDateTimeWithTimeZone(Some(v)) => DataType::Text(v.to_rfc3339()),
        value if crate::condition::is_null(value) => DataType::Null,
        _ => bail!("unsupported values require explicit conversion before binding"),
    };
    Ok(data_type)
}
