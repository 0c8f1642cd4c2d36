//! Embedded `SQLite` backend.
//!
//! One connection serves the whole process. It sits behind a mutex, so every
//! statement from every repository runs to completion before the next starts.

#![allow(clippy::significant_drop_tightening)]

use std::sync::Arc;

use anyhow::{Context, Result};
use bazaar::Backend;
use fromenv::FromEnv;
use futures::FutureExt;
use rusqlite::types::{Value as SqliteValue, ValueRef};
use rusqlite::{Connection as SqliteConnection, params_from_iter};
use tracing::instrument;

use crate::connection::{Connection, FutureResult};
use crate::types::{DataType, Field, Row};

/// Options used to open the database.
///
/// Loaded from environment variables.
#[derive(Debug, Clone, FromEnv)]
pub struct ConnectOptions {
    /// Path or URI of the database. `:memory:` opens a private in-memory
    /// database.
    #[env(from = "SQL_DATABASE", default = "file::memory:?cache=shared")]
    pub database: String,
}

impl bazaar::FromEnv for ConnectOptions {
    fn from_env() -> Result<Self> {
        Self::from_env().finalize().context("issue loading connection options")
    }
}

/// The process-wide `SQLite` connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    // Mutex is necessary since rusqlite::Connection isn't `Sync`
    conn: Arc<parking_lot::Mutex<SqliteConnection>>,
}

impl Backend for SqliteStore {
    type ConnectOptions = ConnectOptions;

    #[instrument]
    async fn connect_with(options: Self::ConnectOptions) -> Result<Self> {
        tracing::debug!("opening SQLite database: {}", options.database);

        let conn =
            SqliteConnection::open(&options.database).context("failed to open SQLite database")?;

        Ok(Self {
            conn: Arc::new(parking_lot::Mutex::new(conn)),
        })
    }
}

impl Connection for SqliteStore {
    fn run(&self, sql: String, params: Vec<DataType>) -> FutureResult<Vec<Row>> {
        tracing::trace!("running statement: {sql}");
        let conn = Arc::clone(&self.conn);

        async move {
            let conn = conn.lock();
            let mut stmt = conn.prepare(&sql).context("failed to prepare statement")?;
            let values: Vec<SqliteValue> = params.iter().map(datatype_to_sqlite_value).collect();

            // writers produce no result columns
            if stmt.column_count() == 0 {
                stmt.execute(params_from_iter(values.iter()))
                    .context("failed to execute statement")?;
                return Ok(Vec::new());
            }

            let column_names: Vec<String> =
                stmt.column_names().iter().map(ToString::to_string).collect();

            let mut rows =
                stmt.query(params_from_iter(values.iter())).context("failed to execute query")?;

            let mut result = Vec::new();
            while let Some(row) = rows.next().context("failed to fetch row")? {
                let mut fields = Vec::with_capacity(column_names.len());
                for (i, name) in column_names.iter().enumerate() {
                    let value = row.get_ref(i).context("failed to get column value")?;
                    fields.push(Field {
                        name: name.clone(),
                        value: sqlite_value_to_datatype(value)?,
                    });
                }
                result.push(Row { fields });
            }

            Ok(result)
        }
        .boxed()
    }

    fn exec(&self, sql: String, params: Vec<DataType>) -> FutureResult<u64> {
        tracing::trace!("executing statement: {sql}");
        let conn = Arc::clone(&self.conn);

        async move {
            let conn = conn.lock();
            let mut stmt = conn.prepare(&sql).context("failed to prepare statement")?;
            let values: Vec<SqliteValue> = params.iter().map(datatype_to_sqlite_value).collect();
            let affected = stmt
                .execute(params_from_iter(values.iter()))
                .context("failed to execute statement")?;
            Ok(u64::try_from(affected)?)
        }
        .boxed()
    }

    fn batch(&self, sql: String) -> FutureResult<()> {
        tracing::trace!("executing batch: {sql}");
        let conn = Arc::clone(&self.conn);

        async move {
            conn.lock().execute_batch(&sql).context("failed to execute batch")?;
            Ok(())
        }
        .boxed()
    }
}

fn datatype_to_sqlite_value(value: &DataType) -> SqliteValue {
    match value {
        DataType::Null => SqliteValue::Null,
        DataType::Integer(i) => SqliteValue::Integer(*i),
        DataType::Real(f) => SqliteValue::Real(*f),
        DataType::Text(s) => SqliteValue::Text(s.clone()),
        DataType::Blob(b) => SqliteValue::Blob(b.clone()),
    }
}

fn sqlite_value_to_datatype(value: ValueRef) -> Result<DataType> {
    match value {
        ValueRef::Null => Ok(DataType::Null),
        ValueRef::Integer(i) => Ok(DataType::Integer(i)),
        ValueRef::Real(f) => Ok(DataType::Real(f)),
        ValueRef::Text(t) => {
            let s = std::str::from_utf8(t).context("invalid UTF-8 in text value")?;
            Ok(DataType::Text(s.to_string()))
        }
        ValueRef::Blob(b) => Ok(DataType::Blob(b.to_vec())),
    }
}
