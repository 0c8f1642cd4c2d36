//! # Repositories
//!
//! One [`Repository`] per entity is opened at start-up over the shared
//! connection and handed to callers. Reads go through a [`Scoped`] view that
//! fixes the query mode for that call only; the repository's own read methods
//! always run in [`Mode::Api`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{Context, Result};
use bazaar_store::{Connection, Row};
use sea_query::{SqliteQueryBuilder, Value};
use serde_json::Value as Json;

use crate::args::{Query, resolve};
use crate::condition::{Connector, WhereClause};
use crate::entity::{Entity, FetchValue, FromRow};
use crate::exec::{exec_sql, exec_sql_affected, exec_sql_get};
use crate::page::Mode;
use crate::statement::{self, Conflict, Fields, Select, Statement, Step};

/// Data access for one entity.
pub struct Repository<E: Entity> {
    conn: Arc<dyn Connection>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository").field("table", &E::TABLE).finish_non_exhaustive()
    }
}

impl<E: Entity> Repository<E> {
    /// Open the repository, creating the entity's table and indexes if they
    /// do not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema statements fail.
    pub async fn open(conn: Arc<dyn Connection>) -> Result<Self> {
        let mut ddl = E::schema().build(SqliteQueryBuilder);
        for index in E::indexes() {
            ddl.push_str(";\n");
            ddl.push_str(&index.build(SqliteQueryBuilder));
        }

        conn.batch(ddl).await.with_context(|| format!("failed to create table {}", E::TABLE))?;
        tracing::debug!(table = E::TABLE, "repository opened");

        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }

    /// The shared connection.
    #[must_use]
    pub const fn connection(&self) -> &Arc<dyn Connection> {
        &self.conn
    }

    /// Reads in `mode`, for this call only.
    #[must_use]
    pub const fn for_mode(&self, mode: Mode) -> Scoped<'_, E> {
        Scoped {
            repo: self,
            mode,
            with_deleted: false,
        }
    }

    /// Reads that include soft-deleted rows, for administrative views.
    #[must_use]
    pub const fn with_deleted(&self) -> Scoped<'_, E> {
        self.for_mode(Mode::Api).with_deleted()
    }

    /// Paginated listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the query does not compile or execution fails.
    pub async fn get(&self, query: &Query) -> Result<Vec<Row>> {
        self.for_mode(Mode::Api).get(query).await
    }

    /// Paginated listing from positional JSON arguments, see
    /// [`resolve`](crate::resolve).
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments do not resolve, the query does not
    /// compile, or execution fails.
    pub async fn get_with(&self, args: &[Json]) -> Result<Vec<Row>> {
        self.for_mode(Mode::Api).get_with(args).await
    }

    /// First row of the paginated listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the query does not compile or execution fails.
    pub async fn first(&self, query: &Query) -> Result<Option<Row>> {
        self.for_mode(Mode::Api).first(query).await
    }

    /// Paginated listing decoded into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row does not decode.
    pub async fn get_as<T: FromRow>(&self, query: &Query) -> Result<Vec<T>> {
        self.for_mode(Mode::Api).get_as(query).await
    }

    /// Number of rows matching `filter`, excluding soft-deleted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter does not compile or execution fails.
    pub async fn count(&self, filter: &WhereClause, connector: Connector) -> Result<i64> {
        self.for_mode(Mode::Api).count(filter, connector).await
    }

    /// Insert a row. Returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if a column name is invalid or execution fails.
    pub async fn insert(&self, fields: &Fields) -> Result<u64> {
        let statement = statement::insert(E::TABLE, fields, Conflict::Abort)?;
        self.execute(statement).await
    }

    /// Insert a row unless it violates a uniqueness constraint. Returns `0`
    /// when the row was ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a column name is invalid or execution fails.
    pub async fn insert_or_ignore(&self, fields: &Fields) -> Result<u64> {
        let statement = statement::insert(E::TABLE, fields, Conflict::Ignore)?;
        self.execute(statement).await
    }

    /// Update matching rows. Fields without a value are left untouched, and
    /// nothing is executed when no field has a value. Returns the number of
    /// rows changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement does not compile or execution fails.
    pub async fn update(
        &self, fields: &Fields, filter: &WhereClause, connector: Connector,
    ) -> Result<u64> {
        let Some(statement) = statement::update(E::TABLE, fields, filter, connector)? else {
            return Ok(0);
        };
        self.execute(statement).await
    }

    /// Add `by` to `column` on matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement does not compile or execution fails.
    pub async fn increment(
        &self, column: &str, by: impl Into<Value> + Send, filter: &WhereClause,
        connector: Connector,
    ) -> Result<u64> {
        let statement =
            statement::step(E::TABLE, column, by.into(), Step::Increment, filter, connector)?;
        self.execute(statement).await
    }

    /// Subtract `by` from `column` on matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement does not compile or execution fails.
    pub async fn decrement(
        &self, column: &str, by: impl Into<Value> + Send, filter: &WhereClause,
        connector: Connector,
    ) -> Result<u64> {
        let statement =
            statement::step(E::TABLE, column, by.into(), Step::Decrement, filter, connector)?;
        self.execute(statement).await
    }

    /// Delete matching rows. Entities with a soft-delete marker are updated
    /// to carry the marker instead. Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement does not compile or execution fails.
    pub async fn delete(&self, filter: &WhereClause, connector: Connector) -> Result<u64> {
        let Some(marker) = E::soft_delete() else {
            return self.destroy(filter, connector).await;
        };

        let fields = Fields::new().set(marker.column, marker.value);
        let Some(statement) = statement::update(E::TABLE, &fields, filter, connector)? else {
            return Ok(0);
        };
        self.execute(statement).await
    }

    /// Remove matching rows, regardless of any soft-delete marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter does not compile or execution fails.
    pub async fn destroy(&self, filter: &WhereClause, connector: Connector) -> Result<u64> {
        let statement = statement::delete(E::TABLE, filter, connector)?;
        self.execute(statement).await
    }

    async fn execute(&self, statement: Statement) -> Result<u64> {
        exec_sql_affected(self.conn.as_ref(), E::TABLE, statement).await
    }
}

/// Reads against a [`Repository`] with a fixed mode.
#[derive(Debug)]
pub struct Scoped<'a, E: Entity> {
    repo: &'a Repository<E>,
    mode: Mode,
    with_deleted: bool,
}

impl<E: Entity> Scoped<'_, E> {
    /// Include soft-deleted rows.
    #[must_use]
    pub const fn with_deleted(mut self) -> Self {
        self.with_deleted = true;
        self
    }

    /// The listing statement for `query`, without executing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the query does not compile.
    pub fn statement(&self, query: &Query) -> Result<Statement> {
        let mut values = Vec::new();
        let source = self.source(&mut values);
        let select = Select {
            query,
            mode: self.mode,
            source: &source,
        };
        let sql = E::select_sql(&select, &mut values)?;

        tracing::debug!(
            table = E::TABLE,
            sql = %sql,
            param_count = values.len(),
            "select generated SQL"
        );
        Ok(Statement { sql, values })
    }

    /// Listing rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query does not compile or execution fails.
    pub async fn get(&self, query: &Query) -> Result<Vec<Row>> {
        let statement = self.statement(query)?;
        exec_sql(self.repo.conn.as_ref(), E::TABLE, statement).await
    }

    /// Listing rows from positional JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments do not resolve, the query does not
    /// compile, or execution fails.
    pub async fn get_with(&self, args: &[Json]) -> Result<Vec<Row>> {
        let query = resolve(args)?;
        self.get(&query).await
    }

    /// First listing row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query does not compile or execution fails.
    pub async fn first(&self, query: &Query) -> Result<Option<Row>> {
        let statement = self.statement(query)?;
        exec_sql_get(self.repo.conn.as_ref(), E::TABLE, statement).await
    }

    /// Listing rows decoded into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row does not decode.
    pub async fn get_as<T: FromRow>(&self, query: &Query) -> Result<Vec<T>> {
        self.get(query).await?.iter().map(T::from_row).collect()
    }

    /// Number of rows matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter does not compile or execution fails.
    pub async fn count(&self, filter: &WhereClause, connector: Connector) -> Result<i64> {
        let mut values = Vec::new();
        let source = self.source(&mut values);
        let statement = statement::count(&source, values, filter, connector)?;

        let row = exec_sql_get(self.repo.conn.as_ref(), E::TABLE, statement).await?;
        row.map_or(Ok(0), |row| i64::fetch(&row, "count"))
    }

    // the entity's table, minus soft-deleted rows unless asked for
    fn source(&self, values: &mut Vec<Value>) -> String {
        match E::soft_delete() {
            Some(marker) if !self.with_deleted => {
                values.push(marker.value);
                format!(
                    "(SELECT * FROM {table} WHERE {column} IS NOT ?) AS {table}",
                    table = E::TABLE,
                    column = marker.column
                )
            }
            _ => E::TABLE.to_string(),
        }
    }
}
