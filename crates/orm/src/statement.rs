//! # Statement builder
//!
//! Assembles the SQL for every repository operation. Filters are compiled
//! with the condition compiler, so the bound values of a statement are
//! ordered as: assignments, then filter values, then pagination values.

use sea_query::Value;

use crate::args::Query;
use crate::condition::{Connector, WhereClause, compile, is_valid_identifier};
use crate::error::CompileError;
use crate::page::Mode;

/// SQL text and its positional parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    /// SQL with `?` placeholders.
    pub sql: String,

    /// Values bound to the placeholders, in order.
    pub values: Vec<Value>,
}

/// Inputs to a `SELECT`, handed to [`Entity::select_sql`](crate::Entity::select_sql).
#[derive(Debug, Clone, Copy)]
pub struct Select<'a> {
    /// Columns, filter and pagination.
    pub query: &'a Query,

    /// Whether to paginate.
    pub mode: Mode,

    /// The entity's table, or a subquery over it that hides soft-deleted
    /// rows. Any values it binds are already in the value vector.
    pub source: &'a str,
}

impl Select<'_> {
    /// Render the listing from [`Select::source`].
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] if the projection, filter or ordering does
    /// not compile.
    pub fn to_sql(&self, values: &mut Vec<Value>) -> Result<String, CompileError> {
        self.to_sql_from(self.source, values)
    }

    /// Render `SELECT <columns> FROM <source> [WHERE …] [ORDER BY … LIMIT ?
    /// OFFSET ?]`.
    ///
    /// `source` is a table name or a parenthesized subquery with an alias.
    /// The pagination suffix is only added in [`Mode::Api`].
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] if the projection, filter or ordering does
    /// not compile.
    pub fn to_sql_from(
        &self, source: &str, values: &mut Vec<Value>,
    ) -> Result<String, CompileError> {
        let mut sql = format!("SELECT {} FROM {source}", self.query.projection()?);
        sql.push_str(&where_sql(&self.query.filter, Connector::And, values)?);
        if self.mode == Mode::Api {
            sql.push_str(&self.query.pagination.suffix(values)?);
        }
        Ok(sql)
    }
}

/// Ordered column assignments for `INSERT` and `UPDATE`.
///
/// A column added with [`Fields::maybe`] and no value is skipped entirely.
/// To write `NULL`, use [`Fields::set`] with a `None` option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Option<Value>)>,
}

impl Fields {
    /// No assignments.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Assign `value` to `column`.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((column.into(), Some(value.into())));
        self
    }

    /// Assign `value` to `column` when present, otherwise leave the column
    /// untouched.
    #[must_use]
    pub fn maybe<V: Into<Value>>(mut self, column: impl Into<String>, value: Option<V>) -> Self {
        self.entries.push((column.into(), value.map(Into::into)));
        self
    }

    /// Whether no column has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, value)| value.is_none())
    }

    fn present(&self) -> Result<Vec<(&str, &Value)>, CompileError> {
        let mut present = Vec::with_capacity(self.entries.len());
        for (column, value) in &self.entries {
            let Some(value) = value else {
                continue;
            };
            if !is_valid_identifier(column) {
                return Err(CompileError::InvalidIdentifier(column.clone()));
            }
            present.push((column.as_str(), value));
        }
        Ok(present)
    }
}

/// Conflict handling for `INSERT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Conflict {
    /// Fail on constraint violations.
    #[default]
    Abort,

    /// `INSERT OR IGNORE`: silently skip rows that violate a constraint.
    Ignore,
}

/// Direction of an in-place counter update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `column = column + ?`
    Increment,

    /// `column = column - ?`
    Decrement,
}

/// `" WHERE (…)"`, or an empty string for an empty clause.
///
/// # Errors
///
/// Returns a [`CompileError`] if the clause does not compile.
pub fn where_sql(
    filter: &WhereClause, connector: Connector, values: &mut Vec<Value>,
) -> Result<String, CompileError> {
    let compiled = compile(filter, connector, values)?;
    if compiled.is_empty() {
        return Ok(String::new());
    }
    Ok(format!(" WHERE {compiled}"))
}

/// `SELECT COUNT(*) as count FROM <source> [WHERE …]`
///
/// `values` holds any values already bound by `source`.
///
/// # Errors
///
/// Returns a [`CompileError`] if the filter does not compile.
pub fn count(
    source: &str, mut values: Vec<Value>, filter: &WhereClause, connector: Connector,
) -> Result<Statement, CompileError> {
    let filter = where_sql(filter, connector, &mut values)?;
    let sql = format!("SELECT COUNT(*) as count FROM {source}{filter}");

    tracing::debug!(source, sql = %sql, param_count = values.len(), "count generated SQL");
    Ok(Statement { sql, values })
}

/// `INSERT [OR IGNORE] INTO <table> (…) VALUES (…)`
///
/// Columns without a value are skipped. With no columns at all the row is
/// inserted with `DEFAULT VALUES`.
///
/// # Errors
///
/// Returns [`CompileError::InvalidIdentifier`] for an invalid column name.
pub fn insert(table: &str, fields: &Fields, conflict: Conflict) -> Result<Statement, CompileError> {
    let verb = match conflict {
        Conflict::Abort => "INSERT INTO",
        Conflict::Ignore => "INSERT OR IGNORE INTO",
    };

    let present = fields.present()?;
    let sql = if present.is_empty() {
        format!("{verb} {table} DEFAULT VALUES")
    } else {
        let columns = present.iter().map(|(column, _)| *column).collect::<Vec<_>>().join(", ");
        let placeholders = vec!["?"; present.len()].join(", ");
        format!("{verb} {table} ({columns}) VALUES ({placeholders})")
    };
    let values: Vec<Value> = present.into_iter().map(|(_, value)| value.clone()).collect();

    tracing::debug!(table, sql = %sql, param_count = values.len(), "insert generated SQL");
    Ok(Statement { sql, values })
}

/// `UPDATE <table> SET a = ?, … [WHERE …]`
///
/// Returns `None` when no field has a value, in which case nothing should be
/// executed.
///
/// # Errors
///
/// Returns a [`CompileError`] for an invalid column name or a filter that
/// does not compile.
pub fn update(
    table: &str, fields: &Fields, filter: &WhereClause, connector: Connector,
) -> Result<Option<Statement>, CompileError> {
    let present = fields.present()?;
    if present.is_empty() {
        tracing::debug!(table, "update skipped, no fields to set");
        return Ok(None);
    }

    let assignments =
        present.iter().map(|(column, _)| format!("{column} = ?")).collect::<Vec<_>>().join(", ");
    let mut values: Vec<Value> = present.into_iter().map(|(_, value)| value.clone()).collect();
    let filter = where_sql(filter, connector, &mut values)?;
    let sql = format!("UPDATE {table} SET {assignments}{filter}");

    tracing::debug!(table, sql = %sql, param_count = values.len(), "update generated SQL");
    Ok(Some(Statement { sql, values }))
}

/// `UPDATE <table> SET <column> = <column> ± ? [WHERE …]`
///
/// The delta is bound first. The arithmetic runs inside the database, so
/// concurrent steps never lose updates.
///
/// # Errors
///
/// Returns a [`CompileError`] for an invalid column name or a filter that
/// does not compile.
pub fn step(
    table: &str, column: &str, delta: Value, step: Step, filter: &WhereClause,
    connector: Connector,
) -> Result<Statement, CompileError> {
    if !is_valid_identifier(column) {
        return Err(CompileError::InvalidIdentifier(column.to_string()));
    }
    let sign = match step {
        Step::Increment => '+',
        Step::Decrement => '-',
    };

    let mut values = vec![delta];
    let sql = format!(
        "UPDATE {table} SET {column} = {column} {sign} ?{}",
        where_sql(filter, connector, &mut values)?
    );

    tracing::debug!(table, sql = %sql, param_count = values.len(), "step generated SQL");
    Ok(Statement { sql, values })
}

/// `DELETE FROM <table> [WHERE …]`
///
/// # Errors
///
/// Returns a [`CompileError`] if the filter does not compile.
pub fn delete(
    table: &str, filter: &WhereClause, connector: Connector,
) -> Result<Statement, CompileError> {
    let mut values = Vec::new();
    let filter = where_sql(filter, connector, &mut values)?;
    let sql = format!("DELETE FROM {table}{filter}");

    tracing::debug!(table, sql = %sql, param_count = values.len(), "delete generated SQL");
    Ok(Statement { sql, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;

    #[test]
    fn empty_filter_has_no_where() {
        let statement = delete("votes", &WhereClause::new(), Connector::And).unwrap();
        assert_eq!(statement.sql, "DELETE FROM votes");
        assert!(statement.values.is_empty());
    }

    #[test]
    fn update_skips_absent_fields() {
        let fields = Fields::new().maybe("name", Some("renamed")).maybe("price", None::<f64>);
        let filter = Condition::eq("id", 1).into();
        let statement = update("plugins", &fields, &filter, Connector::And).unwrap().unwrap();
        assert_eq!(statement.sql, "UPDATE plugins SET name = ? WHERE (id = ?)");
        assert_eq!(statement.values, vec![Value::from("renamed"), Value::from(1)]);
    }

    #[test]
    fn update_without_fields_is_skipped() {
        let fields = Fields::new().maybe("name", None::<String>);
        let statement =
            update("plugins", &fields, &Condition::eq("id", 1).into(), Connector::And).unwrap();
        assert!(statement.is_none());
    }

    #[test]
    fn set_none_writes_null() {
        let fields = Fields::new().set("deleted_at", None::<String>);
        assert!(!fields.is_empty());
        let statement = insert("plugins", &fields, Conflict::Abort).unwrap();
        assert_eq!(statement.sql, "INSERT INTO plugins (deleted_at) VALUES (?)");
    }

    #[test]
    fn insert_without_fields_uses_defaults() {
        let statement = insert("orders", &Fields::new(), Conflict::Ignore).unwrap();
        assert_eq!(statement.sql, "INSERT OR IGNORE INTO orders DEFAULT VALUES");
    }

    #[test]
    fn step_binds_delta_first() {
        let statement = step(
            "plugins",
            "downloads",
            Value::from(1),
            Step::Increment,
            &Condition::eq("id", 9).into(),
            Connector::And,
        )
        .unwrap();
        assert_eq!(statement.sql, "UPDATE plugins SET downloads = downloads + ? WHERE (id = ?)");
        assert_eq!(statement.values, vec![Value::from(1), Value::from(9)]);
    }
}
