//! # Query descriptors
//!
//! [`Query`] names the three parts of a listing call: projected columns,
//! filter and pagination. Callers holding dynamic JSON arguments (request
//! handlers forwarding a body) use [`resolve`], which assigns meaning to up to
//! three positional arguments from their shapes.

use serde_json::Value as Json;

use crate::condition::{Operator, WhereClause, is_valid_identifier};
use crate::error::CompileError;
use crate::page::Pagination;

/// A listing query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Columns to select. Empty selects `*`.
    pub columns: Vec<String>,

    /// Row filter. Empty means no `WHERE`.
    pub filter: WhereClause,

    /// Pagination, applied in API mode only.
    pub pagination: Pagination,
}

impl Query {
    /// A query for every column and row, with default pagination.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `columns` instead of `*`.
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(ToString::to_string).collect();
        self
    }

    /// Filter rows.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<WhereClause>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Paginate with `pagination`.
    #[must_use]
    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// The projection as SQL: `*` or a comma-separated column list.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidIdentifier`] for a column that is not a
    /// plain or table-qualified identifier.
    pub fn projection(&self) -> Result<String, CompileError> {
        if self.columns.is_empty() {
            return Ok("*".to_string());
        }
        if let Some(invalid) = self.columns.iter().find(|c| !is_valid_identifier(c)) {
            return Err(CompileError::InvalidIdentifier(invalid.clone()));
        }
        Ok(self.columns.join(", "))
    }
}

/// Resolve positional `(columns?, where?, options?)` arguments into a
/// [`Query`].
///
/// Trailing `null`s are ignored and a `null` elsewhere means "absent". The
/// first matching rule wins:
///
/// 1. a single object is the pagination descriptor;
/// 2. two arguments with an object second: the first is the filter when it
///    looks like a condition, otherwise the column list;
/// 3. a first argument whose first element is an array is the filter, and
///    the next object argument, if any, is the pagination descriptor;
/// 4. otherwise the arguments are columns, filter and pagination in order.
///
/// # Errors
///
/// Returns a [`CompileError`] when an argument does not parse as the part it
/// was assigned to.
pub fn resolve(args: &[Json]) -> Result<Query, CompileError> {
    let len = args.iter().rposition(|arg| !arg.is_null()).map_or(0, |last| last + 1);
    let args = &args[..len];

    match args {
        [] => Ok(Query::default()),
        [options @ Json::Object(_)] => Ok(Query {
            pagination: parse_options(options)?,
            ..Query::default()
        }),
        [first, options @ Json::Object(_)] => {
            let pagination = parse_options(options)?;
            if looks_like_condition(first) {
                Ok(Query {
                    filter: WhereClause::from_json(first)?,
                    pagination,
                    ..Query::default()
                })
            } else {
                Ok(Query {
                    columns: parse_columns(first)?,
                    pagination,
                    ..Query::default()
                })
            }
        }
        [first, rest @ ..] if first_element_is_array(first) => {
            let pagination = match rest.iter().find(|arg| arg.is_object()) {
                Some(options) => parse_options(options)?,
                None => Pagination::default(),
            };
            Ok(Query {
                filter: WhereClause::from_json(first)?,
                pagination,
                ..Query::default()
            })
        }
        [columns, rest @ ..] => {
            let filter = match rest.first() {
                Some(Json::Null) | None => WhereClause::new(),
                Some(filter) => WhereClause::from_json(filter)?,
            };
            let pagination = match rest.get(1) {
                Some(options) => parse_options(options)?,
                None => Pagination::default(),
            };
            Ok(Query {
                columns: parse_columns(columns)?,
                filter,
                pagination,
            })
        }
    }
}

fn first_element_is_array(json: &Json) -> bool {
    json.as_array().and_then(|items| items.first()).is_some_and(Json::is_array)
}

// A nested clause, or a bare triple whose value is not text or whose third
// element is an operator. A list of plain strings is a column list.
fn looks_like_condition(json: &Json) -> bool {
    let Some(items) = json.as_array() else {
        return false;
    };
    match items.as_slice() {
        [Json::Array(_), ..] => true,
        [Json::String(_), value] => !value.is_string() && !value.is_object(),
        [Json::String(_), value, Json::String(operator)] => {
            !value.is_object()
                && (!value.is_string() || operator.parse::<Operator>().is_ok())
        }
        _ => false,
    }
}

fn parse_columns(json: &Json) -> Result<Vec<String>, CompileError> {
    match json {
        Json::Null => Ok(Vec::new()),
        Json::String(column) => Ok(vec![column.clone()]),
        Json::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(ToString::to_string).ok_or_else(|| {
                    CompileError::InvalidCondition(format!("expected a column name, got {item}"))
                })
            })
            .collect(),
        other => Err(CompileError::InvalidCondition(format!("expected columns, got {other}"))),
    }
}

fn parse_options(json: &Json) -> Result<Pagination, CompileError> {
    if json.is_null() {
        return Ok(Pagination::default());
    }
    serde_json::from_value(json.clone())
        .map_err(|e| CompileError::InvalidCondition(format!("invalid pagination options: {e}")))
}
