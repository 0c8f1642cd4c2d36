//! # Pagination
//!
//! Listing queries run in [`Mode::Api`] unless a caller asks otherwise. In
//! that mode every `SELECT` is suffixed with
//! `ORDER BY <column> <direction> LIMIT ? OFFSET ?`.

use std::fmt;
use std::str::FromStr;

use sea_query::Value;
use serde::{Deserialize, Serialize};

use crate::condition::is_valid_identifier;
use crate::error::CompileError;

/// Page used when none is given.
pub const DEFAULT_PAGE: u64 = 1;

/// Rows per page used when no limit is given.
pub const DEFAULT_LIMIT: u64 = 20;

/// Column ordered by when none is given.
pub const DEFAULT_ORDER_BY: &str = "id";

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Ascending.
    #[serde(alias = "asc")]
    Asc,

    /// Descending.
    #[default]
    #[serde(alias = "desc")]
    Desc,
}

impl Direction {
    /// SQL keyword for the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(CompileError::InvalidCondition(format!("unknown sort direction `{s}`"))),
        }
    }
}

/// Whether listing queries are paginated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Paginated, for callers serving API responses.
    #[default]
    Api,

    /// Unpaginated, for background jobs and administrative exports.
    Internal,
}

impl FromStr for Mode {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "internal" => Ok(Self::Internal),
            _ => Err(CompileError::InvalidCondition(format!("unknown query mode `{s}`"))),
        }
    }
}

/// Pagination descriptor. Every field is optional and falls back to the
/// module defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,

    /// Rows per page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// Column to order by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Sort direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Direction>,
}

impl Pagination {
    /// Descriptor for `page` with `limit` rows per page.
    #[must_use]
    pub const fn page(page: u64, limit: u64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            order_by: None,
            operator: None,
        }
    }

    /// Order by `column` in `direction`.
    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(column.into());
        self.operator = Some(direction);
        self
    }

    /// `(LIMIT, OFFSET)` for the descriptor: `(L, (P - 1) * L)`.
    ///
    /// Pages below 1 are treated as page 1.
    #[must_use]
    pub fn limit_offset(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        (limit, (page - 1).saturating_mul(limit))
    }

    /// Render the `ORDER BY … LIMIT ? OFFSET ?` suffix, pushing limit then
    /// offset onto `values`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidIdentifier`] when the order column is
    /// not a plain identifier.
    pub fn suffix(&self, values: &mut Vec<Value>) -> Result<String, CompileError> {
        let order_by = self.order_by.as_deref().unwrap_or(DEFAULT_ORDER_BY);
        if !is_valid_identifier(order_by) {
            return Err(CompileError::InvalidIdentifier(order_by.to_string()));
        }
        let direction = self.operator.unwrap_or_default();

        let (limit, offset) = self.limit_offset();
        values.push(Value::from(limit));
        values.push(Value::from(offset));

        Ok(format!(" ORDER BY {order_by} {direction} LIMIT ? OFFSET ?"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults() {
        let mut values = Vec::new();
        let sql = Pagination::default().suffix(&mut values).unwrap();
        assert_eq!(sql, " ORDER BY id DESC LIMIT ? OFFSET ?");
        assert_eq!(values, vec![Value::from(20_u64), Value::from(0_u64)]);
    }

    #[test]
    fn offset_arithmetic() {
        assert_eq!(Pagination::page(3, 10).limit_offset(), (10, 20));
        assert_eq!(Pagination::page(1, 50).limit_offset(), (50, 0));
        assert_eq!(Pagination::page(0, 10).limit_offset(), (10, 0));
    }

    #[test]
    fn explicit_order() {
        let mut values = Vec::new();
        let sql = Pagination::page(2, 5)
            .order_by("created_at", Direction::Asc)
            .suffix(&mut values)
            .unwrap();
        assert_eq!(sql, " ORDER BY created_at ASC LIMIT ? OFFSET ?");
        assert_eq!(values, vec![Value::from(5_u64), Value::from(5_u64)]);
    }

    #[test]
    fn order_column_is_validated() {
        let paging = Pagination {
            order_by: Some("id; DROP TABLE users".to_string()),
            ..Pagination::default()
        };
        let err = paging.suffix(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidIdentifier(_)));
    }

    #[test]
    fn deserializes_camel_case() {
        let paging: Pagination =
            serde_json::from_value(json!({"page": 2, "orderBy": "votes", "operator": "asc"}))
                .unwrap();
        assert_eq!(paging.page, Some(2));
        assert_eq!(paging.limit, None);
        assert_eq!(paging.order_by.as_deref(), Some("votes"));
        assert_eq!(paging.operator, Some(Direction::Asc));
    }

    #[test]
    fn mode_parses() {
        assert_eq!("internal".parse::<Mode>().unwrap(), Mode::Internal);
        assert_eq!("API".parse::<Mode>().unwrap(), Mode::Api);
        assert_eq!(Mode::default(), Mode::Api);
    }
}
