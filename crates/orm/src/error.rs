//! Errors raised while compiling a statement, before any SQL runs.

use thiserror::Error;

/// Statement compilation failures.
///
/// These are returned synchronously by the condition compiler, the argument
/// resolver and the paginator. Once converted into an `anyhow::Error` they
/// can be recovered with `downcast_ref::<CompileError>()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A list value was paired with an operator that cannot take a list.
    #[error("unsupported operator `{operator}` for a list value on column `{column}`")]
    UnsupportedListOperator { column: String, operator: String },

    /// Operator text that is not recognised.
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    /// `BETWEEN` needs exactly two values.
    #[error("BETWEEN on column `{column}` expects exactly 2 values, got {count}")]
    BetweenArity { column: String, count: usize },

    /// `LIKE` patterns are built from text or numbers only.
    #[error("unsupported value for `{operator}` on column `{column}`")]
    UnsupportedPattern { column: String, operator: String },

    /// A column or ordering name that is not a plain identifier.
    #[error("invalid identifier `{0}`")]
    InvalidIdentifier(String),

    /// A where-clause or argument list that does not have a recognised shape.
    #[error("invalid condition: {0}")]
    InvalidCondition(String),
}
