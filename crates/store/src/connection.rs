use std::fmt::Debug;

pub use bazaar::FutureResult;

use crate::types::{DataType, Row};

/// Storage providers implement [`Connection`] to execute SQL statements on
/// behalf of the ORM layer.
pub trait Connection: Debug + Send + Sync + 'static {
    /// Prepare and run a single statement with positional parameters.
    ///
    /// Statements that produce result columns return every row. Statements
    /// that do not (`INSERT`, `UPDATE`, `DELETE`) are executed and return an
    /// empty vector.
    fn run(&self, sql: String, params: Vec<DataType>) -> FutureResult<Vec<Row>>;

    /// Run a single writer (`INSERT`, `UPDATE`, `DELETE`) and return the
    /// number of rows it changed. An `INSERT OR IGNORE` that hit a conflict
    /// changes none.
    fn exec(&self, sql: String, params: Vec<DataType>) -> FutureResult<u64>;

    /// Execute one or more parameterless statements, such as schema DDL.
    fn batch(&self, sql: String) -> FutureResult<()>;
}
