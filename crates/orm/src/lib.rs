//! Generic relational data-access layer for the Bazaar marketplace.
//!
//! Every marketplace table is reached through a [`Repository`] over an
//! [`Entity`]. Repositories compile filters, pagination and assignments into
//! parameterized SQL and run it on the single shared connection.
//!
//! # Quick Start
//!
//! ## Define an Entity
//!
//! ```ignore
//! use bazaar_orm::schema::{Alias, ColumnDef, Table, TableCreateStatement};
//!
//! pub struct Category;
//!
//! impl Category {
//!     pub const ID: &'static str = "id";
//!     pub const NAME: &'static str = "name";
//! }
//!
//! impl Entity for Category {
//!     const TABLE: &'static str = "categories";
//!
//!     fn schema() -> TableCreateStatement {
//!         Table::create()
//!             .table(Alias::new(Self::TABLE))
//!             .if_not_exists()
//!             .col(ColumnDef::new(Alias::new(Self::ID)).integer().primary_key().auto_increment())
//!             .col(ColumnDef::new(Alias::new(Self::NAME)).string().not_null())
//!             .to_owned()
//!     }
//!
//!     fn columns() -> &'static [&'static str] {
//!         &[Self::ID, Self::NAME]
//!     }
//! }
//! ```
//!
//! ## Read
//!
//! ```ignore
//! let categories = Repository::<Category>::open(conn).await?;
//!
//! // SELECT id, name FROM categories WHERE ((name LIKE ? OR id IN (?, ?)))
//! //     ORDER BY name ASC LIMIT ? OFFSET ?
//! let query = Query::new()
//!     .columns(Category::columns())
//!     .filter(WhereClause::from(Condition::like(Category::NAME, "theme")).or(Condition::list(Category::ID, [1, 2])))
//!     .paginate(Pagination::page(1, 10).order_by(Category::NAME, Direction::Asc));
//! let rows = categories.get(&query).await?;
//!
//! // every row, unpaginated
//! let all = categories.for_mode(Mode::Internal).get(&Query::new()).await?;
//! ```
//!
//! ## Write
//!
//! ```ignore
//! categories.insert(&Fields::new().set(Category::NAME, "Themes")).await?;
//! categories
//!     .update(&Fields::new().maybe(Category::NAME, renamed), &Condition::eq(Category::ID, 1).into(), Connector::And)
//!     .await?;
//! plugins.increment(Plugin::DOWNLOADS, 1, &Condition::eq(Plugin::ID, id).into(), Connector::And).await?;
//! ```

mod args;
mod condition;
mod entity;
mod error;
mod exec;
mod page;
mod repository;
mod statement;

pub use args::{Query, resolve};
// Re-export store types used in rows and custom value conversions.
pub use bazaar_store::{Connection, DataType, Field, Row, into_json};
pub use condition::{
    Condition, Connector, Operand, Operator, Term, WhereClause, compile, is_null,
    is_valid_identifier,
};
pub use entity::{Entity, FetchValue, FromRow, SoftDelete};
pub use error::CompileError;
pub use exec::{exec_sql, exec_sql_affected, exec_sql_get, values_to_datatypes};
pub use page::{DEFAULT_LIMIT, DEFAULT_ORDER_BY, DEFAULT_PAGE, Direction, Mode, Pagination};
pub use repository::{Repository, Scoped};
pub use sea_query::Value;
pub use statement::{Conflict, Fields, Select, Statement, Step, where_sql};

/// Schema building blocks for [`Entity::schema`] and [`Entity::indexes`].
pub mod schema {
    pub use sea_query::{
        Alias, ColumnDef, Expr, Index, IndexCreateStatement, Table, TableCreateStatement,
    };
}

/// Statement builders, one per repository operation.
pub mod build {
    pub use crate::statement::{count, delete, insert, step, update};
}

// Re-exports for `record` macro use only.
#[doc(hidden)]
pub mod __private {
    pub use anyhow;
}
