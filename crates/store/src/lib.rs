#![doc = include_str!("../README.md")]

mod connection;
mod sqlite;
mod types;

pub use self::connection::Connection;
pub use self::sqlite::{ConnectOptions, SqliteStore};
pub use self::types::{DataType, Field, Row, into_json};
