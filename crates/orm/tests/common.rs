//! Common test helpers shared across integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::anyhow;
use bazaar::{Backend, FutureResult};
use bazaar_orm::schema::{Alias, ColumnDef, Index, IndexCreateStatement, Table, TableCreateStatement};
use bazaar_orm::{
    CompileError, Connection, DataType, Entity, Field, Row, Select, SoftDelete, Value, record,
};
use bazaar_store::{ConnectOptions, SqliteStore};
use futures::FutureExt;
use parking_lot::Mutex;

// Common test entities used across multiple test files

pub struct Item;

impl Item {
    pub const ID: &'static str = "id";
    pub const NAME: &'static str = "name";
    pub const STOCK: &'static str = "stock";
    pub const PRICE: &'static str = "price";
}

impl Entity for Item {
    const TABLE: &'static str = "items";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(ColumnDef::new(Alias::new(Self::ID)).integer().not_null().primary_key().auto_increment())
            .col(ColumnDef::new(Alias::new(Self::NAME)).string().not_null())
            .col(ColumnDef::new(Alias::new(Self::STOCK)).integer().not_null().default(0))
            .col(ColumnDef::new(Alias::new(Self::PRICE)).double())
            .to_owned()
    }

    fn indexes() -> Vec<IndexCreateStatement> {
        vec![
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_items_name")
                .table(Alias::new(Self::TABLE))
                .col(Alias::new(Self::NAME))
                .to_owned(),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &[Self::ID, Self::NAME, Self::STOCK, Self::PRICE]
    }

    fn min_columns() -> &'static [&'static str] {
        &[Self::ID, Self::NAME]
    }
}

pub struct Post;

impl Post {
    pub const ID: &'static str = "id";
    pub const TITLE: &'static str = "title";
    pub const STATUS: &'static str = "status";
}

impl Entity for Post {
    const TABLE: &'static str = "posts";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(ColumnDef::new(Alias::new(Self::ID)).integer().not_null().primary_key().auto_increment())
            .col(ColumnDef::new(Alias::new(Self::TITLE)).string().not_null())
            .col(ColumnDef::new(Alias::new(Self::STATUS)).string().not_null().default("draft"))
            .to_owned()
    }

    fn columns() -> &'static [&'static str] {
        &[Self::ID, Self::TITLE, Self::STATUS]
    }

    fn soft_delete() -> Option<SoftDelete> {
        Some(SoftDelete {
            column: Self::STATUS,
            value: Value::from("deleted"),
        })
    }
}

pub struct Note;

impl Note {
    pub const ID: &'static str = "id";
    pub const ITEM_ID: &'static str = "item_id";
    pub const BODY: &'static str = "body";
    pub const ITEM_NAME: &'static str = "item_name";
}

impl Entity for Note {
    const TABLE: &'static str = "notes";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(ColumnDef::new(Alias::new(Self::ID)).integer().not_null().primary_key().auto_increment())
            .col(ColumnDef::new(Alias::new(Self::ITEM_ID)).integer().not_null())
            .col(ColumnDef::new(Alias::new(Self::BODY)).text().not_null())
            .to_owned()
    }

    fn columns() -> &'static [&'static str] {
        &[Self::ID, Self::ITEM_ID, Self::BODY, Self::ITEM_NAME]
    }

    fn select_sql(select: &Select<'_>, values: &mut Vec<Value>) -> Result<String, CompileError> {
        let source = format!(
            "(SELECT notes.*, items.name AS item_name FROM {} LEFT JOIN items ON items.id = notes.item_id) AS notes",
            select.source
        );
        select.to_sql_from(&source, values)
    }
}

record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct ItemRow {
        pub id: i64,
        pub name: String,
        pub stock: i64,
        pub price: Option<f64>,
    }
}

/// Connection double that records statements and answers with canned rows.
#[derive(Debug, Default)]
pub struct Recorder {
    pub statements: Mutex<Vec<(String, Vec<DataType>)>>,
    pub batches: Mutex<Vec<String>>,
    pub rows: Vec<Row>,
    /// Rows every writer reports as changed.
    pub affected: u64,
}

impl Recorder {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn sql(&self) -> Vec<String> {
        self.statements.lock().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn params(&self, index: usize) -> Vec<DataType> {
        self.statements.lock()[index].1.clone()
    }
}

impl Connection for Recorder {
    fn run(&self, sql: String, params: Vec<DataType>) -> FutureResult<Vec<Row>> {
        self.statements.lock().push((sql, params));
        let rows = self.rows.clone();
        async move { Ok(rows) }.boxed()
    }

    fn exec(&self, sql: String, params: Vec<DataType>) -> FutureResult<u64> {
        self.statements.lock().push((sql, params));
        let affected = self.affected;
        async move { Ok(affected) }.boxed()
    }

    fn batch(&self, sql: String) -> FutureResult<()> {
        self.batches.lock().push(sql);
        async { Ok(()) }.boxed()
    }
}

/// Connection double whose statements always fail.
#[derive(Debug, Default)]
pub struct Failing;

impl Connection for Failing {
    fn run(&self, _sql: String, _params: Vec<DataType>) -> FutureResult<Vec<Row>> {
        async { Err(anyhow!("no such column: missing")) }.boxed()
    }

    fn exec(&self, _sql: String, _params: Vec<DataType>) -> FutureResult<u64> {
        async { Err(anyhow!("no such column: missing")) }.boxed()
    }

    fn batch(&self, _sql: String) -> FutureResult<()> {
        async { Ok(()) }.boxed()
    }
}

pub fn recorder() -> (Arc<Recorder>, Arc<dyn Connection>) {
    let recorder = Arc::new(Recorder::default());
    let conn: Arc<dyn Connection> = Arc::clone(&recorder) as Arc<dyn Connection>;
    (recorder, conn)
}

/// A private in-memory database.
///
/// Also installs the subscriber so `RUST_LOG=bazaar_orm=debug` prints the
/// generated SQL.
pub async fn memory() -> Arc<dyn Connection> {
    // only the first test in the binary gets to install it
    let _ = bazaar::telemetry::init();

    let store = SqliteStore::connect_with(ConnectOptions {
        database: ":memory:".to_string(),
    })
    .await
    .expect("connect");
    Arc::new(store)
}

pub fn count_row(count: i64) -> Row {
    Row {
        fields: vec![Field {
            name: "count".to_string(),
            value: DataType::Integer(count),
        }],
    }
}

/// Normalize SQL by collapsing whitespace.
fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Assert that SQL contains all expected fragments in order.
///
/// Whitespace is normalized on both sides, so fragments may be written across
/// several lines.
#[allow(clippy::missing_panics_doc)]
pub fn assert_sql_contains(actual: &str, fragments: &[&str]) {
    let actual = normalize_sql(actual);
    let mut search_start = 0usize;

    for fragment in fragments {
        let fragment = normalize_sql(fragment);
        if fragment.is_empty() {
            continue;
        }

        if let Some(pos) = actual[search_start..].find(&fragment) {
            search_start += pos + fragment.len();
        } else {
            panic!("expected SQL fragment `{fragment}` not found in `{actual}`");
        }
    }
}
