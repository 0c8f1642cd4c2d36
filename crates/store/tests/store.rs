//! Integration tests for the `SQLite` store.

#![allow(missing_docs)]

use bazaar::Backend;
use bazaar_store::{Connection, DataType, SqliteStore, into_json};
use serde_json::json;

#[tokio::test]
async fn connect_with_default_options() {
    // `SQL_DATABASE` is unset, so the shared in-memory database is used
    let store = SqliteStore::connect().await.expect("connect");

    store
        .batch(
            "CREATE TABLE IF NOT EXISTS categories (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             DELETE FROM categories;"
                .to_string(),
        )
        .await
        .expect("create table");

    store
        .run(
            "INSERT INTO categories (id, name) VALUES (?, ?)".to_string(),
            vec![DataType::Integer(1), DataType::Text("themes".to_string())],
        )
        .await
        .expect("insert");

    let rows = store
        .run("SELECT id, name FROM categories".to_string(), vec![])
        .await
        .expect("select");

    assert_eq!(into_json(rows).unwrap(), json!([{ "id": 1, "name": "themes" }]));
}

#[tokio::test]
async fn count_reads_as_integer() {
    let store = SqliteStore::connect_with(bazaar_store::ConnectOptions {
        database: ":memory:".to_string(),
    })
    .await
    .expect("connect");

    store
        .batch("CREATE TABLE votes (id INTEGER PRIMARY KEY, value INTEGER)".to_string())
        .await
        .expect("create table");
    for value in [1, -1, 1] {
        store
            .run("INSERT INTO votes (value) VALUES (?)".to_string(), vec![DataType::Integer(value)])
            .await
            .expect("insert");
    }

    let rows = store
        .run(
            "SELECT COUNT(*) as count FROM votes WHERE value > ?".to_string(),
            vec![DataType::Integer(0)],
        )
        .await
        .expect("count");
    assert_eq!(rows[0].get("count"), Some(&DataType::Integer(2)));
}
