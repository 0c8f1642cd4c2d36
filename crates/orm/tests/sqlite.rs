//! Integration tests for repositories over an in-memory `SQLite` database.

#![allow(missing_docs)]

mod common;

use bazaar_orm::{
    Condition, Connector, DataType, Direction, Entity, Fields, Mode, Pagination, Query,
    Repository, WhereClause,
};
use common::{Item, ItemRow, Note, Post, memory};

async fn seed_items(items: &Repository<Item>, count: usize) {
    for i in 0..count {
        let fields = Fields::new().set(Item::NAME, format!("item-{i:02}")).set(Item::STOCK, 1);
        items.insert(&fields).await.expect("insert item");
    }
}

#[tokio::test]
async fn insert_read_update_destroy() {
    let items = Repository::<Item>::open(memory().await).await.unwrap();

    let widget = Fields::new().set(Item::NAME, "widget").set(Item::STOCK, 4).set(Item::PRICE, 2.5);
    items.insert(&widget).await.unwrap();
    items.insert(&Fields::new().set(Item::NAME, "gadget")).await.unwrap();

    let query = Query::new()
        .filter(Condition::eq(Item::NAME, "widget"))
        .paginate(Pagination::default().order_by(Item::ID, Direction::Asc));
    let rows = items.get_as::<ItemRow>(&query).await.unwrap();
    assert_eq!(
        rows,
        vec![ItemRow {
            id: 1,
            name: "widget".to_string(),
            stock: 4,
            price: Some(2.5),
        }]
    );

    let by_id = WhereClause::from(Condition::eq(Item::ID, 2));
    items.update(&Fields::new().set(Item::PRICE, 9.0), &by_id, Connector::And).await.unwrap();
    let gadget = items.first(&Query::new().filter(by_id.clone())).await.unwrap().unwrap();
    assert_eq!(gadget.get(Item::PRICE), Some(&DataType::Real(9.0)));
    assert_eq!(gadget.get(Item::STOCK), Some(&DataType::Integer(0)));

    items.destroy(&by_id, Connector::And).await.unwrap();
    assert_eq!(items.count(&WhereClause::new(), Connector::And).await.unwrap(), 1);
}

#[tokio::test]
async fn insert_or_ignore_skips_duplicates() {
    let items = Repository::<Item>::open(memory().await).await.unwrap();
    let fields = Fields::new().set(Item::NAME, "widget");

    assert_eq!(items.insert_or_ignore(&fields).await.unwrap(), 1);
    assert_eq!(items.insert_or_ignore(&fields).await.unwrap(), 0);
    assert_eq!(items.count(&WhereClause::new(), Connector::And).await.unwrap(), 1);

    let err = items.insert(&fields).await.unwrap_err();
    assert_eq!(err.to_string(), "tableitems sql execution failed.");
    assert!(format!("{err:#}").contains("UNIQUE"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_not_lost() {
    let items = Repository::<Item>::open(memory().await).await.unwrap();
    items.insert(&Fields::new().set(Item::NAME, "counter").set(Item::STOCK, 5)).await.unwrap();
    let filter = WhereClause::from(Condition::eq(Item::NAME, "counter"));

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let items = items.clone();
            let filter = filter.clone();
            tokio::spawn(async move { items.increment(Item::STOCK, 1, &filter, Connector::And).await })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), 1);
    }
    items.decrement(Item::STOCK, 13, &filter, Connector::And).await.unwrap();

    let row = items.first(&Query::new().filter(filter)).await.unwrap().unwrap();
    assert_eq!(row.get(Item::STOCK), Some(&DataType::Integer(42)));
}

#[tokio::test]
async fn soft_deleted_rows_stay_in_the_table() {
    let posts = Repository::<Post>::open(memory().await).await.unwrap();
    for title in ["first", "second", "third"] {
        posts.insert(&Fields::new().set(Post::TITLE, title)).await.unwrap();
    }

    let second = WhereClause::from(Condition::eq(Post::TITLE, "second"));
    posts.delete(&second, Connector::And).await.unwrap();

    let everything = WhereClause::new();
    assert_eq!(posts.count(&everything, Connector::And).await.unwrap(), 2);
    assert!(posts.first(&Query::new().filter(second.clone())).await.unwrap().is_none());

    let hidden = posts.with_deleted().first(&Query::new().filter(second.clone())).await.unwrap();
    let hidden = hidden.expect("soft-deleted row is kept");
    assert_eq!(hidden.get(Post::STATUS), Some(&DataType::Text("deleted".to_string())));
    assert_eq!(posts.with_deleted().count(&everything, Connector::And).await.unwrap(), 3);

    posts.destroy(&second, Connector::And).await.unwrap();
    assert_eq!(posts.with_deleted().count(&everything, Connector::And).await.unwrap(), 2);
}

#[tokio::test]
async fn internal_mode_reads_everything_once() {
    let items = Repository::<Item>::open(memory().await).await.unwrap();
    seed_items(&items, 25).await;
    let query = Query::new();

    assert_eq!(items.for_mode(Mode::Internal).get(&query).await.unwrap().len(), 25);
    assert_eq!(items.get(&query).await.unwrap().len(), 20);

    let last_page = query.paginate(Pagination::page(2, 20));
    assert_eq!(items.get(&last_page).await.unwrap().len(), 5);
}

#[tokio::test]
async fn pages_follow_the_order() {
    let items = Repository::<Item>::open(memory().await).await.unwrap();
    seed_items(&items, 7).await;

    let query = Query::new()
        .columns(Item::min_columns())
        .paginate(Pagination::page(2, 3).order_by(Item::NAME, Direction::Asc));
    let rows = items.get(&query).await.unwrap();

    let names: Vec<_> = rows.iter().filter_map(|row| row.get(Item::NAME)).collect();
    assert_eq!(
        names,
        vec![
            &DataType::Text("item-03".to_string()),
            &DataType::Text("item-04".to_string()),
            &DataType::Text("item-05".to_string()),
        ]
    );
    assert!(rows[0].get(Item::STOCK).is_none());
}

#[tokio::test]
async fn joined_columns_are_selectable() {
    let conn = memory().await;
    let items = Repository::<Item>::open(conn.clone()).await.unwrap();
    let notes = Repository::<Note>::open(conn).await.unwrap();

    items.insert(&Fields::new().set(Item::NAME, "widget")).await.unwrap();
    notes
        .insert(&Fields::new().set(Note::ITEM_ID, 1).set(Note::BODY, "restock soon"))
        .await
        .unwrap();

    let query = Query::new()
        .columns(Note::columns())
        .filter(Condition::eq(Note::ITEM_NAME, "widget"));
    let rows = notes.get(&query).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get(Note::ITEM_NAME), Some(&DataType::Text("widget".to_string())));
    assert_eq!(rows[0].get(Note::BODY), Some(&DataType::Text("restock soon".to_string())));
}

#[tokio::test]
async fn unknown_columns_fail_with_the_table_name() {
    let items = Repository::<Item>::open(memory().await).await.unwrap();

    let err = items.get(&Query::new().filter(Condition::eq("colour", "red"))).await.unwrap_err();
    assert_eq!(err.to_string(), "tableitems sql execution failed.");
    assert!(format!("{err:#}").contains("no such column"));
}

#[tokio::test]
async fn empty_in_list_matches_nothing() {
    let items = Repository::<Item>::open(memory().await).await.unwrap();
    seed_items(&items, 3).await;

    let query = Query::new().filter(Condition::list(Item::ID, Vec::<i64>::new()));
    assert!(items.get(&query).await.unwrap().is_empty());

    let query = Query::new().filter(Condition::list(Item::ID, [1, 3]));
    assert_eq!(items.get(&query).await.unwrap().len(), 2);
}
