//! Tests for database initialization on first run and reopen

use serde_json::json;
use tagdesk_common::db::init::init_database;
use tagdesk_common::db::registry::{create_dataset_with_items, list_datasets};
use tagdesk_common::db::store::insert_items;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("tagdesk.db");

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_reopen_keeps_data_and_id_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tagdesk.db");

    let pool = init_database(&db_path).await.unwrap();
    let (dataset_id, _) = create_dataset_with_items(
        &pool,
        "fruits",
        vec!["apple".into()],
        &[json!({"name": "a"}), json!({"name": "b"})],
    )
    .await
    .unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    assert_eq!(list_datasets(&pool).await.unwrap().len(), 1);

    insert_items(&pool, dataset_id, &[json!({"name": "c"})]).await.unwrap();
    let max_id: i64 = sqlx::query_scalar("SELECT MAX(id) FROM items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(max_id, 3);
}
