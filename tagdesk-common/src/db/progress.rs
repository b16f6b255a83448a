//! Progress Tracker
//!
//! Pure read-side counts over the record set. Nothing is cached: every call
//! reflects the latest mutator writes.

use sqlx::SqlitePool;

use crate::db::models::Progress;
use crate::db::tables::RecordTable;
use crate::Result;

/// Total and completed record counts for one parent
///
/// NotFound if the parent does not exist.
pub async fn progress(pool: &SqlitePool, table: &RecordTable, parent_id: i64) -> Result<Progress> {
    table.ensure_parent_exists(pool, parent_id).await?;

    let (total, completed): (i64, i64) = sqlx::query_as(&format!(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN {} THEN 1 ELSE 0 END), 0) FROM {} WHERE {} = ?",
        table.completed_predicate, table.table, table.parent_column
    ))
    .bind(parent_id)
    .fetch_one(pool)
    .await?;

    Ok(Progress { total, completed })
}

/// Number of records in the parent
pub async fn total(pool: &SqlitePool, table: &RecordTable, parent_id: i64) -> Result<i64> {
    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE {} = ?",
        table.table, table.parent_column
    ))
    .bind(parent_id)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

/// 1-based rank of `id` in insertion order: records of the parent with id <= `id`
pub async fn position_of(pool: &SqlitePool, table: &RecordTable, parent_id: i64, id: i64) -> Result<i64> {
    let position: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE {} = ? AND id <= ?",
        table.table, table.parent_column
    ))
    .bind(parent_id)
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;
    use crate::db::registry::create_dataset;
    use crate::db::store::insert_items;
    use crate::db::tables::{LABEL_ITEMS, REVIEW_INPUTS};
    use crate::Error;
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_dataset_progress() {
        let pool = init_memory_database().await.unwrap();
        let id = create_dataset(&pool, "empty", vec!["x".into()]).await.unwrap();

        let p = progress(&pool, &LABEL_ITEMS, id).await.unwrap();
        assert_eq!(p, Progress { total: 0, completed: 0 });
    }

    #[tokio::test]
    async fn test_unknown_parent_is_not_found() {
        let pool = init_memory_database().await.unwrap();
        assert!(matches!(
            progress(&pool, &REVIEW_INPUTS, 9).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_label_does_not_count_as_completed() {
        let pool = init_memory_database().await.unwrap();
        let id = create_dataset(&pool, "d", vec!["x".into()]).await.unwrap();
        insert_items(&pool, id, &[json!({}), json!({}), json!({})]).await.unwrap();
        sqlx::query("UPDATE items SET label = 'x' WHERE id = 1")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("UPDATE items SET label = '' WHERE id = 2")
            .execute(&pool)
            .await
            .unwrap();

        let p = progress(&pool, &LABEL_ITEMS, id).await.unwrap();
        assert_eq!(p, Progress { total: 3, completed: 1 });
    }

    #[tokio::test]
    async fn test_position_tracks_running_total() {
        let pool = init_memory_database().await.unwrap();
        let id = create_dataset(&pool, "d", vec!["x".into()]).await.unwrap();

        let mut running = 0;
        for batch in [1usize, 3, 2] {
            let items: Vec<_> = (0..batch).map(|n| json!({ "n": n })).collect();
            running += insert_items(&pool, id, &items).await.unwrap() as i64;

            let last_id: i64 = sqlx::query_scalar("SELECT MAX(id) FROM items")
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(position_of(&pool, &LABEL_ITEMS, id, last_id).await.unwrap(), running);
            assert_eq!(total(&pool, &LABEL_ITEMS, id).await.unwrap(), running);
        }
    }
}
