//! Next-item selection
//!
//! Labeling and review pick their starting record differently, so each has its
//! own strategy:
//! - labeling always starts from the first item, labeled or not;
//! - review prefers the first pending input, then the first reviewed one.

use sqlx::SqlitePool;
use tracing::debug;

use crate::db::models::{LabelItem, ReviewInput, ReviewPick, ReviewStatus};
use crate::db::store::{input_from_row, item_from_row};
use crate::db::tables::{LABEL_ITEMS, REVIEW_INPUTS};
use crate::{Error, Result};

/// First item of a dataset in insertion order, regardless of completion
///
/// NotFound if the dataset is unknown or has no items.
pub async fn first_for_labeling(pool: &SqlitePool, dataset_id: i64) -> Result<LabelItem> {
    LABEL_ITEMS.ensure_parent_exists(pool, dataset_id).await?;

    let row = sqlx::query(
        "SELECT id, dataset_id, content, label FROM items WHERE dataset_id = ? ORDER BY id ASC LIMIT 1",
    )
    .bind(dataset_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => item_from_row(&row),
        None => Err(Error::NotFound(format!("no items in dataset {}", dataset_id))),
    }
}

async fn first_with_status(
    pool: &SqlitePool,
    session_id: i64,
    status: ReviewStatus,
) -> Result<Option<ReviewInput>> {
    let row = sqlx::query(
        r#"
        SELECT id, session_id, input, original_output, curated_output, status
        FROM llm_inputs
        WHERE session_id = ? AND status = ?
        ORDER BY id ASC
        LIMIT 1
        "#,
    )
    .bind(session_id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(input_from_row).transpose()
}

/// First pending input, else first reviewed input, else `NoMoreItems`
///
/// Two ordered lookups rather than one sort over mixed statuses. NotFound
/// if the session is unknown.
pub async fn next_for_review(pool: &SqlitePool, session_id: i64) -> Result<ReviewPick<ReviewInput>> {
    REVIEW_INPUTS.ensure_parent_exists(pool, session_id).await?;

    if let Some(input) = first_with_status(pool, session_id, ReviewStatus::Pending).await? {
        return Ok(ReviewPick::Found(input));
    }

    if let Some(input) = first_with_status(pool, session_id, ReviewStatus::Reviewed).await? {
        return Ok(ReviewPick::Found(input));
    }

    debug!("Session {} has no inputs to review", session_id);
    Ok(ReviewPick::NoMoreItems)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;
    use crate::db::models::ReviewPair;
    use crate::db::mutator::{apply_curation, apply_label};
    use crate::db::registry::{create_dataset, create_session};
    use crate::db::store::{insert_inputs, insert_items};
    use serde_json::json;

    fn pairs(n: usize) -> Vec<ReviewPair> {
        (0..n)
            .map(|i| ReviewPair {
                input: format!("in-{}", i),
                output: format!("out-{}", i),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_labeling_starts_from_first_even_if_labeled() {
        let pool = init_memory_database().await.unwrap();
        let id = create_dataset(&pool, "d", vec!["x".into()]).await.unwrap();
        insert_items(&pool, id, &[json!({"n": 1}), json!({"n": 2})]).await.unwrap();
        apply_label(&pool, 1, "x").await.unwrap();

        assert_eq!(first_for_labeling(&pool, id).await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_labeling_empty_dataset_is_not_found() {
        let pool = init_memory_database().await.unwrap();
        let id = create_dataset(&pool, "d", vec!["x".into()]).await.unwrap();
        assert!(matches!(first_for_labeling(&pool, id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_review_prefers_pending() {
        let pool = init_memory_database().await.unwrap();
        let session = create_session(&pool, "s", "").await.unwrap();
        insert_inputs(&pool, session, &pairs(2)).await.unwrap();

        let first = next_for_review(&pool, session).await.unwrap().found().unwrap();
        assert_eq!(first.id, 1);

        apply_curation(&pool, first.id, "curated").await.unwrap();
        let second = next_for_review(&pool, session).await.unwrap().found().unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_review_falls_back_to_first_reviewed() {
        let pool = init_memory_database().await.unwrap();
        let session = create_session(&pool, "s", "").await.unwrap();
        insert_inputs(&pool, session, &pairs(2)).await.unwrap();
        apply_curation(&pool, 2, "b").await.unwrap();
        apply_curation(&pool, 1, "a").await.unwrap();

        let pick = next_for_review(&pool, session).await.unwrap().found().unwrap();
        assert_eq!(pick.id, 1);
    }

    #[tokio::test]
    async fn test_review_pending_beats_earlier_reviewed() {
        let pool = init_memory_database().await.unwrap();
        let session = create_session(&pool, "s", "").await.unwrap();
        insert_inputs(&pool, session, &pairs(3)).await.unwrap();
        apply_curation(&pool, 1, "a").await.unwrap();

        let stored: Vec<String> = sqlx::query_scalar("SELECT status FROM llm_inputs ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(
            stored,
            [ReviewStatus::Reviewed.as_str(), ReviewStatus::Pending.as_str(), ReviewStatus::Pending.as_str()]
        );

        let pick = next_for_review(&pool, session).await.unwrap().found().unwrap();
        assert_eq!(pick.id, 2);
        assert_eq!(pick.status, ReviewStatus::Pending);
    }

    #[tokio::test]
    async fn test_review_empty_session_has_no_more_items() {
        let pool = init_memory_database().await.unwrap();
        let session = create_session(&pool, "s", "").await.unwrap();

        assert_eq!(next_for_review(&pool, session).await.unwrap(), ReviewPick::NoMoreItems);
        assert!(matches!(
            next_for_review(&pool, session + 1).await,
            Err(Error::NotFound(_))
        ));
    }
}
