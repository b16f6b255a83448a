//! Label/Curation Mutator
//!
//! The only writer of `items.label`, `llm_inputs.curated_output` and
//! `llm_inputs.status`. Applying again overwrites the result; a completed
//! record stays completed.
//!
//! Labels are not checked against the dataset's option list.

use sqlx::SqlitePool;
use tracing::info;

use crate::db::models::ReviewStatus;
use crate::db::tables::{LABEL_ITEMS, REVIEW_INPUTS};
use crate::{Error, Result};

fn require_result(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::MalformedInput(format!("{} must not be empty", kind)));
    }
    Ok(())
}

/// Set the label of one item
pub async fn apply_label(pool: &SqlitePool, item_id: i64, label: &str) -> Result<()> {
    require_result("label", label)?;

    let result = sqlx::query("UPDATE items SET label = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(label)
        .bind(item_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(LABEL_ITEMS.record_not_found(item_id));
    }

    info!("Labeled item {} as '{}'", item_id, label);
    Ok(())
}

/// Store the curated output of one input and mark it reviewed
pub async fn apply_curation(pool: &SqlitePool, input_id: i64, curated_output: &str) -> Result<()> {
    require_result("curated output", curated_output)?;

    let result = sqlx::query(
        r#"
        UPDATE llm_inputs
        SET curated_output = ?, status = ?, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(curated_output)
    .bind(ReviewStatus::Reviewed.as_str())
    .bind(input_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(REVIEW_INPUTS.record_not_found(input_id));
    }

    info!("Curated input {}", input_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;
    use crate::db::models::{ItemStatus, ReviewPair, ReviewStatus};
    use crate::db::registry::{create_dataset, create_session};
    use crate::db::store::{fetch_input, fetch_item, insert_inputs, insert_items};
    use serde_json::json;

    #[tokio::test]
    async fn test_reapply_label_overwrites_and_stays_completed() {
        let pool = init_memory_database().await.unwrap();
        let id = create_dataset(&pool, "fruits", vec!["apple".into(), "banana".into()])
            .await
            .unwrap();
        insert_items(&pool, id, &[json!({"name": "a"})]).await.unwrap();

        apply_label(&pool, 1, "apple").await.unwrap();
        apply_label(&pool, 1, "banana").await.unwrap();

        let item = fetch_item(&pool, id, 1).await.unwrap();
        assert_eq!(item.label.as_deref(), Some("banana"));
        assert_eq!(item.status(), ItemStatus::Completed);
    }

    #[tokio::test]
    async fn test_label_outside_options_is_accepted() {
        let pool = init_memory_database().await.unwrap();
        let id = create_dataset(&pool, "fruits", vec!["apple".into()]).await.unwrap();
        insert_items(&pool, id, &[json!({"name": "a"})]).await.unwrap();

        apply_label(&pool, 1, "durian").await.unwrap();
        assert_eq!(fetch_item(&pool, id, 1).await.unwrap().label.as_deref(), Some("durian"));
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let pool = init_memory_database().await.unwrap();
        assert!(matches!(apply_label(&pool, 5, "x").await, Err(Error::NotFound(_))));
        assert!(matches!(apply_curation(&pool, 5, "x").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_result_is_rejected_without_mutation() {
        let pool = init_memory_database().await.unwrap();
        let session = create_session(&pool, "s", "").await.unwrap();
        let pairs = vec![ReviewPair { input: "q".into(), output: "a".into() }];
        insert_inputs(&pool, session, &pairs).await.unwrap();

        assert!(matches!(
            apply_curation(&pool, 1, "").await,
            Err(Error::MalformedInput(_))
        ));
        assert_eq!(fetch_input(&pool, session, 1).await.unwrap().status, ReviewStatus::Pending);
    }

    #[tokio::test]
    async fn test_curation_marks_reviewed_and_is_idempotent() {
        let pool = init_memory_database().await.unwrap();
        let session = create_session(&pool, "s", "").await.unwrap();
        let pairs = vec![ReviewPair { input: "q".into(), output: "a".into() }];
        insert_inputs(&pool, session, &pairs).await.unwrap();

        apply_curation(&pool, 1, "curated").await.unwrap();
        apply_curation(&pool, 1, "curated again").await.unwrap();

        let input = fetch_input(&pool, session, 1).await.unwrap();
        assert_eq!(input.status, ReviewStatus::Reviewed);
        assert_eq!(input.curated_output.as_deref(), Some("curated again"));
        assert_eq!(input.original_output, "a");
    }
}
