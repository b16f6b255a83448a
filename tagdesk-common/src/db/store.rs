//! Item Store
//!
//! Bulk insertion and lookup of labeling items and review inputs. Every batch
//! is validated up front and written inside one transaction, so a failing
//! import never leaves a half-filled collection visible to readers.

use serde_json::{Map, Value};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use tracing::info;

use crate::db::models::{LabelItem, ReviewInput, ReviewPair};
use crate::db::tables::{LABEL_ITEMS, REVIEW_INPUTS};
use crate::{Error, Result};

/// Check that every labeling payload is a JSON object
pub fn validate_item_payloads(items: &[Value]) -> Result<()> {
    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            return Err(Error::MalformedInput(format!(
                "item {} is not a JSON object",
                index
            )));
        }
    }
    Ok(())
}

/// Convert review payloads into `{input, output}` pairs, failing the whole batch
/// on the first malformed entry
pub fn parse_review_pairs(values: &[Value]) -> Result<Vec<ReviewPair>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<ReviewPair>(value.clone()).map_err(|e| {
                Error::MalformedInput(format!("input {} is not an {{input, output}} pair: {}", index, e))
            })
        })
        .collect()
}

/// Append items to a dataset; all or nothing
pub async fn insert_items(pool: &SqlitePool, dataset_id: i64, items: &[Value]) -> Result<u64> {
    validate_item_payloads(items)?;
    LABEL_ITEMS.ensure_parent_exists(pool, dataset_id).await?;

    let mut tx = pool.begin().await?;
    let inserted = insert_items_in(&mut *tx, dataset_id, items).await?;
    tx.commit().await?;

    info!("Imported {} items into dataset {}", inserted, dataset_id);
    Ok(inserted)
}

/// Insert items on an open connection (caller owns the transaction)
pub(crate) async fn insert_items_in(
    conn: &mut SqliteConnection,
    dataset_id: i64,
    items: &[Value],
) -> Result<u64> {
    let mut inserted = 0;
    for item in items {
        let content = serde_json::to_string(item)
            .map_err(|e| Error::MalformedInput(format!("unserializable item: {}", e)))?;
        sqlx::query("INSERT INTO items (dataset_id, content) VALUES (?, ?)")
            .bind(dataset_id)
            .bind(content)
            .execute(&mut *conn)
            .await?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Append input/output pairs to a review session; all or nothing
pub async fn insert_inputs(pool: &SqlitePool, session_id: i64, pairs: &[ReviewPair]) -> Result<u64> {
    REVIEW_INPUTS.ensure_parent_exists(pool, session_id).await?;

    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for pair in pairs {
        sqlx::query("INSERT INTO llm_inputs (session_id, input, original_output) VALUES (?, ?, ?)")
            .bind(session_id)
            .bind(&pair.input)
            .bind(&pair.output)
            .execute(&mut *tx)
            .await?;
        inserted += 1;
    }
    tx.commit().await?;

    info!("Imported {} inputs into session {}", inserted, session_id);
    Ok(inserted)
}

pub(crate) fn item_from_row(row: &SqliteRow) -> Result<LabelItem> {
    let id: i64 = row.get("id");
    let content: String = row.get("content");
    let content: Value = serde_json::from_str(&content)
        .map_err(|e| Error::Internal(format!("stored content of item {} does not parse: {}", id, e)))?;

    Ok(LabelItem {
        id,
        dataset_id: row.get("dataset_id"),
        content,
        label: row.get("label"),
    })
}

pub(crate) fn input_from_row(row: &SqliteRow) -> Result<ReviewInput> {
    let status: String = row.get("status");
    Ok(ReviewInput {
        id: row.get("id"),
        session_id: row.get("session_id"),
        input: row.get("input"),
        original_output: row.get("original_output"),
        curated_output: row.get("curated_output"),
        status: status.parse()?,
    })
}

/// Load one item of a dataset by id
pub async fn fetch_item(pool: &SqlitePool, dataset_id: i64, id: i64) -> Result<LabelItem> {
    let row = sqlx::query(
        "SELECT id, dataset_id, content, label FROM items WHERE dataset_id = ? AND id = ?",
    )
    .bind(dataset_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => item_from_row(&row),
        None => Err(LABEL_ITEMS.record_not_found(id)),
    }
}

/// Load one input of a session by id
pub async fn fetch_input(pool: &SqlitePool, session_id: i64, id: i64) -> Result<ReviewInput> {
    let row = sqlx::query(
        r#"
        SELECT id, session_id, input, original_output, curated_output, status
        FROM llm_inputs
        WHERE session_id = ? AND id = ?
        "#,
    )
    .bind(session_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => input_from_row(&row),
        None => Err(REVIEW_INPUTS.record_not_found(id)),
    }
}

/// Export a dataset in insertion order: each payload with a `label` field
///
/// A payload field named `label` is overwritten by the item's label.
pub async fn export_items(pool: &SqlitePool, dataset_id: i64) -> Result<Vec<Value>> {
    LABEL_ITEMS.ensure_parent_exists(pool, dataset_id).await?;

    let rows = sqlx::query(
        "SELECT id, dataset_id, content, label FROM items WHERE dataset_id = ? ORDER BY id ASC",
    )
    .bind(dataset_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let item = item_from_row(row)?;
            let mut fields = match item.content {
                Value::Object(map) => map,
                other => {
                    let mut map = Map::new();
                    map.insert("content".to_string(), other);
                    map
                }
            };
            fields.insert(
                "label".to_string(),
                item.label.map(Value::String).unwrap_or(Value::Null),
            );
            Ok(Value::Object(fields))
        })
        .collect()
}

/// Export a review session in insertion order
pub async fn export_inputs(pool: &SqlitePool, session_id: i64) -> Result<Vec<ReviewInput>> {
    REVIEW_INPUTS.ensure_parent_exists(pool, session_id).await?;

    let rows = sqlx::query(
        r#"
        SELECT id, session_id, input, original_output, curated_output, status
        FROM llm_inputs
        WHERE session_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(input_from_row).collect()
}
