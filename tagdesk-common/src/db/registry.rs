//! Dataset and session registry
//!
//! Parent collections are created once with their configuration (label
//! options or description) and never modified afterwards.

use serde_json::Value;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

use crate::db::models::{Dataset, LlmSession};
use crate::db::store::{insert_items_in, validate_item_payloads};
use crate::db::tables::{LABEL_ITEMS, REVIEW_INPUTS};
use crate::{Error, Result};

/// Split a comma-separated option string, trimming whitespace
pub fn parse_label_options(raw: &str) -> Vec<String> {
    raw.split(',').map(|opt| opt.trim().to_string()).collect()
}

/// Trim options, drop empties and duplicates (first occurrence wins)
///
/// Fails if nothing is left: a dataset needs at least one label.
pub fn normalize_label_options(options: Vec<String>) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(options.len());
    for option in options {
        let option = option.trim();
        if !option.is_empty() && !normalized.iter().any(|o| o == option) {
            normalized.push(option.to_string());
        }
    }

    if normalized.is_empty() {
        return Err(Error::MalformedInput(
            "at least one label option is required".to_string(),
        ));
    }
    Ok(normalized)
}

fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::MalformedInput("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

/// Create an empty dataset; Conflict if the name is taken
pub async fn create_dataset(pool: &SqlitePool, name: &str, label_options: Vec<String>) -> Result<i64> {
    create_dataset_with_items(pool, name, label_options, &[])
        .await
        .map(|(id, _)| id)
}

/// Create a dataset and its initial items in one transaction
///
/// Returns the new dataset id and the number of items inserted. A malformed
/// item or duplicate name leaves no trace in the database.
pub async fn create_dataset_with_items(
    pool: &SqlitePool,
    name: &str,
    label_options: Vec<String>,
    items: &[Value],
) -> Result<(i64, u64)> {
    let name = normalize_name(name)?;
    let label_options = normalize_label_options(label_options)?;
    validate_item_payloads(items)?;

    let options_json = serde_json::to_string(&label_options)
        .map_err(|e| Error::Internal(format!("Failed to serialize label options: {}", e)))?;

    let mut tx = pool.begin().await?;

    let dataset_id = sqlx::query("INSERT INTO datasets (name, label_options) VALUES (?, ?)")
        .bind(&name)
        .bind(&options_json)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::from_insert(e, "Dataset", &name))?
        .last_insert_rowid();

    let inserted = insert_items_in(&mut *tx, dataset_id, items).await?;
    tx.commit().await?;

    info!(
        "Created dataset '{}' (id {}) with {} label options and {} items",
        name,
        dataset_id,
        label_options.len(),
        inserted
    );
    Ok((dataset_id, inserted))
}

fn dataset_from_row(row: &SqliteRow) -> Result<Dataset> {
    let id: i64 = row.get("id");
    let label_options: String = row.get("label_options");
    let label_options: Vec<String> = serde_json::from_str(&label_options).map_err(|e| {
        Error::Internal(format!("label options of dataset {} do not parse: {}", id, e))
    })?;

    Ok(Dataset {
        id,
        name: row.get("name"),
        label_options,
        created_at: row.get("created_at"),
    })
}

fn session_from_row(row: &SqliteRow) -> LlmSession {
    LlmSession {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

/// All datasets in creation order
pub async fn list_datasets(pool: &SqlitePool) -> Result<Vec<Dataset>> {
    let rows = sqlx::query("SELECT id, name, label_options, created_at FROM datasets ORDER BY id ASC")
        .fetch_all(pool)
        .await?;

    rows.iter().map(dataset_from_row).collect()
}

pub async fn get_dataset(pool: &SqlitePool, dataset_id: i64) -> Result<Dataset> {
    let row = sqlx::query("SELECT id, name, label_options, created_at FROM datasets WHERE id = ?")
        .bind(dataset_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => dataset_from_row(&row),
        None => Err(LABEL_ITEMS.parent_not_found(dataset_id)),
    }
}

/// Label options of a dataset, in configured order
pub async fn label_options(pool: &SqlitePool, dataset_id: i64) -> Result<Vec<String>> {
    get_dataset(pool, dataset_id).await.map(|d| d.label_options)
}

/// Create a review session; Conflict if the name is taken
pub async fn create_session(pool: &SqlitePool, name: &str, description: &str) -> Result<i64> {
    let name = normalize_name(name)?;

    let session_id = sqlx::query("INSERT INTO llm_sessions (name, description) VALUES (?, ?)")
        .bind(&name)
        .bind(description)
        .execute(pool)
        .await
        .map_err(|e| Error::from_insert(e, "Session", &name))?
        .last_insert_rowid();

    info!("Created review session '{}' (id {})", name, session_id);
    Ok(session_id)
}

/// All review sessions in creation order
pub async fn list_sessions(pool: &SqlitePool) -> Result<Vec<LlmSession>> {
    let rows = sqlx::query("SELECT id, name, description, created_at FROM llm_sessions ORDER BY id ASC")
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(session_from_row).collect())
}

pub async fn get_session(pool: &SqlitePool, session_id: i64) -> Result<LlmSession> {
    let row = sqlx::query("SELECT id, name, description, created_at FROM llm_sessions WHERE id = ?")
        .bind(session_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(session_from_row(&row)),
        None => Err(REVIEW_INPUTS.parent_not_found(session_id)),
    }
}
