//! Record table descriptors
//!
//! Labeling items and review inputs share the same ordering protocol: records
//! keyed by an AUTOINCREMENT id, grouped by a parent column. A
//! [`RecordTable`] names the identifiers so navigation, position and progress
//! queries are written once. All fields are compile-time constants, never
//! user input, so interpolating them into SQL is safe.

use sqlx::SqlitePool;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordTable {
    /// Record table name
    pub table: &'static str,
    /// Column referencing the parent collection
    pub parent_column: &'static str,
    /// Parent collection table name
    pub parent_table: &'static str,
    /// SQL predicate that holds for completed records
    pub completed_predicate: &'static str,
    /// Human-readable record kind for error messages
    pub record_kind: &'static str,
    /// Human-readable parent kind for error messages
    pub parent_kind: &'static str,
}

/// Dataset items; completion is derived from the label
pub const LABEL_ITEMS: RecordTable = RecordTable {
    table: "items",
    parent_column: "dataset_id",
    parent_table: "datasets",
    completed_predicate: "label IS NOT NULL AND label <> ''",
    record_kind: "item",
    parent_kind: "dataset",
};

/// Review inputs; completion is the stored status
pub const REVIEW_INPUTS: RecordTable = RecordTable {
    table: "llm_inputs",
    parent_column: "session_id",
    parent_table: "llm_sessions",
    completed_predicate: "status = 'reviewed'",
    record_kind: "input",
    parent_kind: "session",
};

impl RecordTable {
    pub(crate) fn parent_not_found(&self, parent_id: i64) -> Error {
        Error::NotFound(format!("{} {}", self.parent_kind, parent_id))
    }

    pub(crate) fn record_not_found(&self, id: i64) -> Error {
        Error::NotFound(format!("{} {}", self.record_kind, id))
    }

    /// Fail with NotFound unless the parent collection exists
    pub async fn ensure_parent_exists(&self, pool: &SqlitePool, parent_id: i64) -> Result<()> {
        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)",
            self.parent_table
        ))
        .bind(parent_id)
        .fetch_one(pool)
        .await?;

        if exists {
            Ok(())
        } else {
            Err(self.parent_not_found(parent_id))
        }
    }
}
