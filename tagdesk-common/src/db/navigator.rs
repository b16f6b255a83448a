//! Cursor Navigator
//!
//! Resolves the neighbour of a record in id order within one parent. The
//! starting id is only a boundary value: it does not have to exist.

use sqlx::SqlitePool;
use tracing::debug;

use crate::db::models::{Direction, Step};
use crate::db::tables::RecordTable;
use crate::Result;

/// Id of the adjacent record, or `EndOfSequence` at either end (no wraparound)
pub async fn adjacent_id(
    pool: &SqlitePool,
    table: &RecordTable,
    parent_id: i64,
    from_id: i64,
    direction: Direction,
) -> Result<Step<i64>> {
    let sql = match direction {
        Direction::Next => format!(
            "SELECT id FROM {} WHERE {} = ? AND id > ? ORDER BY id ASC LIMIT 1",
            table.table, table.parent_column
        ),
        Direction::Prev => format!(
            "SELECT id FROM {} WHERE {} = ? AND id < ? ORDER BY id DESC LIMIT 1",
            table.table, table.parent_column
        ),
    };

    let id: Option<i64> = sqlx::query_scalar(&sql)
        .bind(parent_id)
        .bind(from_id)
        .fetch_optional(pool)
        .await?;

    match id {
        Some(id) => Ok(Step::Found(id)),
        None => {
            debug!(
                "No {} {} of {} {} in {} {}",
                table.record_kind, direction, table.record_kind, from_id, table.parent_kind, parent_id
            );
            Ok(Step::EndOfSequence)
        }
    }
}
