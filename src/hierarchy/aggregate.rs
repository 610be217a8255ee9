//! Recursive aggregation over the folder tree.
//!
//! Totals are computed with per-level aggregate queries: sum the items of
//! the current frontier of folder ids, then descend to their children. The
//! subtree is never materialized.

use sqlx::{QueryBuilder, SqlitePool};

use super::{child_ids_of, folder_exists, IN_CHUNK};
use crate::error::{AppError, AppResult};
use crate::types::CountsDto;

/// Sum of item quantities in the given folder and, recursively, all of its
/// descendants. `None` covers the whole forest: folder-less items plus every
/// root folder's recursive total. Missing rows contribute 0.0.
pub async fn total_quantity(db: &SqlitePool, folder_id: Option<i64>) -> AppResult<f64> {
    let mut conn = db.acquire().await?;
    let mut total = 0.0f64;

    let mut frontier: Vec<i64> = match folder_id {
        Some(id) => {
            if !folder_exists(&mut conn, id).await? {
                return Err(AppError::NotFound(format!("Folder {} not found", id)));
            }
            vec![id]
        }
        None => {
            total += sqlx::query_scalar::<_, f64>(
                "SELECT COALESCE(SUM(quantity), 0.0) FROM items WHERE folder_id IS NULL",
            )
            .fetch_one(&mut *conn)
            .await?;
            sqlx::query_scalar("SELECT id FROM folders WHERE parent_id IS NULL ORDER BY id")
                .fetch_all(&mut *conn)
                .await?
        }
    };

    while !frontier.is_empty() {
        for chunk in frontier.chunks(IN_CHUNK) {
            let mut qb = QueryBuilder::new(
                "SELECT COALESCE(SUM(quantity), 0.0) FROM items WHERE folder_id IN (",
            );
            let mut sep = qb.separated(", ");
            for id in chunk {
                sep.push_bind(*id);
            }
            qb.push(")");
            let sum: f64 = qb.build_query_scalar().fetch_one(&mut *conn).await?;
            total += sum;
        }
        frontier = child_ids_of(&mut conn, &frontier).await?;
    }

    Ok(total)
}

/// Number of items directly inside the folder (non-recursive).
pub async fn item_count(db: &SqlitePool, folder_id: i64) -> AppResult<i64> {
    let mut conn = db.acquire().await?;
    if !folder_exists(&mut conn, folder_id).await? {
        return Err(AppError::NotFound(format!("Folder {} not found", folder_id)));
    }
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE folder_id = ?1")
        .bind(folder_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

/// Number of direct subfolders (non-recursive).
pub async fn subfolder_count(db: &SqlitePool, folder_id: i64) -> AppResult<i64> {
    let mut conn = db.acquire().await?;
    if !folder_exists(&mut conn, folder_id).await? {
        return Err(AppError::NotFound(format!("Folder {} not found", folder_id)));
    }
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE parent_id = ?1")
        .bind(folder_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

/// Forest-wide totals: all folders, all items, summed quantity.
pub async fn realtime_counts(db: &SqlitePool) -> AppResult<CountsDto> {
    let total_folders: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM folders").fetch_one(db).await?;
    let total_items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items").fetch_one(db).await?;
    let total_quantity: f64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0.0) FROM items").fetch_one(db).await?;
    Ok(CountsDto { total_folders, total_items, total_quantity })
}
