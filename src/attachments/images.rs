use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqliteConnection, SqlitePool};

use crate::error::{validation, AppError, AppResult, OptionExt};
use crate::hierarchy::folder_exists;
use crate::types::{CreateImageRequest, ImageDto, UpdateImageRequest};

use super::items::item_exists;

/// Keep IN-lists comfortably under SQLite's bound-parameter limit (999).
const IN_CHUNK: usize = 500;

pub(crate) fn image_from_row(row: &SqliteRow) -> ImageDto {
    ImageDto {
        id: row.get("id"),
        filename: row.get("filename"),
        filepath: row.get("filepath"),
        description: row.get("description"),
        item_id: row.get("item_id"),
        folder_id: row.get("folder_id"),
        created_at: row.get("created_at"),
    }
}

/// Images owned through the given column ("item_id" or "folder_id") by any
/// of the given owners, in id order per chunk.
pub(crate) async fn images_owned_by(
    conn: &mut SqliteConnection,
    owner_column: &str,
    owners: &[i64],
) -> AppResult<Vec<ImageDto>> {
    let mut out = Vec::new();
    for chunk in owners.chunks(IN_CHUNK) {
        let mut qb = QueryBuilder::new(format!(
            "SELECT id, filename, filepath, description, item_id, folder_id, created_at \
             FROM images WHERE {} IN (",
            owner_column
        ));
        let mut sep = qb.separated(", ");
        for id in chunk {
            sep.push_bind(*id);
        }
        qb.push(") ORDER BY id");
        let rows = qb.build().fetch_all(&mut *conn).await?;
        out.extend(rows.iter().map(image_from_row));
    }
    Ok(out)
}

async fn load_image(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<ImageDto>> {
    let row = sqlx::query(
        "SELECT id, filename, filepath, description, item_id, folder_id, created_at \
         FROM images WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.as_ref().map(image_from_row))
}

/// Creates an image record. Ownership is XOR: exactly one of item_id and
/// folder_id, validated before the store is touched.
pub async fn create_image(db: &SqlitePool, req: &CreateImageRequest) -> AppResult<ImageDto> {
    validation::validate_name(&req.filename, "filename")?;
    validation::validate_name(&req.filepath, "filepath")?;

    let mut conn = db.acquire().await?;
    match (req.item_id, req.folder_id) {
        (Some(_), Some(_)) | (None, None) => {
            return Err(AppError::InvalidOperation(
                "an image must belong to exactly one of an item or a folder".to_string(),
            ));
        }
        (Some(item_id), None) => {
            if !item_exists(&mut conn, item_id).await? {
                return Err(AppError::NotFound(format!("Item {} not found", item_id)));
            }
        }
        (None, Some(folder_id)) => {
            if !folder_exists(&mut conn, folder_id).await? {
                return Err(AppError::NotFound(format!("Folder {} not found", folder_id)));
            }
        }
    }

    let result = sqlx::query(
        "INSERT INTO images (filename, filepath, description, item_id, folder_id) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&req.filename)
    .bind(&req.filepath)
    .bind(&req.description)
    .bind(req.item_id)
    .bind(req.folder_id)
    .execute(&mut *conn)
    .await?;

    let image = load_image(&mut conn, result.last_insert_rowid()).await?;
    image.ok_or_not_found("Image")
}

pub async fn get_image(db: &SqlitePool, image_id: i64) -> AppResult<ImageDto> {
    let mut conn = db.acquire().await?;
    load_image(&mut conn, image_id).await?.ok_or_not_found("Image")
}

/// Images in id order, optionally filtered by owning item and/or folder.
pub async fn list_images(
    db: &SqlitePool,
    item_id: Option<i64>,
    folder_id: Option<i64>,
    skip: i64,
    limit: i64,
) -> AppResult<Vec<ImageDto>> {
    let mut conn = db.acquire().await?;
    let mut qb = QueryBuilder::new(
        "SELECT id, filename, filepath, description, item_id, folder_id, created_at \
         FROM images WHERE 1=1",
    );
    if let Some(item_id) = item_id {
        qb.push(" AND item_id = ");
        qb.push_bind(item_id);
    }
    if let Some(folder_id) = folder_id {
        qb.push(" AND folder_id = ");
        qb.push_bind(folder_id);
    }
    qb.push(" ORDER BY id LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(skip);
    let rows = qb.build().fetch_all(&mut *conn).await?;
    Ok(rows.iter().map(image_from_row).collect())
}

/// Applies only the supplied fields. Supplying either ownership field
/// reassigns the owner under the XOR rule; the other column is cleared in
/// the same statement.
pub async fn update_image(
    db: &SqlitePool,
    image_id: i64,
    patch: &UpdateImageRequest,
) -> AppResult<ImageDto> {
    let mut conn = db.acquire().await?;
    if load_image(&mut conn, image_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Image {} not found", image_id)));
    }

    if let Some(filename) = &patch.filename {
        validation::validate_name(filename, "filename")?;
    }
    if let Some(filepath) = &patch.filepath {
        validation::validate_name(filepath, "filepath")?;
    }

    let ownership_touched = patch.item_id.is_some() || patch.folder_id.is_some();
    if ownership_touched {
        match (patch.item_id, patch.folder_id) {
            (Some(_), Some(_)) => {
                return Err(AppError::InvalidOperation(
                    "an image must belong to exactly one of an item or a folder".to_string(),
                ));
            }
            (Some(item_id), None) => {
                if !item_exists(&mut conn, item_id).await? {
                    return Err(AppError::NotFound(format!("Item {} not found", item_id)));
                }
            }
            (None, Some(folder_id)) => {
                if !folder_exists(&mut conn, folder_id).await? {
                    return Err(AppError::NotFound(format!("Folder {} not found", folder_id)));
                }
            }
            (None, None) => unreachable!(),
        }
    }

    if ownership_touched
        || patch.filename.is_some()
        || patch.filepath.is_some()
        || patch.description.is_some()
    {
        let mut qb = QueryBuilder::new("UPDATE images SET ");
        let mut sep = qb.separated(", ");
        if let Some(filename) = &patch.filename {
            sep.push("filename = ");
            sep.push_bind_unseparated(filename.clone());
        }
        if let Some(filepath) = &patch.filepath {
            sep.push("filepath = ");
            sep.push_bind_unseparated(filepath.clone());
        }
        if let Some(description) = &patch.description {
            sep.push("description = ");
            sep.push_bind_unseparated(description.clone());
        }
        if ownership_touched {
            sep.push("item_id = ");
            sep.push_bind_unseparated(patch.item_id);
            sep.push("folder_id = ");
            sep.push_bind_unseparated(patch.folder_id);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(image_id);
        qb.build().execute(&mut *conn).await?;
    }

    load_image(&mut conn, image_id).await?.ok_or_not_found("Image")
}

/// Removes an image by id.
pub async fn delete_image(db: &SqlitePool, image_id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM images WHERE id = ?1").bind(image_id).execute(db).await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Image {} not found", image_id)));
    }
    Ok(())
}
