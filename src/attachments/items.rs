use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqliteConnection, SqlitePool};

use crate::error::{validation, AppError, AppResult, OptionExt};
use crate::hierarchy::folder_exists;
use crate::types::{CreateItemRequest, ItemDto, UpdateItemRequest};

use super::images::images_owned_by;

pub(crate) fn item_from_row(row: &SqliteRow) -> ItemDto {
    ItemDto {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        notes: row.get("notes"),
        tags: row.get("tags"),
        quantity: row.get("quantity"),
        unit: row.get("unit"),
        folder_id: row.get("folder_id"),
        created_at: row.get("created_at"),
        images: Vec::new(),
    }
}

pub(crate) async fn item_exists(conn: &mut SqliteConnection, id: i64) -> AppResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM items WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

async fn load_item(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<ItemDto>> {
    let row = sqlx::query(
        "SELECT id, name, description, notes, tags, quantity, unit, folder_id, created_at \
         FROM items WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.as_ref().map(item_from_row))
}

/// Creates an item, optionally inside an existing folder.
pub async fn create_item(db: &SqlitePool, req: &CreateItemRequest) -> AppResult<ItemDto> {
    validation::validate_name(&req.name, "name")?;
    let quantity = req.quantity.unwrap_or(0.0);
    validation::validate_quantity(quantity)?;
    if let Some(folder_id) = req.folder_id {
        let mut conn = db.acquire().await?;
        if !folder_exists(&mut conn, folder_id).await? {
            return Err(AppError::NotFound(format!("Folder {} not found", folder_id)));
        }
    }

    let result = sqlx::query(
        "INSERT INTO items (name, description, notes, tags, quantity, unit, folder_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.notes)
    .bind(&req.tags)
    .bind(quantity)
    .bind(&req.unit)
    .bind(req.folder_id)
    .execute(db)
    .await?;

    get_item(db, result.last_insert_rowid()).await
}

/// Fetches an item with its images.
pub async fn get_item(db: &SqlitePool, item_id: i64) -> AppResult<ItemDto> {
    let mut conn = db.acquire().await?;
    let mut item = load_item(&mut conn, item_id).await?.ok_or_not_found("Item")?;
    item.images = images_owned_by(&mut conn, "item_id", &[item_id]).await?;
    Ok(item)
}

/// Items in id order, optionally restricted to one folder, each with images.
pub async fn list_items(
    db: &SqlitePool,
    folder_id: Option<i64>,
    skip: i64,
    limit: i64,
) -> AppResult<Vec<ItemDto>> {
    let mut conn = db.acquire().await?;
    let mut qb = QueryBuilder::new(
        "SELECT id, name, description, notes, tags, quantity, unit, folder_id, created_at FROM items",
    );
    if let Some(folder_id) = folder_id {
        qb.push(" WHERE folder_id = ");
        qb.push_bind(folder_id);
    }
    qb.push(" ORDER BY id LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(skip);
    let rows = qb.build().fetch_all(&mut *conn).await?;
    let mut items: Vec<ItemDto> = rows.iter().map(item_from_row).collect();

    let item_ids: Vec<i64> = items.iter().map(|i| i.id).collect();
    let mut images = images_owned_by(&mut conn, "item_id", &item_ids).await?;
    for item in items.iter_mut() {
        // images come back ordered by id; split them out per owner
        let (own, rest): (Vec<_>, Vec<_>) =
            images.into_iter().partition(|img| img.item_id == Some(item.id));
        item.images = own;
        images = rest;
    }
    Ok(items)
}

/// All items directly inside an existing folder, each with images.
pub async fn list_folder_items(db: &SqlitePool, folder_id: i64) -> AppResult<Vec<ItemDto>> {
    {
        let mut conn = db.acquire().await?;
        if !folder_exists(&mut conn, folder_id).await? {
            return Err(AppError::NotFound(format!("Folder {} not found", folder_id)));
        }
    }
    list_items(db, Some(folder_id), 0, i64::MAX).await
}

/// Applies only the supplied fields. folder_id is not patchable; moves go
/// through [`move_item`].
pub async fn update_item(
    db: &SqlitePool,
    item_id: i64,
    patch: &UpdateItemRequest,
) -> AppResult<ItemDto> {
    {
        let mut conn = db.acquire().await?;
        if !item_exists(&mut conn, item_id).await? {
            return Err(AppError::NotFound(format!("Item {} not found", item_id)));
        }
    }

    if let Some(name) = &patch.name {
        validation::validate_name(name, "name")?;
    }
    if let Some(quantity) = patch.quantity {
        validation::validate_quantity(quantity)?;
    }

    if patch.name.is_some()
        || patch.description.is_some()
        || patch.notes.is_some()
        || patch.tags.is_some()
        || patch.quantity.is_some()
        || patch.unit.is_some()
    {
        let mut qb = QueryBuilder::new("UPDATE items SET ");
        let mut sep = qb.separated(", ");
        if let Some(name) = &patch.name {
            sep.push("name = ");
            sep.push_bind_unseparated(name.clone());
        }
        if let Some(description) = &patch.description {
            sep.push("description = ");
            sep.push_bind_unseparated(description.clone());
        }
        if let Some(notes) = &patch.notes {
            sep.push("notes = ");
            sep.push_bind_unseparated(notes.clone());
        }
        if let Some(tags) = &patch.tags {
            sep.push("tags = ");
            sep.push_bind_unseparated(tags.clone());
        }
        if let Some(quantity) = patch.quantity {
            sep.push("quantity = ");
            sep.push_bind_unseparated(quantity);
        }
        if let Some(unit) = &patch.unit {
            sep.push("unit = ");
            sep.push_bind_unseparated(unit.clone());
        }
        qb.push(" WHERE id = ");
        qb.push_bind(item_id);
        qb.build().execute(db).await?;
    }

    get_item(db, item_id).await
}

/// Deletes an item together with its images, atomically.
pub async fn delete_item(db: &SqlitePool, item_id: i64) -> AppResult<()> {
    let mut tx = db.begin().await?;
    if !item_exists(&mut tx, item_id).await? {
        return Err(AppError::NotFound(format!("Item {} not found", item_id)));
    }
    sqlx::query("DELETE FROM images WHERE item_id = ?1").bind(item_id).execute(&mut *tx).await?;
    sqlx::query("DELETE FROM items WHERE id = ?1").bind(item_id).execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
}

/// Reassigns an item's folder. `None` moves it to root.
pub async fn move_item(
    db: &SqlitePool,
    item_id: i64,
    new_folder_id: Option<i64>,
) -> AppResult<ItemDto> {
    let mut conn = db.acquire().await?;
    if !item_exists(&mut conn, item_id).await? {
        return Err(AppError::NotFound(format!("Item {} not found", item_id)));
    }
    if let Some(folder_id) = new_folder_id {
        if !folder_exists(&mut conn, folder_id).await? {
            return Err(AppError::NotFound(format!("Target folder {} not found", folder_id)));
        }
    }
    sqlx::query("UPDATE items SET folder_id = ?1 WHERE id = ?2")
        .bind(new_folder_id)
        .bind(item_id)
        .execute(&mut *conn)
        .await?;
    drop(conn);
    get_item(db, item_id).await
}

/// Copies an item and all of its images to a new item id. The original is
/// untouched; the standalone clone carries the name suffix.
pub async fn clone_item(
    db: &SqlitePool,
    item_id: i64,
    new_folder_id: Option<i64>,
    name_suffix: &str,
) -> AppResult<ItemDto> {
    let mut tx = db.begin().await?;
    let src = load_item(&mut tx, item_id).await?.ok_or_not_found("Item")?;

    let dest_folder = match new_folder_id {
        Some(folder_id) => {
            if !folder_exists(&mut tx, folder_id).await? {
                return Err(AppError::NotFound(format!("Target folder {} not found", folder_id)));
            }
            Some(folder_id)
        }
        None => src.folder_id,
    };

    let new_name = format!("{}{}", src.name, name_suffix);
    let new_id = copy_item_into(&mut tx, item_id, dest_folder, Some(&new_name)).await?;
    tx.commit().await?;
    get_item(db, new_id).await
}

/// Transaction-scoped copy primitive shared with the folder clone, which
/// preserves item names (`new_name` = None).
pub(crate) async fn copy_item_into(
    conn: &mut SqliteConnection,
    src_item_id: i64,
    dest_folder: Option<i64>,
    new_name: Option<&str>,
) -> AppResult<i64> {
    let src = load_item(&mut *conn, src_item_id).await?.ok_or_not_found("Item")?;
    let name = new_name.map(str::to_string).unwrap_or(src.name);

    let result = sqlx::query(
        "INSERT INTO items (name, description, notes, tags, quantity, unit, folder_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&name)
    .bind(&src.description)
    .bind(&src.notes)
    .bind(&src.tags)
    .bind(src.quantity)
    .bind(&src.unit)
    .bind(dest_folder)
    .execute(&mut *conn)
    .await?;
    let new_id = result.last_insert_rowid();

    sqlx::query(
        "INSERT INTO images (filename, filepath, description, item_id) \
         SELECT filename, filepath, description, ?1 FROM images WHERE item_id = ?2 ORDER BY id",
    )
    .bind(new_id)
    .bind(src_item_id)
    .execute(&mut *conn)
    .await?;

    Ok(new_id)
}
