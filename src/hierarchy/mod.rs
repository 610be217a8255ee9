//! Folder tree engine.
//!
//! Owns the structural invariants of the folder hierarchy: parent links are
//! acyclic, deletion cascades over the whole subtree in one transaction, and
//! cloning deep-copies folders, items and images with fresh ids. All
//! operations take the pool handle explicitly; the engine keeps no state of
//! its own.

pub mod aggregate;

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqliteConnection, SqlitePool};

use crate::attachments::images::images_owned_by;
use crate::attachments::items::{copy_item_into, item_from_row};
use crate::error::{validation, AppError, AppResult, OptionExt};
use crate::types::{
    CloneFolderRequest, CreateFolderRequest, FolderTree, ImageDto, ItemDto, UpdateFolderRequest,
};

/// Keep IN-lists comfortably under SQLite's bound-parameter limit (999).
const IN_CHUNK: usize = 500;

#[derive(Debug, Clone)]
struct FolderRow {
    id: i64,
    name: String,
    parent_id: Option<i64>,
    description: Option<String>,
    notes: Option<String>,
    tags: Option<String>,
    created_at: String,
}

fn folder_from_row(row: &SqliteRow) -> FolderRow {
    FolderRow {
        id: row.get("id"),
        name: row.get("name"),
        parent_id: row.get("parent_id"),
        description: row.get("description"),
        notes: row.get("notes"),
        tags: row.get("tags"),
        created_at: row.get("created_at"),
    }
}

pub(crate) async fn folder_exists(conn: &mut SqliteConnection, id: i64) -> AppResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM folders WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

async fn load_folder_row(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<FolderRow>> {
    let row = sqlx::query(
        "SELECT id, name, parent_id, description, notes, tags, created_at FROM folders WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.as_ref().map(folder_from_row))
}

async fn folders_with_parent_in(
    conn: &mut SqliteConnection,
    parents: &[i64],
) -> AppResult<Vec<FolderRow>> {
    let mut out = Vec::new();
    for chunk in parents.chunks(IN_CHUNK) {
        let mut qb = QueryBuilder::new(
            "SELECT id, name, parent_id, description, notes, tags, created_at FROM folders WHERE parent_id IN (",
        );
        let mut sep = qb.separated(", ");
        for id in chunk {
            sep.push_bind(*id);
        }
        qb.push(") ORDER BY id");
        let rows = qb.build().fetch_all(&mut *conn).await?;
        out.extend(rows.iter().map(folder_from_row));
    }
    Ok(out)
}

/// Direct child ids of the given set of folders.
pub(crate) async fn child_ids_of(
    conn: &mut SqliteConnection,
    parents: &[i64],
) -> AppResult<Vec<i64>> {
    let mut out = Vec::new();
    for chunk in parents.chunks(IN_CHUNK) {
        let mut qb = QueryBuilder::new("SELECT id FROM folders WHERE parent_id IN (");
        let mut sep = qb.separated(", ");
        for id in chunk {
            sep.push_bind(*id);
        }
        qb.push(") ORDER BY id");
        let ids: Vec<i64> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
        out.extend(ids);
    }
    Ok(out)
}

async fn items_in_folders(conn: &mut SqliteConnection, folders: &[i64]) -> AppResult<Vec<ItemDto>> {
    let mut out = Vec::new();
    for chunk in folders.chunks(IN_CHUNK) {
        let mut qb = QueryBuilder::new(
            "SELECT id, name, description, notes, tags, quantity, unit, folder_id, created_at FROM items WHERE folder_id IN (",
        );
        let mut sep = qb.separated(", ");
        for id in chunk {
            sep.push_bind(*id);
        }
        qb.push(") ORDER BY id");
        let rows = qb.build().fetch_all(&mut *conn).await?;
        out.extend(rows.iter().map(item_from_row));
    }
    Ok(out)
}

/// Materializes the full subtree of each given root row: all descendant
/// folders level by level, then items and images in bulk, assembled in
/// memory. One pass over the store, no per-node queries.
async fn load_subtrees(
    conn: &mut SqliteConnection,
    roots: Vec<FolderRow>,
) -> AppResult<Vec<FolderTree>> {
    let mut all_rows: Vec<FolderRow> = roots.clone();
    let mut frontier: Vec<i64> = roots.iter().map(|r| r.id).collect();
    while !frontier.is_empty() {
        let rows = folders_with_parent_in(&mut *conn, &frontier).await?;
        frontier = rows.iter().map(|r| r.id).collect();
        all_rows.extend(rows);
    }

    let folder_ids: Vec<i64> = all_rows.iter().map(|r| r.id).collect();
    let mut items = items_in_folders(&mut *conn, &folder_ids).await?;
    let item_ids: Vec<i64> = items.iter().map(|i| i.id).collect();
    let folder_images = images_owned_by(&mut *conn, "folder_id", &folder_ids).await?;
    let item_images = images_owned_by(&mut *conn, "item_id", &item_ids).await?;

    let mut images_by_item: HashMap<i64, Vec<ImageDto>> = HashMap::new();
    for img in item_images {
        // owner column is non-null for every row returned here
        let owner = img.item_id.unwrap_or_default();
        images_by_item.entry(owner).or_default().push(img);
    }
    for item in &mut items {
        if let Some(imgs) = images_by_item.remove(&item.id) {
            item.images = imgs;
        }
    }

    let mut items_by_folder: HashMap<i64, Vec<ItemDto>> = HashMap::new();
    for item in items {
        let owner = item.folder_id.unwrap_or_default();
        items_by_folder.entry(owner).or_default().push(item);
    }
    let mut images_by_folder: HashMap<i64, Vec<ImageDto>> = HashMap::new();
    for img in folder_images {
        let owner = img.folder_id.unwrap_or_default();
        images_by_folder.entry(owner).or_default().push(img);
    }
    let mut rows_by_parent: HashMap<i64, Vec<FolderRow>> = HashMap::new();
    let root_count = roots.len();
    for row in all_rows.into_iter().skip(root_count) {
        let parent = row.parent_id.unwrap_or_default();
        rows_by_parent.entry(parent).or_default().push(row);
    }

    fn build_node(
        row: FolderRow,
        rows_by_parent: &mut HashMap<i64, Vec<FolderRow>>,
        items_by_folder: &mut HashMap<i64, Vec<ItemDto>>,
        images_by_folder: &mut HashMap<i64, Vec<ImageDto>>,
    ) -> FolderTree {
        let child_rows = rows_by_parent.remove(&row.id).unwrap_or_default();
        let subfolders = child_rows
            .into_iter()
            .map(|c| build_node(c, rows_by_parent, items_by_folder, images_by_folder))
            .collect();
        FolderTree {
            id: row.id,
            name: row.name,
            parent_id: row.parent_id,
            description: row.description,
            notes: row.notes,
            tags: row.tags,
            created_at: row.created_at,
            items: items_by_folder.remove(&row.id).unwrap_or_default(),
            subfolders,
            images: images_by_folder.remove(&row.id).unwrap_or_default(),
        }
    }

    Ok(roots
        .into_iter()
        .map(|r| build_node(r, &mut rows_by_parent, &mut items_by_folder, &mut images_by_folder))
        .collect())
}

/// Creates a folder, optionally under an existing parent.
pub async fn create_folder(db: &SqlitePool, req: &CreateFolderRequest) -> AppResult<FolderTree> {
    validation::validate_name(&req.name, "name")?;
    if let Some(parent_id) = req.parent_id {
        let mut conn = db.acquire().await?;
        if !folder_exists(&mut conn, parent_id).await? {
            return Err(AppError::NotFound(format!("Parent folder {} not found", parent_id)));
        }
    }

    let result = sqlx::query(
        "INSERT INTO folders (name, parent_id, description, notes, tags) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&req.name)
    .bind(req.parent_id)
    .bind(&req.description)
    .bind(&req.notes)
    .bind(&req.tags)
    .execute(db)
    .await?;

    get_folder(db, result.last_insert_rowid()).await
}

/// Fetches a folder with its full subtree eagerly resolved.
pub async fn get_folder(db: &SqlitePool, folder_id: i64) -> AppResult<FolderTree> {
    let mut conn = db.acquire().await?;
    let root = load_folder_row(&mut conn, folder_id).await?.ok_or_not_found("Folder")?;
    let mut trees = load_subtrees(&mut conn, vec![root]).await?;
    Ok(trees.remove(0))
}

/// Root folders (parent_id IS NULL) in id order, each with its full subtree.
pub async fn list_roots(db: &SqlitePool, skip: i64, limit: i64) -> AppResult<Vec<FolderTree>> {
    let mut conn = db.acquire().await?;
    let rows = sqlx::query(
        "SELECT id, name, parent_id, description, notes, tags, created_at FROM folders \
         WHERE parent_id IS NULL ORDER BY id LIMIT ?1 OFFSET ?2",
    )
    .bind(limit)
    .bind(skip)
    .fetch_all(&mut *conn)
    .await?;
    let roots: Vec<FolderRow> = rows.iter().map(folder_from_row).collect();
    load_subtrees(&mut conn, roots).await
}

/// Direct subfolders of a folder, each with its full subtree.
pub async fn list_children(db: &SqlitePool, folder_id: i64) -> AppResult<Vec<FolderTree>> {
    let mut conn = db.acquire().await?;
    if !folder_exists(&mut conn, folder_id).await? {
        return Err(AppError::NotFound(format!("Folder {} not found", folder_id)));
    }
    let children = folders_with_parent_in(&mut conn, &[folder_id]).await?;
    load_subtrees(&mut conn, children).await
}

/// Applies only the supplied fields. Parent reassignment is rejected by the
/// request shape; moves go through [`move_folder`].
pub async fn update_folder(
    db: &SqlitePool,
    folder_id: i64,
    patch: &UpdateFolderRequest,
) -> AppResult<FolderTree> {
    {
        let mut conn = db.acquire().await?;
        if !folder_exists(&mut conn, folder_id).await? {
            return Err(AppError::NotFound(format!("Folder {} not found", folder_id)));
        }
    }

    if let Some(name) = &patch.name {
        validation::validate_name(name, "name")?;
    }

    if patch.name.is_some()
        || patch.description.is_some()
        || patch.notes.is_some()
        || patch.tags.is_some()
    {
        let mut qb = QueryBuilder::new("UPDATE folders SET ");
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
        qb.push(" WHERE id = ");
        qb.push_bind(folder_id);
        qb.build().execute(db).await?;
    }

    get_folder(db, folder_id).await
}

/// Collects subtree folder ids level by level, root level first.
async fn collect_subtree_levels(
    conn: &mut SqliteConnection,
    root: i64,
) -> AppResult<Vec<Vec<i64>>> {
    let mut levels = vec![vec![root]];
    loop {
        let next = child_ids_of(&mut *conn, levels.last().unwrap()).await?;
        if next.is_empty() {
            break;
        }
        levels.push(next);
    }
    Ok(levels)
}

/// Deletes a folder and its entire subtree (descendant folders, their items,
/// and all images owned by any of them) in a single transaction.
pub async fn delete_folder(db: &SqlitePool, folder_id: i64) -> AppResult<()> {
    let mut tx = db.begin().await?;
    if !folder_exists(&mut tx, folder_id).await? {
        return Err(AppError::NotFound(format!("Folder {} not found", folder_id)));
    }

    let levels = collect_subtree_levels(&mut tx, folder_id).await?;
    let all_ids: Vec<i64> = levels.iter().flatten().copied().collect();

    for chunk in all_ids.chunks(IN_CHUNK) {
        let mut qb = QueryBuilder::new(
            "DELETE FROM images WHERE item_id IN (SELECT id FROM items WHERE folder_id IN (",
        );
        let mut sep = qb.separated(", ");
        for id in chunk {
            sep.push_bind(*id);
        }
        qb.push("))");
        qb.build().execute(&mut *tx).await?;

        let mut qb = QueryBuilder::new("DELETE FROM images WHERE folder_id IN (");
        let mut sep = qb.separated(", ");
        for id in chunk {
            sep.push_bind(*id);
        }
        qb.push(")");
        qb.build().execute(&mut *tx).await?;

        let mut qb = QueryBuilder::new("DELETE FROM items WHERE folder_id IN (");
        let mut sep = qb.separated(", ");
        for id in chunk {
            sep.push_bind(*id);
        }
        qb.push(")");
        qb.build().execute(&mut *tx).await?;
    }

    // Deepest level first so no parent row goes away before its children.
    for level in levels.iter().rev() {
        for chunk in level.chunks(IN_CHUNK) {
            let mut qb = QueryBuilder::new("DELETE FROM folders WHERE id IN (");
            let mut sep = qb.separated(", ");
            for id in chunk {
                sep.push_bind(*id);
            }
            qb.push(")");
            qb.build().execute(&mut *tx).await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Reassigns a folder's parent. `None` moves it to root. Rejects
/// self-parenting and any move into the folder's own subtree, detected by
/// walking the target's ancestor chain upward.
pub async fn move_folder(
    db: &SqlitePool,
    folder_id: i64,
    new_parent_id: Option<i64>,
) -> AppResult<FolderTree> {
    let mut conn = db.acquire().await?;
    if !folder_exists(&mut conn, folder_id).await? {
        return Err(AppError::NotFound(format!("Folder {} not found", folder_id)));
    }

    if let Some(parent_id) = new_parent_id {
        if parent_id == folder_id {
            return Err(AppError::InvalidOperation(
                "a folder cannot be its own parent".to_string(),
            ));
        }
        let parent = load_folder_row(&mut conn, parent_id)
            .await?
            .ok_or_not_found("Target parent folder")?;
        let mut cursor = parent.parent_id;
        while let Some(ancestor) = cursor {
            if ancestor == folder_id {
                return Err(AppError::InvalidOperation(
                    "cannot move a folder into its own subtree".to_string(),
                ));
            }
            cursor = sqlx::query_scalar::<_, Option<i64>>(
                "SELECT parent_id FROM folders WHERE id = ?1",
            )
            .bind(ancestor)
            .fetch_optional(&mut *conn)
            .await?
            .flatten();
        }
    }

    sqlx::query("UPDATE folders SET parent_id = ?1 WHERE id = ?2")
        .bind(new_parent_id)
        .bind(folder_id)
        .execute(&mut *conn)
        .await?;
    drop(conn);

    get_folder(db, folder_id).await
}

/// Deep-copies a folder's subtree in one transaction. Every cloned folder,
/// item and image gets a fresh id; only the top-level clone's name carries
/// the suffix, everything else is preserved verbatim.
pub async fn clone_folder(
    db: &SqlitePool,
    folder_id: i64,
    req: &CloneFolderRequest,
    name_suffix: &str,
) -> AppResult<FolderTree> {
    let mut tx = db.begin().await?;
    let src = load_folder_row(&mut tx, folder_id).await?.ok_or_not_found("Folder")?;

    let target_parent = if req.to_root {
        None
    } else {
        match req.new_parent_id {
            Some(parent_id) => {
                if !folder_exists(&mut tx, parent_id).await? {
                    return Err(AppError::NotFound(format!(
                        "Target parent folder {} not found",
                        parent_id
                    )));
                }
                Some(parent_id)
            }
            None => src.parent_id,
        }
    };

    // Snapshot the source structure before the first insert, so cloning into
    // the source's own subtree cannot pick up freshly inserted rows.
    let mut rows_by_id: HashMap<i64, FolderRow> = HashMap::new();
    let mut children_of: HashMap<i64, Vec<i64>> = HashMap::new();
    rows_by_id.insert(src.id, src);
    let mut frontier = vec![folder_id];
    while !frontier.is_empty() {
        let rows = folders_with_parent_in(&mut tx, &frontier).await?;
        frontier = rows.iter().map(|r| r.id).collect();
        for row in rows {
            children_of.entry(row.parent_id.unwrap_or_default()).or_default().push(row.id);
            rows_by_id.insert(row.id, row);
        }
    }

    let mut new_root_id = 0i64;
    let mut stack: Vec<(i64, Option<i64>)> = vec![(folder_id, target_parent)];
    while let Some((src_id, dest_parent)) = stack.pop() {
        let row = rows_by_id
            .get(&src_id)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("subtree snapshot missing {}", src_id)))?;
        let name = if src_id == folder_id {
            format!("{}{}", row.name, name_suffix)
        } else {
            row.name.clone()
        };

        let result = sqlx::query(
            "INSERT INTO folders (name, parent_id, description, notes, tags) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&name)
        .bind(dest_parent)
        .bind(&row.description)
        .bind(&row.notes)
        .bind(&row.tags)
        .execute(&mut *tx)
        .await?;
        let new_id = result.last_insert_rowid();
        if src_id == folder_id {
            new_root_id = new_id;
        }

        // Items keep their names inside a folder clone.
        let item_ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM items WHERE folder_id = ?1 ORDER BY id")
                .bind(src_id)
                .fetch_all(&mut *tx)
                .await?;
        for item_id in item_ids {
            copy_item_into(&mut tx, item_id, Some(new_id), None).await?;
        }

        sqlx::query(
            "INSERT INTO images (filename, filepath, description, folder_id) \
             SELECT filename, filepath, description, ?1 FROM images WHERE folder_id = ?2 ORDER BY id",
        )
        .bind(new_id)
        .bind(src_id)
        .execute(&mut *tx)
        .await?;

        if let Some(children) = children_of.get(&src_id) {
            for child in children.iter().rev() {
                stack.push((*child, Some(new_id)));
            }
        }
    }

    tx.commit().await?;
    get_folder(db, new_root_id).await
}
