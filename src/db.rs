use sqlx::SqlitePool;

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    // Pragmas for better durability/performance
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    // Foreign keys are critical - fail if this doesn't work
    sqlx::query("PRAGMA foreign_keys=ON;").execute(pool).await?;

    // Additional tuning (best-effort)
    if let Err(e) = sqlx::query("PRAGMA busy_timeout=10000;").execute(pool).await {
        tracing::warn!("Failed to set busy_timeout: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA temp_store=MEMORY;").execute(pool).await {
        tracing::warn!("Failed to set temp_store: {}", e);
    }

    // folders table: self-referential parent_id forms the tree. Cascades are
    // owned by the hierarchy engine, not the schema.
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS folders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            parent_id INTEGER NULL,
            description TEXT NULL,
            notes TEXT NULL,
            tags TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(parent_id) REFERENCES folders(id)
        )"#,
    )
    .execute(pool)
    .await?;

    // items table
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NULL,
            notes TEXT NULL,
            tags TEXT NULL,
            quantity REAL NOT NULL DEFAULT 0 CHECK (quantity >= 0),
            unit TEXT NULL,
            folder_id INTEGER NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(folder_id) REFERENCES folders(id)
        )"#,
    )
    .execute(pool)
    .await?;

    // images table: exactly one owner (item XOR folder)
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL,
            filepath TEXT NOT NULL,
            description TEXT NULL,
            item_id INTEGER NULL,
            folder_id INTEGER NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(item_id) REFERENCES items(id),
            FOREIGN KEY(folder_id) REFERENCES folders(id),
            CHECK ((item_id IS NULL) <> (folder_id IS NULL))
        )"#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        ("idx_folders_parent", "CREATE INDEX IF NOT EXISTS idx_folders_parent ON folders(parent_id)"),
        ("idx_items_folder", "CREATE INDEX IF NOT EXISTS idx_items_folder ON items(folder_id)"),
        ("idx_images_item", "CREATE INDEX IF NOT EXISTS idx_images_item ON images(item_id)"),
        ("idx_images_folder", "CREATE INDEX IF NOT EXISTS idx_images_folder ON images(folder_id)"),
    ];

    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            // Check if it's a "already exists" error
            match &e {
                sqlx::Error::Database(db_err) => {
                    let msg = db_err.message().to_lowercase();
                    if msg.contains("already exists") || msg.contains("duplicate") {
                        tracing::debug!("Index {} already exists, skipping", name);
                    } else {
                        tracing::warn!("Failed to create index {}: {}", name, e);
                    }
                }
                _ => {
                    tracing::warn!("Failed to create index {}: {}", name, e);
                }
            }
        }
    }

    Ok(())
}
