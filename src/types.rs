use serde::{Deserialize, Serialize};

/// A folder resolved with its full subtree: direct items (each with their
/// images), direct images, and subfolders recursively in the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderTree {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<String>,
    pub created_at: String,
    pub items: Vec<ItemDto>,
    pub subfolders: Vec<FolderTree>,
    pub images: Vec<ImageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<String>,
    pub quantity: f64,
    pub unit: Option<String>,
    pub folder_id: Option<i64>,
    pub created_at: String,
    pub images: Vec<ImageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDto {
    pub id: i64,
    pub filename: String,
    pub filepath: String,
    pub description: Option<String>,
    pub item_id: Option<i64>,
    pub folder_id: Option<i64>,
    pub created_at: String,
}

// ---- Folder requests ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    pub parent_id: Option<i64>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<String>,
}

/// Partial update. `None` leaves a field unchanged; parent reassignment is
/// not accepted here, moves go through the move operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveFolderRequest {
    /// Target parent; `None` moves the folder to root.
    pub new_parent_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloneFolderRequest {
    /// Target parent for the clone; `None` keeps the source's parent.
    pub new_parent_id: Option<i64>,
    /// Place the clone at root regardless of the source's parent.
    #[serde(default)]
    pub to_root: bool,
}

// ---- Item requests ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub folder_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveItemRequest {
    /// Target folder; `None` moves the item to root.
    pub new_folder_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloneItemRequest {
    /// Target folder for the clone; `None` keeps the source's folder.
    pub new_folder_id: Option<i64>,
}

// ---- Image requests ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateImageRequest {
    pub filename: String,
    pub filepath: String,
    pub description: Option<String>,
    /// Owning item; exactly one of item_id/folder_id must be set.
    pub item_id: Option<i64>,
    /// Owning folder; exactly one of item_id/folder_id must be set.
    pub folder_id: Option<i64>,
}

/// Partial update. Supplying either ownership field reassigns the owner and
/// re-validates the XOR rule over the supplied pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateImageRequest {
    pub filename: Option<String>,
    pub filepath: Option<String>,
    pub description: Option<String>,
    pub item_id: Option<i64>,
    pub folder_id: Option<i64>,
}

// ---- Queries & aggregates ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemListQuery {
    pub folder_id: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageListQuery {
    pub item_id: Option<i64>,
    pub folder_id: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderQuantity {
    pub folder_id: Option<i64>,
    pub total_quantity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCount {
    pub folder_id: i64,
    pub item_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubfolderCount {
    pub folder_id: i64,
    pub subfolder_count: i64,
}

/// Forest-wide counters for the realtime counts endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountsDto {
    pub total_folders: i64,
    pub total_items: i64,
    pub total_quantity: f64,
}
