//! Item and image lifecycle as leaves attached to the folder tree.
//!
//! Items live directly in a folder (or at root); images belong to exactly
//! one item or one folder. Cascading deletion and deep copy on clone are
//! handled here and reused by the hierarchy engine.

pub mod images;
pub mod items;
