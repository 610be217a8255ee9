//! # LagerWald Backend Library
//!
//! This is the core library for LagerWald, a hierarchical inventory
//! management backend. LagerWald stores folders, items and image references
//! in a tree and exposes the tree operations over a REST API.
//!
//! ## Architecture
//!
//! The application is built using:
//! - **Axum**: Modern web framework for HTTP server and routing
//! - **SQLx**: Asynchronous database operations with SQLite
//! - **Tokio**: Async runtime for concurrent operations
//! - **Serde**: Serialization/deserialization for JSON APIs
//!
//! ## Core Components
//!
//! - [`config`]: Application configuration management
//! - [`db`]: Database schema initialization and migrations
//! - [`error`]: Centralized error handling and HTTP error responses
//! - [`hierarchy`]: Folder tree engine (create, subtree fetch, move, clone,
//!   cascade delete) and recursive aggregation
//! - [`attachments`]: Item and image lifecycle attached to the tree
//! - [`metrics`]: Application usage metrics
//! - [`routes`]: HTTP API endpoint handlers
//! - [`state`]: Shared application state and resource management
//! - [`types`]: Data transfer objects and shared type definitions
//!
//! ## Features
//!
//! - Eager subtree materialization for folder reads
//! - Atomic cascade deletion and deep cloning of whole subtrees
//! - Cycle-safe folder moves (a folder can never become its own ancestor)
//! - Recursive quantity aggregation without materializing subtrees
//! - XOR-enforced image ownership (item or folder, never both)
//! - Comprehensive error handling and logging

pub mod attachments;
pub mod config;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
