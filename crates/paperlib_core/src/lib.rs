//! Core domain library for PaperLib (folder cache, tree rules, trash reconciliation).

/// Per-item result aggregation for bulk operations.
pub mod batch;
/// Configuration loading and defaults.
pub mod config;
/// Shared sentinel ids and defaults.
pub mod constants;
/// Application error taxonomy.
pub mod error;
/// Folder hierarchy derivation and parent-selection rules.
pub mod folder_tree;
/// Data models exchanged with the library API.
pub mod models;
/// Soft-delete, restore, and purge reconciliation.
pub mod trash;
/// Session view state and the folder cache owner.
pub mod view;

pub use batch::BatchOutcome;
pub use config::Config;
pub use constants::*;
pub use error::AppError;
pub use view::{ListFilter, ListRequest, SearchInput, ViewModel, ViewState};
