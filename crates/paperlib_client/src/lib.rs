//! Async access to the paper library API and the command layer built on it.

/// API surface consumed by the controller.
pub mod api;
/// Command functions over the view model.
pub mod controller;
/// `reqwest` implementation of [`api::LibraryApi`].
pub mod http;

pub use api::{LibraryApi, PaperUpload, UploadFile};
pub use controller::{FolderDeletion, LibraryController, RestoreOutcome};
pub use http::HttpLibraryApi;
