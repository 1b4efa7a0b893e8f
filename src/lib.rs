//! Root crate facade for the PaperLib client libraries.

pub use paperlib_client::{
    api, controller, http, FolderDeletion, HttpLibraryApi, LibraryApi, LibraryController,
    PaperUpload, RestoreOutcome, UploadFile,
};
pub use paperlib_core::{
    batch, config, constants, error, folder_tree, models, trash, view, AppError, BatchOutcome,
    Config, ListRequest, SearchInput, ViewModel, DEFAULT_FOLDER_ID, TRASH_FOLDER_ID,
};
