//! Shared constants used across PaperLib crates.

/// Sentinel id of the always-present Default Library folder.
pub const DEFAULT_FOLDER_ID: &str = "default";
/// Display name of the Default Library folder.
pub const DEFAULT_FOLDER_NAME: &str = "Default Library";
/// Description attached to the synthetic Default Library entry.
pub const DEFAULT_FOLDER_DESCRIPTION: &str = "Default folder for papers";

/// Reserved folder id marking soft-deleted papers. Never a persisted folder.
pub const TRASH_FOLDER_ID: &str = "trash";
/// Display name used when the trash view is current.
pub const TRASH_FOLDER_NAME: &str = "Trash";

/// Name shown for folder references missing from the cache.
pub const UNKNOWN_FOLDER_NAME: &str = "Unknown folder";
/// Title of the unfiltered listing.
pub const ALL_PAPERS_TITLE: &str = "All Papers";

/// Default base URL for API clients.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Search input shorter than this is ignored.
pub const MIN_SEARCH_QUERY_LEN: usize = 3;
/// Default `n_results` forwarded to the search endpoint.
pub const DEFAULT_SEARCH_RESULTS: usize = 5;

/// MIME type accepted by multi-file uploads under the PDF-only policy.
pub const PDF_MIME_TYPE: &str = "application/pdf";
