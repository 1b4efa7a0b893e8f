//! Library API trait abstraction.
//!
//! One async method per remote endpoint, so the controller can run against
//! the HTTP client or an in-memory double.

use async_trait::async_trait;
use paperlib_core::{
    models::{
        Folder, FolderPayload, LibraryStats, MetadataUpdate, Paper, SearchHit, UploadMetadata,
    },
    AppError, PDF_MIME_TYPE,
};
use std::path::Path;

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a file from disk.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when the path has no file name or
    /// cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, AppError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                AppError::Validation(format!("'{}' is not a file path", path.display()))
            })?;
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            AppError::Validation(format!("Failed to read '{}': {}", path.display(), err))
        })?;
        Ok(Self { file_name, bytes })
    }

    /// MIME type inferred from the extension.
    pub fn content_type(&self) -> &'static str {
        if self.is_pdf() {
            PDF_MIME_TYPE
        } else {
            "application/octet-stream"
        }
    }

    pub fn is_pdf(&self) -> bool {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
    }
}

/// One multipart request to `POST /papers/`.
#[derive(Debug, Clone)]
pub struct PaperUpload<'a> {
    pub file: &'a UploadFile,
    pub metadata: UploadMetadata,
    pub folder_id: Option<&'a str>,
}

#[async_trait]
pub trait LibraryApi: Send + Sync {
    /// `GET /folders/`
    async fn list_folders(&self) -> Result<Vec<Folder>, AppError>;
    /// `POST /folders/`
    async fn create_folder(&self, payload: &FolderPayload) -> Result<Folder, AppError>;
    /// `PUT /folders/{id}`
    async fn update_folder(&self, folder_id: &str, payload: &FolderPayload)
        -> Result<Folder, AppError>;
    /// `DELETE /folders/{id}`
    async fn delete_folder(&self, folder_id: &str) -> Result<(), AppError>;

    /// `GET /papers/`
    async fn list_papers(&self) -> Result<Vec<Paper>, AppError>;
    /// `GET /papers/by-folder/{id}`
    async fn papers_by_folder(&self, folder_id: &str) -> Result<Vec<Paper>, AppError>;
    /// `GET /papers/by-category/{c}`
    async fn papers_by_category(&self, category: &str) -> Result<Vec<Paper>, AppError>;
    /// `GET /papers/by-tag/{t}`
    async fn papers_by_tag(&self, tag: &str) -> Result<Vec<Paper>, AppError>;

    /// `GET /papers/{filename}/metadata`
    async fn paper_metadata(&self, filename: &str) -> Result<Paper, AppError>;
    /// `PUT /papers/{filename}/metadata`
    async fn update_metadata(&self, filename: &str, update: &MetadataUpdate)
        -> Result<(), AppError>;
    /// `DELETE /papers/{filename}?soft_delete={bool}`
    async fn delete_paper(&self, filename: &str, soft_delete: bool) -> Result<(), AppError>;
    /// `PUT /papers/{filename}/move?folder_id={id}&original_folder_id={id}`
    async fn move_paper(
        &self,
        filename: &str,
        folder_id: Option<&str>,
        original_folder_id: Option<&str>,
    ) -> Result<(), AppError>;
    /// `POST /papers/` (multipart)
    async fn upload_paper(&self, upload: PaperUpload<'_>) -> Result<(), AppError>;

    /// `GET /search/?query=...`
    async fn search(&self, query: &str, n_results: usize) -> Result<Vec<SearchHit>, AppError>;
    /// `GET /stats`
    async fn stats(&self) -> Result<LibraryStats, AppError>;
}

#[cfg(test)]
mod tests {
    use super::UploadFile;

    #[test]
    fn pdf_detection_uses_extension() {
        assert!(UploadFile::new("paper.PDF", Vec::new()).is_pdf());
        assert!(!UploadFile::new("notes.txt", Vec::new()).is_pdf());
        assert!(!UploadFile::new("pdf", Vec::new()).is_pdf());
        assert_eq!(
            UploadFile::new("a.pdf", Vec::new()).content_type(),
            "application/pdf"
        );
    }

    #[tokio::test]
    async fn from_path_reads_name_and_bytes() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4").expect("write fixture");

        let file = UploadFile::from_path(&path).await.expect("read upload");
        assert_eq!(file.file_name, "doc.pdf");
        assert_eq!(file.bytes, b"%PDF-1.4");

        let missing = UploadFile::from_path(&dir.path().join("missing.pdf")).await;
        assert!(missing.is_err());
    }
}
