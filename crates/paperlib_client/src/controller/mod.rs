//! Command functions over the library view model.
//!
//! [`LibraryController`] owns the [`ViewModel`] and the last fetched paper
//! listing. Each command issues its API calls in order, returns a `Result`,
//! and refreshes the current listing after a successful mutation. A failed
//! refresh is logged and does not fail the command that triggered it.

use crate::api::{LibraryApi, PaperUpload, UploadFile};
use paperlib_core::{
    folder_tree::{eligible_parents, introduces_cycle},
    models::{
        Folder, FolderCache, FolderPayload, LibraryStats, MetadataUpdate, Paper, UploadMetadata,
    },
    trash::{self, RestoreTarget, TrashMove},
    view::ListRequest,
    AppError, BatchOutcome, Config, SearchInput, ViewModel, DEFAULT_FOLDER_ID, TRASH_FOLDER_ID,
};
use tracing::{debug, error, info, warn};

/// Result of a folder delete.
#[derive(Debug)]
pub struct FolderDeletion {
    /// Papers moved to the trash ahead of the delete.
    pub trashed: BatchOutcome<String>,
    /// `false` when a trash move failed and the folder was left in place.
    pub deleted: bool,
}

/// Result of a restore request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored { folder_id: String },
    /// The original folder is gone and the fallback was declined.
    Declined { original_folder_id: String },
}

pub struct LibraryController<A> {
    api: A,
    view: ViewModel,
    papers: Vec<Paper>,
    search_results: usize,
    allow_non_pdf: bool,
}

impl<A: LibraryApi> LibraryController<A> {
    pub fn new(api: A, config: &Config) -> Self {
        Self {
            api,
            view: ViewModel::new(),
            papers: Vec::new(),
            search_results: config.search_results,
            allow_non_pdf: config.allow_non_pdf,
        }
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn folders(&self) -> &FolderCache {
        self.view.folders()
    }

    /// Listing produced by the most recent refresh.
    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    /// Refetch the folder list and rebuild the cache.
    pub async fn load_folders(&mut self) -> Result<&FolderCache, AppError> {
        let folders = self.api.list_folders().await.map_err(|err| {
            error!("Error loading folders: {}", err);
            err
        })?;
        self.view.replace_folders(folders);
        Ok(self.view.folders())
    }

    /// Refetch the listing selected by the current view state.
    ///
    /// Trashed papers only appear in the trash listing; every other
    /// endpoint's results are filtered locally.
    pub async fn refresh(&mut self) -> Result<&[Paper], AppError> {
        let request = self.view.list_request();
        debug!("Refreshing listing with {:?}", request);
        let papers = match &request {
            ListRequest::Trash => {
                trash::trash_papers(&self.api.papers_by_folder(TRASH_FOLDER_ID).await?)
            }
            ListRequest::Dashboard => self.api.list_papers().await?,
            ListRequest::ByFolder(folder_id) => self.api.papers_by_folder(folder_id).await?,
            ListRequest::ByCategory(category) => self.api.papers_by_category(category).await?,
            ListRequest::ByTag(tag) => self.api.papers_by_tag(tag).await?,
            ListRequest::Search(query) => self
                .api
                .search(query, self.search_results)
                .await?
                .into_iter()
                .map(|hit| hit.metadata)
                .collect(),
        };
        self.papers = match request {
            ListRequest::Trash => papers,
            _ => trash::dashboard_papers(&papers),
        };
        Ok(&self.papers)
    }

    async fn refresh_after(&mut self, action: &str) {
        if let Err(err) = self.refresh().await {
            warn!("Refresh after {} failed: {}", action, err);
        }
    }

    pub async fn show_all_papers(&mut self) -> Result<&[Paper], AppError> {
        self.view.show_all();
        self.refresh().await
    }

    pub async fn open_folder(&mut self, folder_id: &str) -> Result<&[Paper], AppError> {
        self.view.open_folder(folder_id)?;
        self.refresh().await
    }

    pub async fn show_trash(&mut self) -> Result<&[Paper], AppError> {
        self.view.show_trash();
        self.refresh().await
    }

    /// Apply a search box edit, refreshing unless the input is too short.
    pub async fn set_search_query(&mut self, raw: &str) -> Result<SearchInput, AppError> {
        let input = self.view.set_search(raw);
        if input != SearchInput::Ignored {
            self.refresh().await?;
        }
        Ok(input)
    }

    pub async fn filter_by_category(&mut self, category: &str) -> Result<&[Paper], AppError> {
        self.view.set_category(category);
        self.refresh().await
    }

    pub async fn filter_by_tag(&mut self, tag: &str) -> Result<&[Paper], AppError> {
        self.view.set_tag(tag);
        self.refresh().await
    }

    pub async fn load_stats(&self) -> Result<LibraryStats, AppError> {
        self.api.stats().await
    }

    /// Folders a paper may be moved or uploaded into, Default Library first.
    pub fn destination_choices(&self) -> Vec<&Folder> {
        let folders = self.view.folders();
        folders
            .get(DEFAULT_FOLDER_ID)
            .into_iter()
            .chain(folders.assignable())
            .collect()
    }

    /// Folders that may parent `folder_id` (every folder for a new one).
    pub fn parent_choices(&self, folder_id: Option<&str>) -> Result<Vec<&Folder>, AppError> {
        eligible_parents(self.view.folders().as_slice(), folder_id)
    }

    fn require_folder(&self, folder_id: &str) -> Result<(), AppError> {
        if self.view.folders().contains(folder_id) {
            Ok(())
        } else {
            Err(AppError::MissingFolder {
                folder_id: folder_id.to_string(),
            })
        }
    }

    /// Create a folder and reload the cache.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for a blank name and
    /// [`AppError::MissingFolder`] when the parent is not cached.
    pub async fn create_folder(&mut self, payload: FolderPayload) -> Result<Folder, AppError> {
        let payload = payload.normalized()?;
        if let Some(parent_id) = payload.parent_id.as_deref() {
            self.require_folder(parent_id)?;
        }
        let folder = self.api.create_folder(&payload).await?;
        info!("Folder '{}' created as {}", folder.name, folder.id);
        self.load_folders().await?;
        Ok(folder)
    }

    /// Update a folder and reload the cache.
    ///
    /// # Errors
    /// Rejects edits to the Default Library, unknown folders and parents,
    /// and re-parenting under the folder's own subtree.
    pub async fn update_folder(
        &mut self,
        folder_id: &str,
        payload: FolderPayload,
    ) -> Result<Folder, AppError> {
        if folder_id == DEFAULT_FOLDER_ID {
            return Err(AppError::Validation(
                "Cannot modify Default Library".to_string(),
            ));
        }
        self.require_folder(folder_id)?;
        let payload = payload.normalized()?;
        if let Some(parent_id) = payload.parent_id.as_deref() {
            self.require_folder(parent_id)?;
            if introduces_cycle(self.view.folders().as_slice(), folder_id, parent_id) {
                return Err(AppError::Validation(format!(
                    "Folder '{}' cannot be placed inside itself or its subfolders",
                    folder_id
                )));
            }
        }
        let folder = self.api.update_folder(folder_id, &payload).await?;
        self.load_folders().await?;
        Ok(folder)
    }

    /// Trash every paper filed in the folder, then delete the folder.
    ///
    /// Trash moves run one by one; if any fails the folder is kept so no
    /// paper is left referencing a deleted folder outside the trash.
    pub async fn delete_folder(&mut self, folder_id: &str) -> Result<FolderDeletion, AppError> {
        if folder_id == DEFAULT_FOLDER_ID {
            return Err(AppError::Validation(
                "Cannot delete Default Library".to_string(),
            ));
        }
        self.require_folder(folder_id)?;

        let papers = self.api.papers_by_folder(folder_id).await?;
        let mut trashed = BatchOutcome::new();
        for planned in trash::cascade_folder_delete(&papers, folder_id) {
            let result = self.send_to_trash(&planned).await;
            trashed.record(planned.filename, result);
        }
        if !trashed.is_complete() {
            warn!(
                "Keeping folder '{}' after partial trash cascade: {}",
                folder_id,
                trashed.summary()
            );
            self.refresh_after("folder delete").await;
            return Ok(FolderDeletion {
                trashed,
                deleted: false,
            });
        }

        self.api.delete_folder(folder_id).await.map_err(|err| {
            error!("Error deleting folder: {}", err);
            err
        })?;
        info!("Folder '{}' deleted; {}", folder_id, trashed.summary());
        self.load_folders().await?;
        self.view.forget_folder(folder_id);
        self.refresh_after("folder delete").await;
        Ok(FolderDeletion {
            trashed,
            deleted: true,
        })
    }

    async fn send_to_trash(&self, planned: &TrashMove) -> Result<(), AppError> {
        self.api
            .move_paper(
                &planned.filename,
                Some(TRASH_FOLDER_ID),
                Some(&planned.original_folder_id),
            )
            .await
    }

    pub async fn paper_metadata(&self, filename: &str) -> Result<Paper, AppError> {
        self.api.paper_metadata(filename).await
    }

    /// Save edited metadata.
    ///
    /// A trashed paper keeps its trash folder through an edit; choosing the
    /// trash for an active paper is rejected.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for a blank title or a trash folder
    /// choice and [`AppError::MissingFolder`] for an uncached folder.
    pub async fn update_metadata(
        &mut self,
        filename: &str,
        update: MetadataUpdate,
    ) -> Result<(), AppError> {
        let update = update.normalized()?;
        match update.folder_id.as_deref() {
            Some(TRASH_FOLDER_ID) => {
                let current = self.api.paper_metadata(filename).await?;
                if !current.is_trashed() {
                    return Err(AppError::Validation(
                        "Use delete to move a paper to the trash".to_string(),
                    ));
                }
            }
            Some(folder_id) => self.require_folder(folder_id)?,
            None => {}
        }
        self.api.update_metadata(filename, &update).await?;
        self.refresh_after("metadata update").await;
        Ok(())
    }

    /// Move a paper to `destination` (`None` is the Default Library).
    ///
    /// Moving into the trash is a soft delete.
    pub async fn move_paper(
        &mut self,
        filename: &str,
        destination: Option<&str>,
    ) -> Result<(), AppError> {
        let destination = destination.unwrap_or(DEFAULT_FOLDER_ID);
        if destination == TRASH_FOLDER_ID {
            return self.soft_delete_paper(filename).await.map(|_| ());
        }
        self.require_folder(destination)?;
        self.api
            .move_paper(filename, Some(destination), None)
            .await?;
        info!("Paper '{}' moved to '{}'", filename, destination);
        self.refresh_after("move").await;
        Ok(())
    }

    /// Move an active paper to the trash, sending its origin folder along.
    pub async fn soft_delete_paper(&mut self, filename: &str) -> Result<TrashMove, AppError> {
        let paper = self.api.paper_metadata(filename).await?;
        let planned = trash::soft_delete(&paper)?;
        self.send_to_trash(&planned).await?;
        info!(
            "Paper '{}' moved to trash from '{}'",
            filename, planned.original_folder_id
        );
        self.refresh_after("soft delete").await;
        Ok(planned)
    }

    /// Permanently delete a paper, trashed or not.
    pub async fn purge_paper(&mut self, filename: &str) -> Result<(), AppError> {
        self.api.delete_paper(filename, false).await?;
        trash::purge(&mut self.papers, filename);
        info!("Paper '{}' permanently deleted", filename);
        self.refresh_after("permanent delete").await;
        Ok(())
    }

    /// Restore a trashed paper to its original folder.
    ///
    /// The folder cache is reloaded first. When the original folder no longer
    /// exists, `confirm` decides whether the paper falls back to the Default
    /// Library; it is not called otherwise.
    pub async fn restore_paper<F>(
        &mut self,
        filename: &str,
        confirm: F,
    ) -> Result<RestoreOutcome, AppError>
    where
        F: FnOnce(&RestoreTarget) -> bool,
    {
        self.load_folders().await?;
        let paper = self.api.paper_metadata(filename).await?;
        let target = trash::resolve_restore(&paper, self.view.folders())?;
        let confirmed = target.needs_confirmation() && confirm(&target);

        let destination = target.destination(confirmed).map(str::to_string);
        let destination = match destination {
            Some(folder_id) => folder_id,
            None => {
                let original_folder_id = match target {
                    RestoreTarget::MissingOriginal { original_folder_id } => original_folder_id,
                    RestoreTarget::Original(folder_id) => folder_id,
                };
                info!(
                    "Restore of '{}' declined; original folder '{}' is gone",
                    filename, original_folder_id
                );
                return Ok(RestoreOutcome::Declined { original_folder_id });
            }
        };

        self.api
            .move_paper(filename, Some(&destination), None)
            .await?;
        info!("Paper '{}' restored to '{}'", filename, destination);
        self.refresh_after("restore").await;
        Ok(RestoreOutcome::Restored {
            folder_id: destination,
        })
    }

    /// Permanently delete everything in the trash, one paper at a time.
    pub async fn empty_trash(&mut self) -> Result<BatchOutcome<String>, AppError> {
        let trashed = trash::trash_papers(&self.api.papers_by_folder(TRASH_FOLDER_ID).await?);
        let mut outcome = BatchOutcome::new();
        for paper in trashed {
            let result = self.api.delete_paper(&paper.filename, false).await;
            if let Err(err) = &result {
                error!("Error purging '{}': {}", paper.filename, err);
            }
            outcome.record(paper.filename, result);
        }
        info!("Empty trash: {}", outcome.summary());
        self.refresh_after("empty trash").await;
        Ok(outcome)
    }

    /// Upload files into `folder_id`, or the current view's folder.
    ///
    /// Files are sent one at a time. With several files and the PDF-only
    /// policy, non-PDF files are skipped.
    pub async fn upload_papers(
        &mut self,
        files: &[UploadFile],
        metadata: &UploadMetadata,
        folder_id: Option<&str>,
    ) -> Result<BatchOutcome<String>, AppError> {
        if files.is_empty() {
            return Err(AppError::Validation("No files selected".to_string()));
        }
        let folder_id = folder_id
            .unwrap_or_else(|| self.view.upload_folder())
            .to_string();
        if folder_id == TRASH_FOLDER_ID {
            return Err(AppError::Validation(
                "Cannot upload into the trash".to_string(),
            ));
        }
        self.require_folder(&folder_id)?;

        let filter_pdf = files.len() > 1 && !self.allow_non_pdf;
        let mut outcome = BatchOutcome::new();
        for file in files {
            if filter_pdf && !file.is_pdf() {
                debug!("Skipping non-PDF file '{}'", file.file_name);
                outcome.skip(file.file_name.clone());
                continue;
            }
            let upload = PaperUpload {
                file,
                metadata: metadata.for_file(&file.file_name),
                folder_id: Some(folder_id.as_str()),
            };
            let result = self.api.upload_paper(upload).await;
            if let Err(err) = &result {
                error!("Failed to upload {}: {}", file.file_name, err);
            }
            outcome.record(file.file_name.clone(), result);
        }
        info!("Upload: {}", outcome.summary());
        self.refresh_after("upload").await;
        Ok(outcome)
    }
}
