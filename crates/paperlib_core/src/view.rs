//! Session view state and the folder cache owner.
//!
//! [`ViewModel`] is the single owner of the folder cache and the current
//! navigation state. Command handlers receive it by reference; nothing here
//! is global and nothing persists across sessions.

use crate::{
    constants::{
        ALL_PAPERS_TITLE, DEFAULT_FOLDER_ID, MIN_SEARCH_QUERY_LEN, TRASH_FOLDER_ID,
        TRASH_FOLDER_NAME,
    },
    folder_tree,
    models::{Folder, FolderCache, FolderNode},
    AppError,
};

/// Secondary filter layered over the current view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListFilter {
    #[default]
    Unfiltered,
    Category(String),
    Tag(String),
    Search(String),
}

/// Navigation state read by every list refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// `None` is the "all papers" view.
    pub current_folder_id: Option<String>,
    pub filter: ListFilter,
}

/// The fetch a refresh must issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRequest {
    /// `GET /papers/`, trashed papers filtered out locally.
    Dashboard,
    ByFolder(String),
    /// `GET /papers/by-folder/trash`.
    Trash,
    ByCategory(String),
    ByTag(String),
    Search(String),
}

/// How a search box edit affects the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchInput {
    /// Query long enough to search.
    Search(String),
    /// Empty query: the search filter is dropped and the view refreshed.
    Cleared,
    /// Too short to search; nothing changes.
    Ignored,
}

/// Classify raw search box input.
pub fn classify_search_input(raw: &str) -> SearchInput {
    let query = raw.trim();
    if query.is_empty() {
        SearchInput::Cleared
    } else if query.chars().count() < MIN_SEARCH_QUERY_LEN {
        SearchInput::Ignored
    } else {
        SearchInput::Search(query.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    folders: FolderCache,
    state: ViewState,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folders(&self) -> &FolderCache {
        &self.folders
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn current_folder_id(&self) -> Option<&str> {
        self.state.current_folder_id.as_deref()
    }

    pub fn is_trash_view(&self) -> bool {
        self.current_folder_id() == Some(TRASH_FOLDER_ID)
    }

    /// Replace the folder cache wholesale with a fresh API listing.
    ///
    /// Concurrent reloads are not ordered; whichever response is applied
    /// last wins.
    pub fn replace_folders(&mut self, folders: Vec<Folder>) {
        self.folders = FolderCache::from_api(folders);
        tracing::debug!("Folder cache reloaded with {} folders", self.folders.len());
    }

    pub fn tree(&self) -> Result<Vec<FolderNode>, AppError> {
        folder_tree::build_tree(&self.folders)
    }

    /// Navigate to a folder (or the trash) and clear any filter.
    ///
    /// # Errors
    /// Returns [`AppError::MissingFolder`] when the folder is not cached.
    pub fn open_folder(&mut self, folder_id: &str) -> Result<(), AppError> {
        if folder_id != TRASH_FOLDER_ID && !self.folders.contains(folder_id) {
            return Err(AppError::MissingFolder {
                folder_id: folder_id.to_string(),
            });
        }
        self.state = ViewState {
            current_folder_id: Some(folder_id.to_string()),
            filter: ListFilter::Unfiltered,
        };
        Ok(())
    }

    pub fn show_trash(&mut self) {
        self.state = ViewState {
            current_folder_id: Some(TRASH_FOLDER_ID.to_string()),
            filter: ListFilter::Unfiltered,
        };
    }

    pub fn show_all(&mut self) {
        self.state = ViewState::default();
    }

    /// Reset to all papers if `folder_id` was the current folder.
    ///
    /// # Returns
    /// `true` when the view changed.
    pub fn forget_folder(&mut self, folder_id: &str) -> bool {
        if self.current_folder_id() == Some(folder_id) {
            self.show_all();
            return true;
        }
        false
    }

    /// Apply a search box edit.
    pub fn set_search(&mut self, raw: &str) -> SearchInput {
        let input = classify_search_input(raw);
        match &input {
            SearchInput::Search(query) => self.state.filter = ListFilter::Search(query.clone()),
            SearchInput::Cleared => {
                if matches!(self.state.filter, ListFilter::Search(_)) {
                    self.state.filter = ListFilter::Unfiltered;
                }
            }
            SearchInput::Ignored => {}
        }
        input
    }

    /// Filter by category; an empty choice clears the filter.
    pub fn set_category(&mut self, category: &str) {
        let category = category.trim();
        self.state.filter = if category.is_empty() {
            ListFilter::Unfiltered
        } else {
            ListFilter::Category(category.to_string())
        };
    }

    /// Filter by tag; an empty choice clears the filter.
    pub fn set_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        self.state.filter = if tag.is_empty() {
            ListFilter::Unfiltered
        } else {
            ListFilter::Tag(tag.to_string())
        };
    }

    /// The fetch that refreshes the current listing.
    pub fn list_request(&self) -> ListRequest {
        match &self.state.filter {
            ListFilter::Search(query) => return ListRequest::Search(query.clone()),
            ListFilter::Category(category) => return ListRequest::ByCategory(category.clone()),
            ListFilter::Tag(tag) => return ListRequest::ByTag(tag.clone()),
            ListFilter::Unfiltered => {}
        }
        match self.current_folder_id() {
            Some(TRASH_FOLDER_ID) => ListRequest::Trash,
            Some(folder_id) => ListRequest::ByFolder(folder_id.to_string()),
            None => ListRequest::Dashboard,
        }
    }

    /// Heading for the current listing.
    pub fn title(&self) -> String {
        match self.current_folder_id() {
            None => ALL_PAPERS_TITLE.to_string(),
            Some(TRASH_FOLDER_ID) => TRASH_FOLDER_NAME.to_string(),
            Some(folder_id) => self
                .folders
                .get(folder_id)
                .map(|folder| folder.name.clone())
                .unwrap_or_else(|| ALL_PAPERS_TITLE.to_string()),
        }
    }

    /// Upload destination preselected for the current view.
    pub fn upload_folder(&self) -> &str {
        match self.current_folder_id() {
            Some(TRASH_FOLDER_ID) | None => DEFAULT_FOLDER_ID,
            Some(folder_id) => folder_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with(ids: &[&str]) -> ViewModel {
        let mut model = ViewModel::new();
        model.replace_folders(ids.iter().map(|id| Folder::new(*id, id.to_uppercase())).collect());
        model
    }

    #[test]
    fn new_model_shows_all_papers_with_default_folder() {
        let model = ViewModel::new();
        assert_eq!(model.list_request(), ListRequest::Dashboard);
        assert_eq!(model.title(), "All Papers");
        assert!(model.folders().contains(DEFAULT_FOLDER_ID));
        assert_eq!(model.upload_folder(), DEFAULT_FOLDER_ID);
    }

    #[test]
    fn navigation_selects_fetch() {
        let mut model = model_with(&["a"]);
        model.open_folder("a").expect("cached folder");
        assert_eq!(model.list_request(), ListRequest::ByFolder("a".to_string()));
        assert_eq!(model.title(), "A");
        assert_eq!(model.upload_folder(), "a");

        model.show_trash();
        assert!(model.is_trash_view());
        assert_eq!(model.list_request(), ListRequest::Trash);
        assert_eq!(model.title(), "Trash");
        assert_eq!(model.upload_folder(), DEFAULT_FOLDER_ID);

        model.show_all();
        assert_eq!(model.list_request(), ListRequest::Dashboard);
    }

    #[test]
    fn open_unknown_folder_is_rejected() {
        let mut model = model_with(&[]);
        let err = model.open_folder("nope").expect_err("unknown folder");
        assert!(matches!(err, AppError::MissingFolder { .. }));
        assert_eq!(model.current_folder_id(), None);
    }

    #[test]
    fn search_input_thresholds() {
        assert_eq!(classify_search_input(""), SearchInput::Cleared);
        assert_eq!(classify_search_input("  "), SearchInput::Cleared);
        assert_eq!(classify_search_input("ab"), SearchInput::Ignored);
        assert_eq!(
            classify_search_input(" abc "),
            SearchInput::Search("abc".to_string())
        );
    }

    #[test]
    fn search_filter_overrides_then_clears_back_to_folder() {
        let mut model = model_with(&["a"]);
        model.open_folder("a").expect("cached folder");

        assert_eq!(model.set_search("gr"), SearchInput::Ignored);
        assert_eq!(model.list_request(), ListRequest::ByFolder("a".to_string()));

        model.set_search("graph");
        assert_eq!(model.list_request(), ListRequest::Search("graph".to_string()));

        model.set_search("");
        assert_eq!(model.list_request(), ListRequest::ByFolder("a".to_string()));
    }

    #[test]
    fn category_and_tag_filters_clear_on_empty_choice() {
        let mut model = ViewModel::new();
        model.set_category("ml");
        assert_eq!(model.list_request(), ListRequest::ByCategory("ml".to_string()));
        model.set_tag("graphs");
        assert_eq!(model.list_request(), ListRequest::ByTag("graphs".to_string()));
        model.set_tag(" ");
        assert_eq!(model.list_request(), ListRequest::Dashboard);
    }

    #[test]
    fn navigation_clears_filters() {
        let mut model = model_with(&["a"]);
        model.set_category("ml");
        model.open_folder("a").expect("cached folder");
        assert_eq!(model.state().filter, ListFilter::Unfiltered);
    }

    #[test]
    fn forgetting_current_folder_resets_view() {
        let mut model = model_with(&["a", "b"]);
        model.open_folder("a").expect("cached folder");
        assert!(!model.forget_folder("b"));
        assert!(model.forget_folder("a"));
        assert_eq!(model.current_folder_id(), None);
    }

    #[test]
    fn reload_replaces_cache_wholesale() {
        let mut model = model_with(&["a"]);
        model.replace_folders(vec![Folder::default_library(), Folder::new("b", "B")]);
        assert!(!model.folders().contains("a"));
        assert!(model.folders().contains("b"));
        assert_eq!(model.tree().expect("tree").len(), 2);
    }
}
