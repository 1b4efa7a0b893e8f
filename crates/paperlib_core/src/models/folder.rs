//! Folder models and the client-side folder cache.

use super::{empty_as_none, null_as_default};
use crate::constants::{
    DEFAULT_FOLDER_DESCRIPTION, DEFAULT_FOLDER_ID, DEFAULT_FOLDER_NAME, TRASH_FOLDER_ID,
    TRASH_FOLDER_NAME, UNKNOWN_FOLDER_NAME,
};
use crate::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Folder as returned by `GET /folders/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

impl Folder {
    /// Create a root folder with an empty description.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            description: String::new(),
        }
    }

    /// Create a folder nested under `parent_id`.
    pub fn with_parent(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<&str>,
    ) -> Self {
        Self {
            parent_id: parent_id.map(str::to_string),
            ..Self::new(id, name)
        }
    }

    /// The synthetic Default Library entry.
    pub fn default_library() -> Self {
        Self {
            id: DEFAULT_FOLDER_ID.to_string(),
            name: DEFAULT_FOLDER_NAME.to_string(),
            parent_id: None,
            description: DEFAULT_FOLDER_DESCRIPTION.to_string(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_FOLDER_ID
    }
}

/// Envelope of `GET /folders/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoldersResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub folders: Vec<Folder>,
}

/// Request body for `POST /folders/` and `PUT /folders/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderPayload {
    pub name: String,
    pub parent_id: Option<String>,
    pub description: String,
}

impl FolderPayload {
    pub fn new(name: impl Into<String>, parent_id: Option<String>, description: String) -> Self {
        Self {
            name: name.into(),
            parent_id,
            description,
        }
    }

    /// Trim the payload and reject a blank name.
    ///
    /// An empty parent id normalizes to `None` (root).
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when the name is blank.
    pub fn normalized(self) -> Result<Self, AppError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Folder name is required".to_string()));
        }
        let parent_id = self
            .parent_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Ok(Self {
            name,
            parent_id,
            description: self.description.trim().to_string(),
        })
    }
}

/// One folder with its nested children, as rendered in the sidebar tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub folder: Folder,
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Number of folders in this subtree, including the node itself.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(FolderNode::subtree_len)
            .sum::<usize>()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Ordered folder list fetched from the API.
///
/// The Default Library is always present. Rebuilt wholesale after every
/// folder mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderCache {
    folders: Vec<Folder>,
}

impl Default for FolderCache {
    fn default() -> Self {
        Self {
            folders: vec![Folder::default_library()],
        }
    }
}

impl FolderCache {
    /// Build a cache from an API folder list.
    ///
    /// Prepends the Default Library when the API omitted it. Later entries
    /// repeating an earlier id are dropped.
    pub fn from_api(folders: Vec<Folder>) -> Self {
        let mut seen = HashSet::new();
        let mut deduped = Vec::with_capacity(folders.len() + 1);
        for folder in folders {
            if !seen.insert(folder.id.clone()) {
                tracing::warn!("Dropping duplicate folder id '{}' from API listing", folder.id);
                continue;
            }
            deduped.push(folder);
        }
        if !seen.contains(DEFAULT_FOLDER_ID) {
            deduped.insert(0, Folder::default_library());
        }
        Self { folders: deduped }
    }

    pub fn as_slice(&self) -> &[Folder] {
        &self.folders
    }

    pub fn iter(&self) -> impl Iterator<Item = &Folder> {
        self.folders.iter()
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|folder| folder.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Display name for a folder reference.
    ///
    /// # Returns
    /// The cached name, `Trash` for the trash sentinel, or `Unknown folder`.
    pub fn folder_name(&self, id: &str) -> &str {
        if id == TRASH_FOLDER_ID {
            return TRASH_FOLDER_NAME;
        }
        self.get(id)
            .map(|folder| folder.name.as_str())
            .unwrap_or(UNKNOWN_FOLDER_NAME)
    }

    /// Folders offered as move or upload destinations besides the
    /// Default Library, which callers always list first.
    pub fn assignable(&self) -> impl Iterator<Item = &Folder> {
        self.folders.iter().filter(|folder| !folder.is_default())
    }
}
