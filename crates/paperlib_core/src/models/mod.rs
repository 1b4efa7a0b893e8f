//! Data models exchanged with the library API.

pub mod folder;
pub mod paper;
pub mod stats;

pub use folder::{Folder, FolderCache, FolderNode, FolderPayload, FoldersResponse};
pub use paper::{
    normalize_tags, parse_tag_list, MetadataUpdate, Paper, PapersResponse, SearchHit,
    SearchResponse, UploadMetadata,
};
pub use stats::LibraryStats;

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize an optional id, mapping empty strings to `None`.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|value| !value.is_empty()))
}

#[cfg(test)]
mod tests;
