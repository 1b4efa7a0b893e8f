//! Paper metadata models as consumed from and sent to the library API.

use super::{empty_as_none, null_as_default};
use crate::constants::{DEFAULT_FOLDER_ID, TRASH_FOLDER_ID};
use crate::AppError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Paper metadata. `filename` is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    pub filename: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: String,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(rename = "abstract", default, deserialize_with = "null_as_default")]
    pub abstract_text: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub folder_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub original_folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
}

impl Paper {
    /// Create an unfiled paper with empty metadata.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            title: String::new(),
            authors: String::new(),
            year: None,
            category: None,
            tags: Vec::new(),
            abstract_text: String::new(),
            folder_id: None,
            original_folder_id: None,
            upload_date: None,
        }
    }

    /// Builder-style helper placing the paper in `folder_id`.
    pub fn in_folder(mut self, folder_id: &str) -> Self {
        self.folder_id = Some(folder_id.to_string());
        self
    }

    /// Title, or the filename when the title is blank.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.filename
        } else {
            &self.title
        }
    }

    pub fn is_trashed(&self) -> bool {
        self.folder_id.as_deref() == Some(TRASH_FOLDER_ID)
    }

    /// Effective folder id; unfiled papers live in the Default Library.
    pub fn folder_or_default(&self) -> &str {
        self.folder_id.as_deref().unwrap_or(DEFAULT_FOLDER_ID)
    }
}

/// Envelope of the paper listing endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PapersResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub papers: Vec<Paper>,
}

/// One result of `GET /search/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub metadata: Paper,
    #[serde(default)]
    pub content: Option<String>,
}

/// Envelope of `GET /search/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<SearchHit>,
}

/// Request body for `PUT /papers/{filename}/metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataUpdate {
    pub title: String,
    pub authors: String,
    pub year: Option<i32>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub folder_id: Option<String>,
}

impl MetadataUpdate {
    /// Seed an edit form from the paper's current metadata.
    pub fn from_paper(paper: &Paper) -> Self {
        Self {
            title: paper.title.clone(),
            authors: paper.authors.clone(),
            year: paper.year,
            category: paper.category.clone(),
            tags: paper.tags.clone(),
            abstract_text: paper.abstract_text.clone(),
            folder_id: paper.folder_id.clone(),
        }
    }

    /// Trim text fields, drop blank tags and categories.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when the title is blank.
    pub fn normalized(self) -> Result<Self, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Paper title is required".to_string()));
        }
        Ok(Self {
            title,
            authors: self.authors.trim().to_string(),
            year: self.year,
            category: self
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            tags: normalize_tags(self.tags),
            abstract_text: self.abstract_text.trim().to_string(),
            folder_id: self.folder_id.filter(|id| !id.is_empty()),
        })
    }
}

/// Metadata part of the multipart upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub title: String,
    pub authors: String,
    pub year: Option<i32>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

impl UploadMetadata {
    /// Metadata for one file, titled after the file when no title is set.
    pub fn for_file(&self, file_name: &str) -> Self {
        let mut metadata = self.clone();
        if metadata.title.trim().is_empty() {
            metadata.title = file_name.to_string();
        }
        metadata.category = metadata.category.filter(|c| !c.trim().is_empty());
        metadata.tags = normalize_tags(metadata.tags);
        metadata
    }
}

/// Trim tags, drop blanks and repeats while keeping first-seen order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || out.iter().any(|existing| existing == tag) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}

/// Split a comma or whitespace separated tag string.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    normalize_tags(
        raw.split(|c: char| c == ',' || c.is_whitespace())
            .map(str::to_string)
            .collect(),
    )
}

/// Tags arrive either as a JSON array or as a string holding a JSON array.
fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(tags_from_value(raw))
}

fn tags_from_value(raw: Value) -> Vec<String> {
    match raw {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(encoded) if encoded.trim().is_empty() => Vec::new(),
        Value::String(encoded) => match serde_json::from_str::<Value>(&encoded) {
            Ok(decoded @ Value::Array(_)) => tags_from_value(decoded),
            _ => {
                tracing::warn!("Error parsing tags: {}", encoded);
                Vec::new()
            }
        },
        other => {
            tracing::warn!("Unexpected tags value: {}", other);
            Vec::new()
        }
    }
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
