//! Collection statistics from `GET /stats`.

use super::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    #[serde(default)]
    pub total_papers: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: BTreeMap<String, usize>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Paper count per year. JSON object keys are strings.
    #[serde(default, deserialize_with = "null_as_default")]
    pub years: BTreeMap<String, usize>,
}

impl LibraryStats {
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Earliest and latest year among parsable year keys.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let years = self
            .years
            .keys()
            .filter_map(|year| year.trim().parse::<i32>().ok());
        years.fold(None, |span, year| match span {
            None => Some((year, year)),
            Some((lo, hi)) => Some((lo.min(year), hi.max(year))),
        })
    }

    /// Tags sorted for stable display.
    pub fn sorted_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }
}
