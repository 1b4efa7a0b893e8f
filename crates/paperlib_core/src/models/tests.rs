//! Model-level unit tests.

use super::paper::{normalize_tags, parse_tag_list};
use super::*;
use crate::constants::{DEFAULT_FOLDER_ID, DEFAULT_FOLDER_NAME};
use crate::AppError;
use serde_json::json;

#[test]
fn paper_decodes_tags_from_array_and_encoded_string() {
    let cases = [
        (json!(["ml", "graphs"]), vec!["ml", "graphs"]),
        (json!("[\"ml\", \"graphs\"]"), vec!["ml", "graphs"]),
        (json!(""), vec![]),
        (json!("not json"), vec![]),
        (json!(null), vec![]),
        (json!([1, "x", null]), vec!["1", "x"]),
    ];
    for (tags, expected) in cases {
        let paper: Paper = serde_json::from_value(json!({
            "filename": "a.pdf",
            "tags": tags.clone(),
        }))
        .expect("paper should decode");
        assert_eq!(paper.tags, expected, "tags input: {}", tags);
    }
}

#[test]
fn paper_tolerates_sparse_and_loose_metadata() {
    let paper: Paper = serde_json::from_value(json!({
        "filename": "x.pdf",
        "title": null,
        "year": "2019",
        "category": "",
        "abstract": "About things",
        "folder_id": "",
        "keywords": "[]",
    }))
    .expect("paper should decode");

    assert_eq!(paper.title, "");
    assert_eq!(paper.display_title(), "x.pdf");
    assert_eq!(paper.year, Some(2019));
    assert_eq!(paper.category, None);
    assert_eq!(paper.abstract_text, "About things");
    assert_eq!(paper.folder_id, None);
    assert_eq!(paper.folder_or_default(), DEFAULT_FOLDER_ID);
    assert!(!paper.is_trashed());

    let paper: Paper =
        serde_json::from_value(json!({ "filename": "y.pdf", "year": "" })).expect("decode");
    assert_eq!(paper.year, None);
}

#[test]
fn trashed_paper_keeps_original_folder() {
    let paper: Paper = serde_json::from_value(json!({
        "filename": "x.pdf",
        "folder_id": "trash",
        "original_folder_id": "deleted-folder",
    }))
    .expect("paper should decode");
    assert!(paper.is_trashed());
    assert_eq!(paper.original_folder_id.as_deref(), Some("deleted-folder"));
}

#[test]
fn metadata_update_serializes_abstract_field_name() {
    let mut paper = Paper::new("x.pdf").in_folder("f1");
    paper.title = "Title".to_string();
    paper.abstract_text = "Summary".to_string();
    let body = serde_json::to_value(MetadataUpdate::from_paper(&paper)).expect("encode");
    assert_eq!(body["abstract"], "Summary");
    assert_eq!(body["folder_id"], "f1");
    assert!(body.get("abstract_text").is_none());
}

#[test]
fn metadata_update_normalization_rejects_blank_title() {
    let update = MetadataUpdate::from_paper(&Paper::new("x.pdf"));
    assert!(matches!(update.normalized(), Err(AppError::Validation(_))));

    let mut paper = Paper::new("x.pdf");
    paper.title = "  Spaced  ".to_string();
    paper.category = Some("  ".to_string());
    paper.tags = vec![" a ".to_string(), "a".to_string(), "".to_string(), "b".to_string()];
    let update = MetadataUpdate::from_paper(&paper)
        .normalized()
        .expect("valid update");
    assert_eq!(update.title, "Spaced");
    assert_eq!(update.category, None);
    assert_eq!(update.tags, vec!["a", "b"]);
}

#[test]
fn upload_metadata_defaults_title_to_file_name() {
    let base = UploadMetadata {
        authors: "Ada".to_string(),
        ..UploadMetadata::default()
    };
    let per_file = base.for_file("paper.pdf");
    assert_eq!(per_file.title, "paper.pdf");
    assert_eq!(per_file.authors, "Ada");

    let titled = UploadMetadata {
        title: "Given".to_string(),
        ..UploadMetadata::default()
    };
    assert_eq!(titled.for_file("paper.pdf").title, "Given");
}

#[test]
fn tag_helpers_split_and_dedupe() {
    assert_eq!(parse_tag_list("ml, graphs  ml,,nlp"), vec!["ml", "graphs", "nlp"]);
    assert!(normalize_tags(vec!["  ".to_string()]).is_empty());
}

#[test]
fn folder_cache_prepends_default_library_when_missing() {
    let cache = FolderCache::from_api(vec![Folder::new("a", "A")]);
    let ids: Vec<&str> = cache.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec![DEFAULT_FOLDER_ID, "a"]);
    assert_eq!(cache.folder_name(DEFAULT_FOLDER_ID), DEFAULT_FOLDER_NAME);
}

#[test]
fn folder_cache_keeps_api_default_and_drops_duplicates() {
    let mut api_default = Folder::new(DEFAULT_FOLDER_ID, "Default");
    api_default.description = "from api".to_string();
    let cache = FolderCache::from_api(vec![
        Folder::new("a", "A"),
        api_default.clone(),
        Folder::new("a", "A again"),
    ]);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(DEFAULT_FOLDER_ID), Some(&api_default));
    assert_eq!(cache.folder_name("a"), "A");
}

#[test]
fn folder_cache_names_unknown_and_trash_references() {
    let cache = FolderCache::default();
    assert_eq!(cache.folder_name("missing"), "Unknown folder");
    assert_eq!(cache.folder_name("trash"), "Trash");
    assert_eq!(cache.assignable().count(), 0);
}

#[test]
fn folder_decodes_null_description_and_empty_parent() {
    let folder: Folder = serde_json::from_value(json!({
        "id": "a",
        "name": "A",
        "parent_id": "",
        "description": null,
    }))
    .expect("folder should decode");
    assert_eq!(folder.parent_id, None);
    assert_eq!(folder.description, "");

    let response: FoldersResponse = serde_json::from_value(json!({})).expect("decode");
    assert!(response.folders.is_empty());
}

#[test]
fn folder_payload_normalization() {
    let payload = FolderPayload::new("  Reading ", Some(" ".to_string()), " notes ".to_string())
        .normalized()
        .expect("valid payload");
    assert_eq!(payload.name, "Reading");
    assert_eq!(payload.parent_id, None);
    assert_eq!(payload.description, "notes");

    let err = FolderPayload::new("   ", None, String::new())
        .normalized()
        .expect_err("blank name must be rejected");
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn stats_year_span_and_counts() {
    let stats: LibraryStats = serde_json::from_value(json!({
        "total_papers": 4,
        "categories": { "ml": 3, "db": 1 },
        "tags": ["b", "a", "b"],
        "years": { "2021": 2, "2018": 1, "n/a": 1 },
    }))
    .expect("stats should decode");
    assert_eq!(stats.category_count(), 2);
    assert_eq!(stats.tag_count(), 3);
    assert_eq!(stats.sorted_tags(), vec!["a", "b"]);
    assert_eq!(stats.year_span(), Some((2018, 2021)));

    assert_eq!(LibraryStats::default().year_span(), None);
}

#[test]
fn search_response_decodes_hits() {
    let response: SearchResponse = serde_json::from_value(json!({
        "results": [{ "metadata": { "filename": "a.pdf", "title": "A" }, "content": "text" }]
    }))
    .expect("search should decode");
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].metadata.display_title(), "A");
}
