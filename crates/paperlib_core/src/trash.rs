//! Soft-delete, restore, and purge reconciliation against the folder cache.
//!
//! Everything here is pure: functions compute the folder changes a command
//! must send to the API and can apply them to a local paper list. A paper is
//! Active while its `folder_id` names a real folder (or is unset) and
//! Trashed while `folder_id == "trash"`. Purged papers no longer exist.

use crate::{
    constants::{DEFAULT_FOLDER_ID, TRASH_FOLDER_ID},
    models::{FolderCache, Paper},
    AppError,
};

/// Move of one paper into the trash, remembering where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashMove {
    pub filename: String,
    pub original_folder_id: String,
}

/// Plan a soft delete for an active paper.
///
/// Unfiled papers record the Default Library as their origin.
///
/// # Errors
/// Returns [`AppError::Validation`] when the paper is already trashed.
pub fn soft_delete(paper: &Paper) -> Result<TrashMove, AppError> {
    if paper.is_trashed() {
        return Err(AppError::Validation(format!(
            "Paper '{}' is already in the trash",
            paper.filename
        )));
    }
    Ok(TrashMove {
        filename: paper.filename.clone(),
        original_folder_id: paper.folder_or_default().to_string(),
    })
}

/// Trash moves required before deleting `folder_id`.
///
/// Only papers filed directly in the folder move; each records the folder
/// as its origin even though that folder is about to disappear.
pub fn cascade_folder_delete(papers: &[Paper], folder_id: &str) -> Vec<TrashMove> {
    papers
        .iter()
        .filter(|paper| paper.folder_id.as_deref() == Some(folder_id))
        .map(|paper| TrashMove {
            filename: paper.filename.clone(),
            original_folder_id: folder_id.to_string(),
        })
        .collect()
}

/// Where a trashed paper goes back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreTarget {
    /// The destination exists in the folder cache.
    Original(String),
    /// The original folder was deleted; restoring falls back to the Default
    /// Library, but only after the user confirms.
    MissingOriginal { original_folder_id: String },
}

impl RestoreTarget {
    /// Final destination given the user's answer to the fallback prompt.
    ///
    /// # Returns
    /// `None` when a fallback was declined and the paper stays trashed.
    pub fn destination(&self, fallback_confirmed: bool) -> Option<&str> {
        match self {
            Self::Original(folder_id) => Some(folder_id.as_str()),
            Self::MissingOriginal { .. } if fallback_confirmed => Some(DEFAULT_FOLDER_ID),
            Self::MissingOriginal { .. } => None,
        }
    }

    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Self::MissingOriginal { .. })
    }
}

/// Resolve the restore destination of a trashed paper.
///
/// A missing or `default` origin restores to the Default Library directly.
///
/// # Errors
/// Returns [`AppError::Validation`] when the paper is not in the trash.
pub fn resolve_restore(paper: &Paper, cache: &FolderCache) -> Result<RestoreTarget, AppError> {
    if !paper.is_trashed() {
        return Err(AppError::Validation(format!(
            "Paper '{}' is not in the trash",
            paper.filename
        )));
    }
    let original = paper
        .original_folder_id
        .as_deref()
        .filter(|id| *id != TRASH_FOLDER_ID)
        .unwrap_or(DEFAULT_FOLDER_ID);
    if original == DEFAULT_FOLDER_ID || cache.contains(original) {
        Ok(RestoreTarget::Original(original.to_string()))
    } else {
        Ok(RestoreTarget::MissingOriginal {
            original_folder_id: original.to_string(),
        })
    }
}

/// Remove a paper permanently from a local list.
pub fn purge(papers: &mut Vec<Paper>, filename: &str) -> Option<Paper> {
    let index = papers.iter().position(|paper| paper.filename == filename)?;
    Some(papers.remove(index))
}

/// Papers visible on the dashboard (everything outside the trash).
pub fn dashboard_papers(papers: &[Paper]) -> Vec<Paper> {
    papers.iter().filter(|p| !p.is_trashed()).cloned().collect()
}

/// Papers visible in the trash view.
pub fn trash_papers(papers: &[Paper]) -> Vec<Paper> {
    papers.iter().filter(|p| p.is_trashed()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Folder;

    fn filenames(papers: &[Paper]) -> Vec<&str> {
        papers.iter().map(|p| p.filename.as_str()).collect()
    }

    fn cache_with(ids: &[&str]) -> FolderCache {
        FolderCache::from_api(ids.iter().map(|id| Folder::new(*id, *id)).collect())
    }

    #[test]
    fn soft_delete_moves_paper_out_of_dashboard_into_trash() {
        let active = vec![Paper::new("p.pdf").in_folder("f"), Paper::new("q.pdf")];
        let planned = soft_delete(&active[0]).expect("active paper");
        assert_eq!(planned.original_folder_id, "f");

        let mut trashed = Paper::new("p.pdf").in_folder(TRASH_FOLDER_ID);
        trashed.original_folder_id = Some(planned.original_folder_id);
        let papers = vec![trashed, active[1].clone()];
        assert_eq!(filenames(&dashboard_papers(&papers)), vec!["q.pdf"]);
        assert_eq!(filenames(&trash_papers(&papers)), vec!["p.pdf"]);
    }

    #[test]
    fn soft_delete_of_unfiled_paper_records_default_origin() {
        let planned = soft_delete(&Paper::new("u.pdf")).expect("active paper");
        assert_eq!(planned.original_folder_id, DEFAULT_FOLDER_ID);
    }

    #[test]
    fn soft_delete_rejects_trashed_paper() {
        let paper = Paper::new("t.pdf").in_folder(TRASH_FOLDER_ID);
        assert!(matches!(soft_delete(&paper), Err(AppError::Validation(_))));
    }

    #[test]
    fn restore_to_existing_original_folder() {
        let mut paper = Paper::new("p.pdf").in_folder(TRASH_FOLDER_ID);
        paper.original_folder_id = Some("f".to_string());
        let target = resolve_restore(&paper, &cache_with(&["f"])).expect("trashed");
        assert_eq!(target, RestoreTarget::Original("f".to_string()));
        assert!(!target.needs_confirmation());
        assert_eq!(target.destination(false), Some("f"));
    }

    #[test]
    fn restore_with_deleted_original_requires_confirmation() {
        let mut paper = Paper::new("x.pdf").in_folder(TRASH_FOLDER_ID);
        paper.original_folder_id = Some("deleted-folder".to_string());
        let target = resolve_restore(&paper, &FolderCache::default()).expect("trashed");

        assert!(target.needs_confirmation());
        assert_eq!(target.destination(false), None, "declining keeps it trashed");
        assert_eq!(target.destination(true), Some(DEFAULT_FOLDER_ID));
    }

    #[test]
    fn restore_without_origin_goes_to_default_silently() {
        let paper = Paper::new("x.pdf").in_folder(TRASH_FOLDER_ID);
        let target = resolve_restore(&paper, &FolderCache::default()).expect("trashed");
        assert_eq!(target, RestoreTarget::Original(DEFAULT_FOLDER_ID.to_string()));
    }

    #[test]
    fn restore_rejects_active_paper() {
        let paper = Paper::new("p.pdf").in_folder("f");
        assert!(matches!(
            resolve_restore(&paper, &cache_with(&["f"])),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn folder_delete_cascade_only_touches_papers_in_folder() {
        let papers = vec![
            Paper::new("p1.pdf").in_folder("F"),
            Paper::new("p2.pdf").in_folder("other"),
            Paper::new("p3.pdf"),
        ];
        let moves = cascade_folder_delete(&papers, "F");
        assert_eq!(
            moves,
            vec![TrashMove {
                filename: "p1.pdf".to_string(),
                original_folder_id: "F".to_string(),
            }]
        );
    }

    #[test]
    fn purge_removes_record() {
        let mut papers = vec![Paper::new("a.pdf"), Paper::new("b.pdf")];
        let removed = purge(&mut papers, "a.pdf").expect("present");
        assert_eq!(removed.filename, "a.pdf");
        assert_eq!(filenames(&papers), vec!["b.pdf"]);
        assert!(purge(&mut papers, "a.pdf").is_none());
    }
}
