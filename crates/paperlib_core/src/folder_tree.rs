//! Folder hierarchy derivation and parent-selection rules.
//!
//! The Default Library is always a root: its own `parent_id` is ignored by
//! every walk in this module. Walks carry a visited set and report
//! [`AppError::CycleDetected`] rather than looping on a cyclic `parent_id`
//! chain.

use crate::{
    constants::DEFAULT_FOLDER_ID,
    models::{Folder, FolderCache, FolderNode},
    AppError,
};
use std::collections::{HashMap, HashSet};

fn effective_parent(folder: &Folder) -> Option<&str> {
    if folder.is_default() {
        None
    } else {
        folder.parent_id.as_deref()
    }
}

fn parent_map(folders: &[Folder]) -> HashMap<&str, Option<&str>> {
    folders
        .iter()
        .map(|f| (f.id.as_str(), effective_parent(f)))
        .collect()
}

/// Returns the id of a folder that sits on a `parent_id` cycle, if any.
pub fn find_cycle(folders: &[Folder]) -> Option<String> {
    let parents = parent_map(folders);
    let mut acyclic: HashSet<&str> = HashSet::new();

    for folder in folders {
        let mut path = HashSet::new();
        let mut current = Some(folder.id.as_str());
        while let Some(curr) = current {
            if acyclic.contains(curr) {
                break;
            }
            if !path.insert(curr) {
                return Some(curr.to_string());
            }
            current = parents.get(curr).copied().flatten();
        }
        acyclic.extend(path);
    }

    None
}

/// Build the sidebar forest from the flat folder cache.
///
/// The Default Library comes first, followed by every other folder without a
/// parent, in cache order. Children keep cache order. Folders whose parent is
/// absent from the cache are unreachable and omitted (see [`orphans`]).
///
/// # Errors
/// Returns [`AppError::CycleDetected`] when any `parent_id` chain loops.
pub fn build_tree(cache: &FolderCache) -> Result<Vec<FolderNode>, AppError> {
    let folders = cache.as_slice();
    if let Some(folder_id) = find_cycle(folders) {
        tracing::error!("Folder hierarchy contains a cycle at '{}'", folder_id);
        return Err(AppError::CycleDetected { folder_id });
    }

    let mut children: HashMap<&str, Vec<&Folder>> = HashMap::new();
    for folder in folders {
        if let Some(parent_id) = effective_parent(folder) {
            children.entry(parent_id).or_default().push(folder);
        }
    }

    let roots = cache
        .get(DEFAULT_FOLDER_ID)
        .into_iter()
        .chain(
            folders
                .iter()
                .filter(|f| !f.is_default() && f.parent_id.is_none()),
        );

    let mut visited = HashSet::new();
    roots
        .map(|root| build_node(root, &children, &mut visited))
        .collect()
}

fn build_node<'a>(
    folder: &'a Folder,
    children: &HashMap<&str, Vec<&'a Folder>>,
    visited: &mut HashSet<&'a str>,
) -> Result<FolderNode, AppError> {
    if !visited.insert(folder.id.as_str()) {
        return Err(AppError::CycleDetected {
            folder_id: folder.id.clone(),
        });
    }
    let nested = children
        .get(folder.id.as_str())
        .map(|kids| {
            kids.iter()
                .map(|child| build_node(*child, children, visited))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();
    Ok(FolderNode {
        folder: folder.clone(),
        children: nested,
    })
}

/// Folders whose `parent_id` names a folder missing from the cache.
pub fn orphans(cache: &FolderCache) -> Vec<&Folder> {
    cache
        .iter()
        .filter(|folder| {
            effective_parent(folder)
                .map(|parent_id| !cache.contains(parent_id))
                .unwrap_or(false)
        })
        .collect()
}

/// Returns `true` when `candidate_id` is `ancestor_id` or lies beneath it.
///
/// Walks the candidate's parent chain upward; a missing folder or a root
/// ends the walk.
///
/// # Errors
/// Returns [`AppError::CycleDetected`] when the chain revisits a folder.
pub fn is_descendant_or_self(
    folders: &[Folder],
    candidate_id: &str,
    ancestor_id: &str,
) -> Result<bool, AppError> {
    let parents = parent_map(folders);
    let mut visited = HashSet::new();
    let mut current = Some(candidate_id);

    while let Some(curr) = current {
        if curr == ancestor_id {
            return Ok(true);
        }
        if !visited.insert(curr) {
            return Err(AppError::CycleDetected {
                folder_id: curr.to_string(),
            });
        }
        current = parents.get(curr).copied().flatten();
    }

    Ok(false)
}

/// Folders that may become the parent of `exclude_id`.
///
/// Excludes the folder itself and all of its transitive descendants. With
/// `None` (creating a new folder) every folder is eligible.
///
/// # Errors
/// Returns [`AppError::CycleDetected`] when a parent chain loops.
pub fn eligible_parents<'a>(
    folders: &'a [Folder],
    exclude_id: Option<&str>,
) -> Result<Vec<&'a Folder>, AppError> {
    let Some(exclude_id) = exclude_id else {
        return Ok(folders.iter().collect());
    };
    let mut eligible = Vec::with_capacity(folders.len());
    for folder in folders {
        if !is_descendant_or_self(folders, &folder.id, exclude_id)? {
            eligible.push(folder);
        }
    }
    Ok(eligible)
}

/// Returns `true` if assigning `folder_id` under `new_parent_id` introduces a cycle.
///
/// # Arguments
/// - `folders`: Full folder list.
/// - `folder_id`: Folder being re-parented.
/// - `new_parent_id`: Proposed parent id.
///
/// # Returns
/// `true` when the proposed parent is the folder itself, one of its
/// descendants, or sits on an existing loop.
pub fn introduces_cycle(folders: &[Folder], folder_id: &str, new_parent_id: &str) -> bool {
    let parents = parent_map(folders);
    let mut current = Some(new_parent_id);
    let mut visited = HashSet::new();

    while let Some(curr) = current {
        if !visited.insert(curr) || curr == folder_id {
            return true;
        }
        current = parents.get(curr).copied().flatten();
    }

    false
}

/// Depth-first listing of the forest as `(depth, folder)` pairs.
pub fn flatten(nodes: &[FolderNode]) -> Vec<(usize, &Folder)> {
    fn walk<'a>(nodes: &'a [FolderNode], depth: usize, out: &mut Vec<(usize, &'a Folder)>) {
        for node in nodes {
            out.push((depth, &node.folder));
            walk(&node.children, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    walk(nodes, 0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(folders: &[&Folder]) -> Vec<String> {
        folders.iter().map(|f| f.id.clone()).collect()
    }

    fn sample() -> FolderCache {
        FolderCache::from_api(vec![
            Folder::with_parent("root", "root", None),
            Folder::with_parent("child", "child", Some("root")),
            Folder::with_parent("leaf", "leaf", Some("child")),
            Folder::with_parent("sibling", "sibling", None),
            Folder::with_parent("filed", "filed", Some(DEFAULT_FOLDER_ID)),
        ])
    }

    #[test]
    fn tree_puts_default_first_and_nests_children() {
        let cache = sample();
        let tree = build_tree(&cache).expect("acyclic tree");

        let root_ids: Vec<&str> = tree.iter().map(|n| n.folder.id.as_str()).collect();
        assert_eq!(root_ids, vec![DEFAULT_FOLDER_ID, "root", "sibling"]);
        assert_eq!(tree[0].children[0].folder.id, "filed");
        assert_eq!(tree[1].children[0].folder.id, "child");
        assert_eq!(tree[1].children[0].children[0].folder.id, "leaf");
        assert!(!tree[2].has_children());

        let total: usize = tree.iter().map(FolderNode::subtree_len).sum();
        assert_eq!(total, cache.len(), "every folder appears exactly once");
    }

    #[test]
    fn default_stays_first_root_even_with_a_parent() {
        let mut default = Folder::default_library();
        default.parent_id = Some("a".to_string());
        let cache = FolderCache::from_api(vec![
            Folder::new("a", "A"),
            default,
            Folder::new("b", "B"),
        ]);
        let tree = build_tree(&cache).expect("default parent is ignored");
        let flat: Vec<(usize, &str)> = flatten(&tree)
            .into_iter()
            .map(|(depth, f)| (depth, f.id.as_str()))
            .collect();
        assert_eq!(flat, vec![(0, DEFAULT_FOLDER_ID), (0, "a"), (0, "b")]);
    }

    #[test]
    fn create_scenario_yields_two_roots() {
        let cache = FolderCache::from_api(vec![
            Folder::default_library(),
            Folder::with_parent("a", "A", None),
        ]);
        let tree = build_tree(&cache).expect("tree");
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].folder.id, DEFAULT_FOLDER_ID);
        assert_eq!(tree[1].folder.name, "A");
    }

    #[test]
    fn cyclic_hierarchy_is_reported_not_walked() {
        let cache = FolderCache::from_api(vec![
            Folder::with_parent("x", "x", Some("y")),
            Folder::with_parent("y", "y", Some("x")),
        ]);
        let err = build_tree(&cache).expect_err("cycle must be detected");
        assert!(matches!(err, AppError::CycleDetected { .. }));

        let self_parent = FolderCache::from_api(vec![Folder::with_parent("s", "s", Some("s"))]);
        assert!(matches!(
            build_tree(&self_parent),
            Err(AppError::CycleDetected { folder_id }) if folder_id == "s"
        ));
    }

    #[test]
    fn orphaned_folders_are_listed_separately() {
        let cache = FolderCache::from_api(vec![
            Folder::with_parent("lost", "lost", Some("gone")),
            Folder::new("kept", "kept"),
        ]);
        let tree = build_tree(&cache).expect("tree");
        assert!(flatten(&tree).iter().all(|(_, f)| f.id != "lost"));
        assert_eq!(ids(&orphans(&cache)), vec!["lost"]);
    }

    #[test]
    fn descendant_check_walks_parent_chain() {
        let cache = sample();
        let folders = cache.as_slice();
        assert!(is_descendant_or_self(folders, "leaf", "root").expect("walk"));
        assert!(is_descendant_or_self(folders, "root", "root").expect("walk"));
        assert!(!is_descendant_or_self(folders, "root", "leaf").expect("walk"));
        assert!(!is_descendant_or_self(folders, "missing", "root").expect("walk"));
    }

    #[test]
    fn eligible_parents_exclude_self_and_descendants() {
        let cache = sample();
        let eligible = eligible_parents(cache.as_slice(), Some("root")).expect("eligible");
        assert_eq!(ids(&eligible), vec![DEFAULT_FOLDER_ID, "sibling", "filed"]);

        let eligible = eligible_parents(cache.as_slice(), Some("leaf")).expect("eligible");
        assert!(!ids(&eligible).contains(&"leaf".to_string()));
        assert_eq!(eligible.len(), cache.len() - 1);

        let all = eligible_parents(cache.as_slice(), None).expect("eligible");
        assert_eq!(all.len(), cache.len());
    }

    #[test]
    fn eligible_parents_fail_on_cycle() {
        let folders = vec![
            Folder::with_parent("x", "x", Some("y")),
            Folder::with_parent("y", "y", Some("x")),
        ];
        assert!(matches!(
            eligible_parents(&folders, Some("z")),
            Err(AppError::CycleDetected { .. })
        ));
    }

    #[test]
    fn detects_folder_cycle() {
        let cache = sample();
        let folders = cache.as_slice();
        assert!(introduces_cycle(folders, "root", "leaf"));
        assert!(introduces_cycle(folders, "root", "root"));
        assert!(!introduces_cycle(folders, "child", "sibling"));
        assert!(!introduces_cycle(folders, "leaf", DEFAULT_FOLDER_ID));
    }
}
