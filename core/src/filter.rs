//! Sidebar search.

use crate::tree::{CollectionNode, FileRef};

/// Prunes the forest down to what matches `term` (case-insensitive substring on names).
///
/// A collection survives when its own name matches, when any of its files match, or when any
/// descendant survives. Surviving collections keep only their matching files and surviving
/// sub-collections, and are forced open so every match is visible along with its ancestors.
///
/// An empty term returns the forest as it is, open flags included.
pub fn filter_tree(forest: &[CollectionNode], term: &str) -> Vec<CollectionNode> {
    if term.is_empty() {
        return forest.to_vec();
    }
    filter_level(forest, &term.to_lowercase())
}

fn filter_level(nodes: &[CollectionNode], needle: &str) -> Vec<CollectionNode> {
    nodes
        .iter()
        .filter_map(|node| {
            let files: Vec<FileRef> = node
                .files
                .iter()
                .filter(|file| contains(&file.name, needle))
                .cloned()
                .collect();
            let collections = filter_level(&node.collections, needle);

            let keep = contains(&node.name, needle) || !files.is_empty() || !collections.is_empty();
            keep.then(|| CollectionNode {
                id: node.id.clone(),
                name: node.name.clone(),
                files,
                collections,
                is_open: true,
            })
        })
        .collect()
}

fn contains(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}
