//! Conversion between the nested forest and the flat, parent-pointer records used on the wire.
//!
//! The collection skeleton is persisted as one [`FlatRecord`] per collection. Files are *not*
//! emitted when flattening (they are persisted through per-file calls), but the records returned by
//! the store embed each collection's file list, which [`unflatten`] turns back into [`FileRef`]s.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::tree::{normalize, CollectionNode, FileRef};

/// One collection in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub collection_id: String,
    pub collection_name: String,
    /// `None` marks a root collection.
    pub parent_id: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    /// Only present on records coming back from the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_files: Option<Vec<FlatFile>>,
}

impl FlatRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self {
            collection_id: id.into(),
            collection_name: name.into(),
            parent_id: parent_id.map(str::to_string),
            deleted: false,
            editor_files: None,
        }
    }

    pub fn with_files(mut self, files: impl IntoIterator<Item = FlatFile>) -> Self {
        self.editor_files = Some(files.into_iter().collect());
        self
    }
}

/// A file entry embedded in a [`FlatRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatFile {
    pub file_id: String,
    pub file_name: String,
}

impl FlatFile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { file_id: id.into(), file_name: name.into() }
    }
}

/// Flattens the collection skeleton in depth-first pre-order.
pub fn flatten(forest: &[CollectionNode]) -> Vec<FlatRecord> {
    let mut records = Vec::new();
    for root in forest {
        flatten_into(root, None, &mut records);
    }
    records
}

fn flatten_into(node: &CollectionNode, parent_id: Option<&str>, records: &mut Vec<FlatRecord>) {
    records.push(FlatRecord::new(node.id.clone(), node.name.clone(), parent_id));
    for child in &node.collections {
        flatten_into(child, Some(&node.id), records);
    }
}

/// Rebuilds the forest from flat records.
///
/// Records flagged `deleted` are skipped. A record whose parent cannot be found becomes a root
/// instead of being dropped, and so does any record caught in a parent cycle. Siblings come out
/// sorted by name and every node starts closed.
pub fn unflatten(records: &[FlatRecord]) -> Vec<CollectionNode> {
    let live: Vec<&FlatRecord> = records.iter().filter(|r| !r.deleted).collect();

    // Pass 1: a childless node for every record.
    let mut nodes: HashMap<&str, CollectionNode> = HashMap::with_capacity(live.len());
    for record in &live {
        let files = record
            .editor_files
            .iter()
            .flatten()
            .map(|f| FileRef::new(f.file_id.clone(), f.file_name.clone()))
            .collect();
        nodes.insert(
            record.collection_id.as_str(),
            CollectionNode {
                id: record.collection_id.clone(),
                name: record.collection_name.clone(),
                files,
                collections: Vec::new(),
                is_open: false,
            },
        );
    }

    // Pass 2: link children to parents, falling back to the root level.
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut roots: Vec<&str> = Vec::new();
    for record in &live {
        let id = record.collection_id.as_str();
        match record.parent_id.as_deref() {
            Some(parent) if nodes.contains_key(parent) => children.entry(parent).or_default().push(id),
            Some(parent) => {
                warn!(collection_id = id, parent_id = parent, "Parent collection missing, treating as root");
                roots.push(id);
            }
            None => roots.push(id),
        }
    }

    let mut visited = HashSet::with_capacity(nodes.len());
    let mut forest: Vec<CollectionNode> = roots
        .iter()
        .filter_map(|id| assemble(*id, &mut nodes, &children, &mut visited))
        .collect();

    // Whatever is left is only reachable through a parent cycle.
    for record in &live {
        let id = record.collection_id.as_str();
        if !visited.contains(id) && nodes.contains_key(id) {
            warn!(collection_id = id, "Collection is part of a parent cycle, treating as root");
            if let Some(node) = assemble(id, &mut nodes, &children, &mut visited) {
                forest.push(node);
            }
        }
    }

    normalize(&mut forest);
    debug!(records = records.len(), roots = forest.len(), "Collection tree rebuilt");
    forest
}

fn assemble<'r>(
    id: &'r str,
    nodes: &mut HashMap<&'r str, CollectionNode>,
    children: &HashMap<&'r str, Vec<&'r str>>,
    visited: &mut HashSet<&'r str>,
) -> Option<CollectionNode> {
    if !visited.insert(id) {
        return None;
    }
    let mut node = nodes.remove(id)?;
    if let Some(child_ids) = children.get(id) {
        for child_id in child_ids {
            if let Some(child) = assemble(*child_id, nodes, children, visited) {
                node.collections.push(child);
            }
        }
    }
    Some(node)
}
