//! In-memory model of the collection sidebar.
//!
//! The sidebar shows a *forest*: an ordered list of root [`CollectionNode`]s, each of which owns
//! nested collections and [`FileRef`]s. The forest only carries metadata; file contents are read
//! and written lazily through a [`ResourceStore`](crate::store::ResourceStore).
//!
//! Everything in this module is pure. Mutations never touch their input and always hand back a new
//! forest, which keeps the forest trivially shareable between the sync controller, the search view
//! and the selection machinery.
//!
//! # Ordering
//!
//! Siblings are kept sorted by name (collections and files independently). The comparison is
//! [`compare_names`], a multi-level collation: base letters first (accents and case ignored), then
//! accents, then case with lowercase ahead of uppercase. `"alpha"`, `"Émile"` and `"zeta"` sort the
//! way a person reading the sidebar expects.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

mod lookup;
mod mutation;
pub mod walk;

pub use lookup::{collection_ids_post_order, file_location, find_collection, find_item_name};
pub use mutation::{add_item, delete_item, rename_item, toggle_open};

/// The top-level ordered list of root collections.
pub type Forest = Vec<CollectionNode>;

/// A file as it appears in the sidebar. Content is not part of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef {
    pub id: String,
    pub name: String,
}

impl FileRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// A collection together with everything nested below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub files: Vec<FileRef>,
    #[serde(default)]
    pub collections: Vec<CollectionNode>,
    /// Expand/collapse flag. Presentation only, never persisted.
    #[serde(default)]
    pub is_open: bool,
}

impl CollectionNode {
    /// Creates an empty, closed collection.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            files: Vec::new(),
            collections: Vec::new(),
            is_open: false,
        }
    }

    /// Builder-style helper mostly used to assemble fixtures.
    pub fn with_files(mut self, files: impl IntoIterator<Item = FileRef>) -> Self {
        self.files.extend(files);
        sort_by_name(&mut self.files);
        self
    }

    /// Builder-style helper mostly used to assemble fixtures.
    pub fn with_collections(mut self, collections: impl IntoIterator<Item = CollectionNode>) -> Self {
        self.collections.extend(collections);
        sort_by_name(&mut self.collections);
        self
    }

    pub fn open(mut self) -> Self {
        self.is_open = true;
        self
    }

    /// Number of files in this collection and all of its descendants.
    pub fn total_files(&self) -> usize {
        self.files.len() + self.collections.iter().map(CollectionNode::total_files).sum::<usize>()
    }
}

/// Which kind of sidebar entry an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Collection,
    File,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Collection => f.write_str("collection"),
            ItemKind::File => f.write_str("file"),
        }
    }
}

/// Id and display name of an item that is about to be inserted into the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub id: String,
    pub name: String,
}

impl NewItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("No {kind} with id '{id}' in the forest")]
    NotFound { kind: ItemKind, id: String },
}

/// Anything that is displayed, and therefore sorted, by name.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for FileRef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for CollectionNode {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Sidebar ordering. Compares base letters, then accents, then case (lowercase first), and finally
/// code points so the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| lower_first(a).cmp(lower_first(b)))
        .then_with(|| a.cmp(b))
}

/// Lowercased with diacritics stripped.
fn base_letters(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Maps each char to a key where a lowercase letter sorts before its uppercase form.
fn lower_first(name: &str) -> impl Iterator<Item = (char, bool)> + '_ {
    name.chars().map(|c| {
        let lower = c.to_lowercase().next().unwrap_or(c);
        (lower, c != lower)
    })
}

/// Stable in-place sort of a sibling sequence.
pub fn sort_by_name<T: Named>(items: &mut [T]) {
    items.sort_by(|a, b| compare_names(a.name(), b.name()));
}

/// Sorts every sibling sequence at every level of the forest.
pub fn normalize(forest: &mut [CollectionNode]) {
    sort_by_name(forest);
    for node in forest.iter_mut() {
        sort_by_name(&mut node.files);
        normalize(&mut node.collections);
    }
}

/// Returns true when every sibling sequence of the forest is in sidebar order.
pub fn is_sorted(forest: &[CollectionNode]) -> bool {
    fn ordered<T: Named>(items: &[T]) -> bool {
        items
            .windows(2)
            .all(|w| compare_names(w[0].name(), w[1].name()) != Ordering::Greater)
    }

    ordered(forest)
        && forest
            .iter()
            .all(|node| ordered(&node.files) && is_sorted(&node.collections))
}
