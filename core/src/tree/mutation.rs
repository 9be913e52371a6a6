use tracing::debug;

use super::walk::transform_where;
use super::{sort_by_name, CollectionNode, FileRef, ItemKind, NewItem, TreeError};

/// Inserts `item` below `parent_id`, or at the forest root when `parent_id` is `None`.
///
/// New collections start out open. The receiving sibling sequence is re-sorted by name.
///
/// # Errors
///
/// Files cannot live at the forest root: adding a file with no parent is an
/// [`TreeError::InvalidOperation`]. An unknown `parent_id` is *not* an error; the forest is
/// returned unchanged.
pub fn add_item(
    forest: &[CollectionNode],
    kind: ItemKind,
    parent_id: Option<&str>,
    item: NewItem,
) -> Result<Vec<CollectionNode>, TreeError> {
    let Some(parent_id) = parent_id else {
        if kind == ItemKind::File {
            return Err(TreeError::InvalidOperation(format!(
                "file '{}' cannot be added outside of a collection",
                item.name
            )));
        }
        let mut roots = forest.to_vec();
        roots.push(new_collection(&item));
        sort_by_name(&mut roots);
        return Ok(roots);
    };

    let updated = transform_where(
        forest,
        |node| node.id == parent_id,
        |node| {
            let mut node = node.clone();
            match kind {
                ItemKind::Collection => {
                    node.collections.push(new_collection(&item));
                    sort_by_name(&mut node.collections);
                }
                ItemKind::File => {
                    node.files.push(FileRef::new(item.id.clone(), item.name.clone()));
                    sort_by_name(&mut node.files);
                }
            }
            node
        },
    );

    Ok(updated.unwrap_or_else(|| {
        debug!(parent_id, %kind, "Parent not found, add ignored");
        forest.to_vec()
    }))
}

/// Renames the collection or file with the given id wherever it sits in the forest and re-sorts
/// the sequence that contains it. Unknown ids leave the forest unchanged.
pub fn rename_item(forest: &[CollectionNode], id: &str, kind: ItemKind, new_name: &str) -> Vec<CollectionNode> {
    let updated = match kind {
        ItemKind::Collection if forest.iter().any(|root| root.id == id) => {
            let mut roots = forest.to_vec();
            rename_in(&mut roots, id, new_name);
            Some(roots)
        }
        ItemKind::Collection => transform_where(
            forest,
            |node| node.collections.iter().any(|c| c.id == id),
            |node| {
                let mut node = node.clone();
                rename_in(&mut node.collections, id, new_name);
                node
            },
        ),
        ItemKind::File => transform_where(
            forest,
            |node| node.files.iter().any(|f| f.id == id),
            |node| {
                let mut node = node.clone();
                for file in node.files.iter_mut().filter(|f| f.id == id) {
                    file.name = new_name.to_string();
                }
                sort_by_name(&mut node.files);
                node
            },
        ),
    };

    updated.unwrap_or_else(|| forest.to_vec())
}

fn rename_in(collections: &mut [CollectionNode], id: &str, new_name: &str) {
    for collection in collections.iter_mut().filter(|c| c.id == id) {
        collection.name = new_name.to_string();
    }
    sort_by_name(collections);
}

/// Removes an item from the forest.
///
/// With no `parent_id` the item is a root collection. Otherwise the parent is located anywhere in
/// the forest and the child of the requested kind is removed from it. Unknown ids (item or parent)
/// leave the forest unchanged.
pub fn delete_item(forest: &[CollectionNode], id: &str, kind: ItemKind, parent_id: Option<&str>) -> Vec<CollectionNode> {
    let Some(parent_id) = parent_id else {
        return forest.iter().filter(|root| root.id != id).cloned().collect();
    };

    transform_where(
        forest,
        |node| node.id == parent_id,
        |node| {
            let mut node = node.clone();
            match kind {
                ItemKind::Collection => node.collections.retain(|c| c.id != id),
                ItemKind::File => node.files.retain(|f| f.id != id),
            }
            node
        },
    )
    .unwrap_or_else(|| forest.to_vec())
}

/// Flips the expand/collapse flag of one collection.
pub fn toggle_open(forest: &[CollectionNode], id: &str) -> Vec<CollectionNode> {
    transform_where(
        forest,
        |node| node.id == id,
        |node| CollectionNode {
            is_open: !node.is_open,
            ..node.clone()
        },
    )
    .unwrap_or_else(|| forest.to_vec())
}

fn new_collection(item: &NewItem) -> CollectionNode {
    CollectionNode::new(item.id.clone(), item.name.clone()).open()
}
