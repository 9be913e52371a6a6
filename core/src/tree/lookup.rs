use super::walk::find_where;
use super::{CollectionNode, FileRef, ItemKind};

/// Finds a collection anywhere in the forest.
pub fn find_collection<'a>(forest: &'a [CollectionNode], id: &str) -> Option<&'a CollectionNode> {
    find_where(forest, &|node: &CollectionNode| node.id == id)
}

/// Resolves the collection that directly holds a file, together with the file itself.
pub fn file_location<'a>(forest: &'a [CollectionNode], file_id: &str) -> Option<(&'a CollectionNode, &'a FileRef)> {
    let owner = find_where(forest, &|node: &CollectionNode| node.files.iter().any(|f| f.id == file_id))?;
    let file = owner.files.iter().find(|f| f.id == file_id)?;
    Some((owner, file))
}

/// Current display name of an item, e.g. to pre-fill a rename prompt or a delete confirmation.
pub fn find_item_name<'a>(forest: &'a [CollectionNode], id: &str, kind: ItemKind) -> Option<&'a str> {
    match kind {
        ItemKind::Collection => find_collection(forest, id).map(|c| c.name.as_str()),
        ItemKind::File => file_location(forest, id).map(|(_, f)| f.name.as_str()),
    }
}

/// Ids of `node` and every collection below it, children before their parent.
pub fn collection_ids_post_order(node: &CollectionNode) -> Vec<String> {
    let mut ids = Vec::new();
    push_post_order(node, &mut ids);
    ids
}

fn push_post_order(node: &CollectionNode, ids: &mut Vec<String>) {
    for child in &node.collections {
        push_post_order(child, ids);
    }
    ids.push(node.id.clone());
}
