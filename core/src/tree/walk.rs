//! The one traversal every tree mutation is built on.

use super::CollectionNode;

/// Rebuilds `forest`, replacing each collection for which `matches` holds with `transform(node)`.
///
/// The walk is depth-first and does not descend into a node once it matched; the transform is
/// responsible for the whole subtree it returns. Untouched nodes are carried over as they are.
///
/// Returns `None` when nothing matched, so callers can keep the original forest (and, with it, the
/// guarantee that mutating an absent id is a no-op).
pub fn transform_where<P, F>(forest: &[CollectionNode], matches: P, transform: F) -> Option<Vec<CollectionNode>>
where
    P: Fn(&CollectionNode) -> bool,
    F: Fn(&CollectionNode) -> CollectionNode,
{
    transform_level(forest, &matches, &transform)
}

fn transform_level<P, F>(nodes: &[CollectionNode], matches: &P, transform: &F) -> Option<Vec<CollectionNode>>
where
    P: Fn(&CollectionNode) -> bool,
    F: Fn(&CollectionNode) -> CollectionNode,
{
    let mut changed = false;
    let rebuilt: Vec<CollectionNode> = nodes
        .iter()
        .map(|node| {
            if matches(node) {
                changed = true;
                return transform(node);
            }
            match transform_level(&node.collections, matches, transform) {
                Some(collections) => {
                    changed = true;
                    CollectionNode {
                        collections,
                        ..node.clone()
                    }
                }
                None => node.clone(),
            }
        })
        .collect();

    changed.then_some(rebuilt)
}

/// Depth-first search for the first collection satisfying `matches`.
pub fn find_where<'a, P>(forest: &'a [CollectionNode], matches: &P) -> Option<&'a CollectionNode>
where
    P: Fn(&CollectionNode) -> bool,
{
    for node in forest {
        if matches(node) {
            return Some(node);
        }
        if let Some(found) = find_where(&node.collections, matches) {
            return Some(found);
        }
    }
    None
}
