use std::fmt::Write;

use console::style;
use folio_core::tree::CollectionNode;

const INDENT: &str = "    ";

/// Renders the forest as an indented listing: sub-collections first, then files, each with its id.
///
/// `[-]` marks an open collection and `[+]` a closed one.
pub fn render_tree(forest: &[CollectionNode], styled: bool) -> String {
    let mut out = String::new();
    for node in forest {
        render_collection(node, 0, styled, &mut out);
    }
    out
}

fn render_collection(node: &CollectionNode, depth: usize, styled: bool, out: &mut String) {
    let marker = if node.is_open { "[-]" } else { "[+]" };
    let name = if styled {
        style(&node.name).bold().to_string()
    } else {
        node.name.clone()
    };
    let _ = writeln!(out, "{}{marker} {name}  ({})", INDENT.repeat(depth), node.id);

    for child in &node.collections {
        render_collection(child, depth + 1, styled, out);
    }
    for file in &node.files {
        let _ = writeln!(out, "{}{}  ({})", INDENT.repeat(depth + 1), file.name, file.id);
    }
}
