use super::Tree;
use crate::libs::phylo::node::{Node, NodeId};
use itertools::Itertools;

/// Serialize tree to Newick string, with names and branch lengths.
pub fn to_newick(tree: &Tree) -> String {
    to_newick_with(tree, |node| {
        if node.parent.is_some() {
            Some(node.length())
        } else {
            None
        }
    })
}

/// Serialize tree to Newick, taking each node's branch value from `value`.
///
/// Leaves are written as `name:value`, internal nodes as `(children):value`.
/// Internal names are dropped; a `None` value omits the `:value` part.
pub fn to_newick_with<F>(tree: &Tree, value: F) -> String
where
    F: Fn(&Node) -> Option<f64>,
{
    match tree.get_root() {
        Some(root) => {
            let mut s = to_newick_recursive(tree, root, &value);
            s.push(';');
            s
        }
        None => ";".to_string(),
    }
}

fn to_newick_recursive<F>(tree: &Tree, node_id: NodeId, value: &F) -> String
where
    F: Fn(&Node) -> Option<f64>,
{
    let node = &tree.nodes[node_id];

    let mut s = if node.is_leaf() {
        node.name.clone().unwrap_or_default()
    } else {
        format!(
            "({})",
            node.children
                .iter()
                .map(|&child| to_newick_recursive(tree, child, value))
                .join(",")
        )
    };

    if let Some(v) = value(node) {
        s.push_str(&format!(":{}", v));
    }
    s
}

/// One tab-separated row per branch, in node-number order:
/// num, name, branch length, parent state, event path, node state.
///
/// The event path is written as `state:duration` segments joined by commas.
pub fn to_path_table(tree: &Tree) -> String {
    let mut out = String::new();
    for (id, parent) in tree.branches() {
        let node = &tree.nodes[id];
        let parent_state = tree.nodes[parent].state.unwrap_or('?');
        let path = node
            .event_path(parent_state)
            .iter()
            .map(|seg| format!("{}:{}", seg.state, seg.duration))
            .join(",");

        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            node.num,
            node.name.as_deref().unwrap_or(""),
            node.length(),
            parent_state,
            path,
            node.state.unwrap_or('?'),
        ));
    }
    out
}
