//! Tree Reconciler
//!
//! Turns the flat node set the store returns into a forest by resolving
//! `parent_id` pointers. Reconciliation is deliberately forgiving about
//! partial data: a node whose parent is absent from the set becomes a root
//! rather than an error, so filtered loads still render.
//!
//! [`arrange_nodes`] attaches children in input iteration order and does NOT
//! apply sibling order; display order needs the second pass in
//! [`arrange_ordered`], which walks the `prev_sliding_id` chains.

use crate::models::{Node, NodeId};
use crate::tree::sibling::sort_by_sibling_chain;
use std::collections::{HashMap, HashSet};

/// Reconcile a flat node set into a forest.
///
/// Roots are exactly the nodes whose `parent_id` does not resolve within the
/// set (including `parent_id = None`). Every other node is appended to its
/// parent's `children`, in input iteration order.
///
/// Duplicate ids are not guarded: the last record wins. Parent cycles are not
/// detected; a mutually-parented pair resolves into each other's `children`
/// and disappears from the root list entirely.
pub fn arrange_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut index: HashMap<NodeId, Node> = HashMap::with_capacity(nodes.len());
    let mut input_order: Vec<NodeId> = Vec::with_capacity(nodes.len());

    for mut node in nodes {
        node.children.clear();
        let id = node.id.clone();
        if index.insert(id.clone(), node).is_none() {
            input_order.push(id);
        }
    }

    let mut child_ids: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    let mut root_candidates: HashSet<NodeId> = input_order.iter().cloned().collect();

    for id in &input_order {
        let parent_id = index.get(id).and_then(|node| node.parent_id.clone());
        if let Some(parent_id) = parent_id {
            if index.contains_key(&parent_id) {
                child_ids.entry(parent_id).or_default().push(id.clone());
                root_candidates.remove(id);
            } else {
                tracing::debug!(node_id = %id, parent_id = %parent_id, "parent not loaded, keeping node as root");
            }
        }
    }

    let mut forest = Vec::with_capacity(root_candidates.len());
    for id in &input_order {
        if root_candidates.contains(id) {
            if let Some(root) = attach_children(id, &mut index, &child_ids) {
                forest.push(root);
            }
        }
    }

    forest
}

/// Reconcile and apply sibling order recursively.
///
/// This is the two-pass composition consumers want for display: forest shape
/// from [`arrange_nodes`], then every sibling list (the root list included)
/// reordered by its `prev_sliding_id` chain.
pub fn arrange_ordered(nodes: Vec<Node>) -> Vec<Node> {
    let mut forest = arrange_nodes(nodes);
    order_recursively(&mut forest);
    forest
}

fn order_recursively(siblings: &mut Vec<Node>) {
    sort_by_sibling_chain(siblings);
    for node in siblings {
        order_recursively(&mut node.children);
    }
}

fn attach_children(
    id: &NodeId,
    index: &mut HashMap<NodeId, Node>,
    child_ids: &HashMap<NodeId, Vec<NodeId>>,
) -> Option<Node> {
    let mut node = index.remove(id)?;
    if let Some(children) = child_ids.get(id) {
        for child_id in children {
            if let Some(child) = attach_children(child_id, index, child_ids) {
                node.children.push(child);
            }
        }
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, parent: Option<&str>, prev: Option<&str>) -> Node {
        Node::new_with_id(
            id.to_string(),
            id.to_string(),
            parent.map(str::to_string),
            prev.map(str::to_string),
        )
    }

    fn count_nodes(forest: &[Node]) -> usize {
        forest
            .iter()
            .map(|n| 1 + count_nodes(&n.children))
            .sum::<usize>()
    }

    #[test]
    fn test_single_root_with_ordered_children() {
        // Scenario: r -> [a, b], b chained after a
        let nodes = vec![
            node("r", None, None),
            node("a", Some("r"), None),
            node("b", Some("r"), Some("a")),
        ];

        let forest = arrange_ordered(nodes);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "r");
        let children: Vec<&str> = forest[0].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(children, ["a", "b"]);
    }

    #[test]
    fn test_children_follow_input_order_without_second_pass() {
        // arrange_nodes alone ignores the sibling chain
        let nodes = vec![
            node("r", None, None),
            node("b", Some("r"), Some("a")),
            node("a", Some("r"), None),
        ];

        let forest = arrange_nodes(nodes);
        let children: Vec<&str> = forest[0].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(children, ["b", "a"]);
    }

    #[test]
    fn test_missing_parent_degrades_to_root() {
        // Scenario: a node referencing an unloaded parent classifies as root
        let nodes = vec![
            node("r", None, None),
            node("orphan", Some("not-loaded"), None),
        ];

        let forest = arrange_nodes(nodes);
        let roots: Vec<&str> = forest.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, ["r", "orphan"]);
    }

    #[test]
    fn test_forest_preserves_node_count() {
        let nodes = vec![
            node("r1", None, None),
            node("a", Some("r1"), None),
            node("b", Some("a"), None),
            node("r2", None, None),
            node("orphan", Some("gone"), None),
        ];

        let total = nodes.len();
        let forest = arrange_nodes(nodes);
        assert_eq!(count_nodes(&forest), total);
    }

    #[test]
    fn test_reconciliation_is_idempotent() {
        let nodes = vec![
            node("r", None, None),
            node("a", Some("r"), None),
            node("b", Some("r"), Some("a")),
            node("c", Some("a"), None),
        ];

        let once = arrange_ordered(nodes.clone());
        let twice = arrange_ordered(nodes);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_deep_nesting() {
        let nodes = vec![
            node("c", Some("b"), None),
            node("a", None, None),
            node("b", Some("a"), None),
        ];

        let forest = arrange_nodes(nodes);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "a");
        assert_eq!(forest[0].children[0].id, "b");
        assert_eq!(forest[0].children[0].children[0].id, "c");
    }

    #[test]
    fn test_dangling_prev_after_delete_reads_as_first_child() {
        // Scenario: "a" was deleted but "b" still chains after it
        let nodes = vec![node("r", None, None), node("b", Some("r"), Some("a"))];

        let forest = arrange_ordered(nodes);
        let children: Vec<&str> = forest[0].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(children, ["b"]);
    }

    #[test]
    fn test_root_list_is_sibling_ordered() {
        let nodes = vec![
            node("r2", None, Some("r1")),
            node("r3", None, Some("r2")),
            node("r1", None, None),
        ];

        let forest = arrange_ordered(nodes);
        let roots: Vec<&str> = forest.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, ["r1", "r2", "r3"]);
    }

    #[test]
    fn test_parent_cycle_disappears_from_roots() {
        // Known degenerate shape: mutually-parented nodes attach to each
        // other and neither remains a root candidate.
        let nodes = vec![
            node("r", None, None),
            node("x", Some("y"), None),
            node("y", Some("x"), None),
        ];

        let forest = arrange_nodes(nodes);
        let roots: Vec<&str> = forest.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, ["r"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(arrange_nodes(Vec::new()).is_empty());
        assert!(arrange_ordered(Vec::new()).is_empty());
    }
}
