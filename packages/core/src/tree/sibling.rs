//! Ordered Sibling Model
//!
//! Sibling order within one parent is a singly-linked list: every node points
//! at its predecessor through `prev_sliding_id`, and `None` marks the head.
//! A back-pointer per node keeps moves cheap (only the moved node needs a new
//! pointer) at the cost of a chain walk whenever display order is needed.
//!
//! Readers must be defensive; the chain is reconstructed, not trusted:
//!
//! - a `prev_sliding_id` pointing outside the sibling set (the predecessor
//!   was deleted) reads as "first child"
//! - two siblings sharing a predecessor indicate a corrupt order; both are
//!   kept, emitted in input order after the shared predecessor
//! - a cycle in the chain is broken by a visited guard, and any node the walk
//!   never reached is appended in input order so nothing drops out of the
//!   rendered tree

use crate::models::{Node, NodeId};
use std::collections::{HashMap, HashSet};

/// Reorder `nodes` in place to match their `prev_sliding_id` chain.
///
/// The input is one sibling set (all children of a single parent). Nodes the
/// chain cannot place keep their relative input order at the tail.
pub fn sort_by_sibling_chain(nodes: &mut Vec<Node>) {
    if nodes.len() < 2 {
        return;
    }

    let order = chain_order(nodes);
    let mut slots: Vec<Option<Node>> = nodes.drain(..).map(Some).collect();
    for index in order {
        if let Some(node) = slots.get_mut(index).and_then(|slot| slot.take()) {
            nodes.push(node);
        }
    }
}

/// Compute the display permutation for one sibling set.
///
/// Returns indices into `nodes` in display order. Every input index appears
/// exactly once, whatever shape the chain is in.
pub fn chain_order(nodes: &[Node]) -> Vec<usize> {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    // Forward map: predecessor id -> nodes claiming to follow it, input order
    let mut successors: HashMap<Option<&str>, Vec<usize>> = HashMap::new();
    for (index, node) in nodes.iter().enumerate() {
        let prev = match node.prev_sliding_id.as_deref() {
            Some(p) if ids.contains(p) && p != node.id.as_str() => Some(p),
            Some(p) => {
                tracing::warn!(
                    node_id = %node.id,
                    prev_sliding_id = %p,
                    "dangling prev_sliding_id, treating node as first child"
                );
                None
            }
            None => None,
        };
        successors.entry(prev).or_default().push(index);
    }

    for (prev, followers) in &successors {
        if followers.len() > 1 {
            tracing::warn!(
                ?prev,
                count = followers.len(),
                "multiple siblings share one prev_sliding_id, order is corrupt"
            );
        }
    }

    let mut order = Vec::with_capacity(nodes.len());
    let mut visited = vec![false; nodes.len()];
    let mut stack: Vec<usize> = match successors.get(&None) {
        Some(heads) => heads.iter().rev().copied().collect(),
        None => Vec::new(),
    };

    while let Some(index) = stack.pop() {
        if visited[index] {
            continue;
        }
        visited[index] = true;
        order.push(index);

        if let Some(next) = successors.get(&Some(nodes[index].id.as_str())) {
            for &follower in next.iter().rev() {
                if !visited[follower] {
                    stack.push(follower);
                }
            }
        }
    }

    // Cycles leave nodes unreached; append them so none are lost
    if order.len() < nodes.len() {
        tracing::warn!(
            unreached = nodes.len() - order.len(),
            "sibling chain walk did not reach every node, appending leftovers in input order"
        );
        for (index, seen) in visited.iter().enumerate() {
            if !seen {
                order.push(index);
            }
        }
    }

    order
}

/// Predecessor id for inserting at `index` into an already-ordered sibling
/// list. Index 0 means first child (`None`).
///
/// When moving a node within its current parent, the caller must pass the
/// list with the moved node already removed, so the moved node never resolves
/// itself as predecessor.
pub fn prev_sliding_for_insert(ordered: &[Node], index: usize) -> Option<NodeId> {
    if index == 0 {
        return None;
    }
    ordered.get(index - 1).map(|node| node.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sibling(id: &str, prev: Option<&str>) -> Node {
        Node::new_with_id(
            id.to_string(),
            id.to_string(),
            Some("parent".to_string()),
            prev.map(str::to_string),
        )
    }

    fn ids(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_chain_walk_orders_shuffled_input() {
        let mut nodes = vec![
            sibling("c", Some("b")),
            sibling("a", None),
            sibling("b", Some("a")),
        ];

        sort_by_sibling_chain(&mut nodes);
        assert_eq!(ids(&nodes), ["a", "b", "c"]);
    }

    #[test]
    fn test_sentinel_node_is_first_child() {
        let mut nodes = vec![sibling("b", Some("a")), sibling("a", None)];

        sort_by_sibling_chain(&mut nodes);
        assert_eq!(ids(&nodes), ["a", "b"]);
        assert!(nodes[0].prev_sliding_id.is_none());
    }

    #[test]
    fn test_dangling_prev_reads_as_first_child() {
        // "a" was deleted; "b" still points at it
        let mut nodes = vec![sibling("c", Some("b")), sibling("b", Some("a"))];

        sort_by_sibling_chain(&mut nodes);
        assert_eq!(ids(&nodes), ["b", "c"]);
    }

    #[test]
    fn test_duplicate_prev_keeps_both_nodes() {
        let mut nodes = vec![
            sibling("a", None),
            sibling("b", Some("a")),
            sibling("b2", Some("a")),
            sibling("c", Some("b")),
        ];

        sort_by_sibling_chain(&mut nodes);
        // Order past the corruption is undefined but must keep all four
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0].id, "a");
        assert!(ids(&nodes).contains(&"b2"));
    }

    #[test]
    fn test_injected_cycle_never_revisits_and_never_loses_nodes() {
        // b and c point at each other; no walk from the head reaches them
        let mut nodes = vec![
            sibling("a", None),
            sibling("b", Some("c")),
            sibling("c", Some("b")),
        ];

        sort_by_sibling_chain(&mut nodes);

        let seen = ids(&nodes);
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], "a");
        assert!(seen.contains(&"b") && seen.contains(&"c"));
    }

    #[test]
    fn test_self_referential_prev_is_treated_as_dangling() {
        let mut nodes = vec![sibling("a", Some("a")), sibling("b", Some("a"))];

        sort_by_sibling_chain(&mut nodes);
        assert_eq!(ids(&nodes), ["a", "b"]);
    }

    #[test]
    fn test_chain_order_is_a_permutation() {
        let nodes = vec![
            sibling("a", None),
            sibling("b", Some("missing")),
            sibling("c", Some("b")),
            sibling("d", Some("d")),
        ];

        let mut order = chain_order(&nodes);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_prev_for_insert_at_head() {
        let nodes = vec![sibling("a", None), sibling("b", Some("a"))];
        assert_eq!(prev_sliding_for_insert(&nodes, 0), None);
    }

    #[test]
    fn test_prev_for_insert_in_middle_and_tail() {
        let nodes = vec![sibling("a", None), sibling("b", Some("a"))];

        assert_eq!(prev_sliding_for_insert(&nodes, 1).as_deref(), Some("a"));
        assert_eq!(prev_sliding_for_insert(&nodes, 2).as_deref(), Some("b"));
    }
}
