//! Local Tree View-State
//!
//! [`TreeState`] is the client-side cache mirroring the remote store: a flat
//! node map plus explicit per-parent child order. It exists for immediate UI
//! feedback; every structural user action mutates it first, and persistence
//! catches up asynchronously.
//!
//! Two representations of sibling order coexist on purpose:
//!
//! - the per-parent vectors here are the display truth, giving O(1) position
//!   lookup for inserts and moves
//! - `prev_sliding_id` on each node is the persistence contract; it is
//!   re-derived from the vectors on every structural write and only fully
//!   re-walked on [`TreeState::load`]
//!
//! Stale back-pointers on *other* nodes (e.g. the old successor of a moved
//! node) are not patched; the defensive chain walk absorbs them on the next
//! load.

use crate::models::{ContentParsedInfo, Node, NodeId};
use crate::tree::arrange_ordered;
use std::collections::HashMap;

/// In-memory mutable tree mirroring the remote store
#[derive(Debug, Default)]
pub struct TreeState {
    /// Flat records; `children` inside these stays empty
    nodes: HashMap<NodeId, Node>,

    /// Display order per parent; the `None` key holds the root list
    children: HashMap<Option<NodeId>, Vec<NodeId>>,
}

impl TreeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole state from a flat fetch-all result.
    ///
    /// Runs the two-pass reconciliation: forest shape from `parent_id`, then
    /// sibling order from the `prev_sliding_id` chains.
    pub fn load(&mut self, nodes: Vec<Node>) {
        self.nodes.clear();
        self.children.clear();

        let forest = arrange_ordered(nodes);
        self.absorb(None, forest);
    }

    fn absorb(&mut self, parent: Option<NodeId>, siblings: Vec<Node>) {
        let ids: Vec<NodeId> = siblings.iter().map(|node| node.id.clone()).collect();
        self.children.insert(parent, ids);

        for mut node in siblings {
            let grandchildren = std::mem::take(&mut node.children);
            let id = node.id.clone();
            self.nodes.insert(id.clone(), node);
            if !grandchildren.is_empty() {
                self.absorb(Some(id), grandchildren);
            }
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Display-ordered child ids of a parent (`None` for the root list)
    pub fn child_ids(&self, parent: Option<&str>) -> &[NodeId] {
        self.children
            .get(&parent.map(str::to_string))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Insert a node at `index` under its declared parent.
    ///
    /// The index is clamped to the current child count. The stored node gets
    /// its `prev_sliding_id` derived from the final position; the previous
    /// occupant of that position is deliberately not re-pointed.
    pub fn insert_at(&mut self, mut node: Node, index: usize) -> Node {
        node.children.clear();

        let siblings = self.children.entry(node.parent_id.clone()).or_default();
        let index = index.min(siblings.len());
        node.prev_sliding_id = prev_at(siblings, index);
        siblings.insert(index, node.id.clone());

        self.nodes.insert(node.id.clone(), node.clone());
        node
    }

    /// Move a node to `index` under `new_parent`.
    ///
    /// The index is interpreted against the destination list with the node
    /// already removed, so a same-parent move never resolves itself as its
    /// own predecessor.
    ///
    /// Returns the updated record (new `parent_id` and `prev_sliding_id`)
    /// for the persistence call.
    pub fn move_to(
        &mut self,
        id: &str,
        new_parent: Option<NodeId>,
        index: usize,
    ) -> Result<Node, MoveError> {
        if !self.nodes.contains_key(id) {
            return Err(MoveError::NotFound);
        }

        if let Some(parent_id) = new_parent.as_deref() {
            if !self.nodes.contains_key(parent_id) {
                return Err(MoveError::ParentNotFound);
            }
            if self.is_same_or_descendant(parent_id, id) {
                return Err(MoveError::WouldCycle);
            }
        }

        self.detach(id);

        let siblings = self.children.entry(new_parent.clone()).or_default();
        let index = index.min(siblings.len());
        let prev_sliding_id = prev_at(siblings, index);
        siblings.insert(index, id.to_string());

        match self.nodes.get_mut(id) {
            Some(node) => {
                node.parent_id = new_parent;
                node.prev_sliding_id = prev_sliding_id;
                Ok(node.clone())
            }
            None => Err(MoveError::NotFound),
        }
    }

    /// Remove a node and its whole subtree.
    ///
    /// Returns the removed ids (target first), or `None` if the node is
    /// unknown. Siblings still pointing at the removed node keep their stale
    /// back-pointer; the chain walk treats it as "first child" on reload.
    pub fn remove(&mut self, id: &str) -> Option<Vec<NodeId>> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        self.detach(id);

        let mut removed = Vec::new();
        let mut frontier = vec![id.to_string()];
        while let Some(current) = frontier.pop() {
            if let Some(child_ids) = self.children.remove(&Some(current.clone())) {
                frontier.extend(child_ids);
            }
            self.nodes.remove(&current);
            removed.push(current);
        }
        Some(removed)
    }

    pub fn rename(&mut self, id: &str, name: String) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.name = name;
                true
            }
            None => false,
        }
    }

    /// Apply an edited content payload; bumps `version_time` and returns it
    pub fn set_content(&mut self, id: &str, content: String) -> Option<chrono::DateTime<chrono::Utc>> {
        let node = self.nodes.get_mut(id)?;
        node.set_content(content);
        Some(node.version_time)
    }

    pub fn set_parsed_info(&mut self, id: &str, parsed_info: ContentParsedInfo) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.set_parsed_info(parsed_info);
                true
            }
            None => false,
        }
    }

    pub fn set_readonly(&mut self, id: &str, readonly: bool) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.readonly = readonly;
                true
            }
            None => false,
        }
    }

    /// Refresh payload fields from a freshly fetched record, leaving local
    /// placement untouched
    pub fn refresh_payload(&mut self, fetched: &Node) -> bool {
        match self.nodes.get_mut(&fetched.id) {
            Some(node) => {
                node.content = fetched.content.clone();
                node.parsed_info = fetched.parsed_info.clone();
                node.version_time = fetched.version_time;
                node.readonly = fetched.readonly;
                true
            }
            None => false,
        }
    }

    /// Materialize the nested forest for rendering
    pub fn forest(&self) -> Vec<Node> {
        self.build(&None)
    }

    fn build(&self, parent: &Option<NodeId>) -> Vec<Node> {
        let mut out = Vec::new();
        if let Some(ids) = self.children.get(parent) {
            for id in ids {
                if let Some(node) = self.nodes.get(id) {
                    let mut node = node.clone();
                    node.children = self.build(&Some(id.clone()));
                    out.push(node);
                }
            }
        }
        out
    }

    /// Drop the node's id from whatever sibling list currently holds it
    fn detach(&mut self, id: &str) {
        let declared = self.nodes.get(id).and_then(|node| node.parent_id.clone());
        if Self::remove_from(self.children.get_mut(&declared), id) {
            return;
        }
        // Degraded roots live under the None key whatever their parent_id says
        if Self::remove_from(self.children.get_mut(&None), id) {
            return;
        }
        for siblings in self.children.values_mut() {
            if let Some(position) = siblings.iter().position(|sibling| sibling == id) {
                siblings.remove(position);
                return;
            }
        }
    }

    fn remove_from(siblings: Option<&mut Vec<NodeId>>, id: &str) -> bool {
        if let Some(siblings) = siblings {
            if let Some(position) = siblings.iter().position(|sibling| sibling == id) {
                siblings.remove(position);
                return true;
            }
        }
        false
    }

    /// True when `candidate` is `ancestor_of` itself or sits anywhere below it
    fn is_same_or_descendant(&self, candidate: &str, ancestor_of: &str) -> bool {
        if candidate == ancestor_of {
            return true;
        }

        let mut current = self.nodes.get(candidate).and_then(|n| n.parent_id.clone());
        // Hop bound guards against stale parent pointers forming a loop
        let mut hops = self.nodes.len();
        while let Some(parent_id) = current {
            if parent_id == ancestor_of {
                return true;
            }
            if hops == 0 {
                tracing::warn!(node_id = %candidate, "parent chain did not terminate, assuming no ancestry");
                return false;
            }
            hops -= 1;
            current = self.nodes.get(&parent_id).and_then(|n| n.parent_id.clone());
        }
        false
    }
}

/// Predecessor id for inserting at `index` into an ordered id list
fn prev_at(siblings: &[NodeId], index: usize) -> Option<NodeId> {
    if index == 0 {
        return None;
    }
    siblings.get(index - 1).cloned()
}

/// Structural failures from [`TreeState::move_to`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    NotFound,
    ParentNotFound,
    WouldCycle,
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

    fn loaded() -> TreeState {
        let mut state = TreeState::new();
        state.load(vec![
            node("r", None, None),
            node("a", Some("r"), None),
            node("b", Some("r"), Some("a")),
        ]);
        state
    }

    #[test]
    fn test_load_applies_sibling_order() {
        let state = loaded();

        assert_eq!(state.len(), 3);
        assert_eq!(state.child_ids(None), ["r".to_string()]);
        assert_eq!(
            state.child_ids(Some("r")),
            ["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_insert_at_head_gets_sentinel_prev() {
        // Creating at position 0 under a parent with children [a, b]
        let mut state = loaded();
        let created = node("new", Some("r"), None);

        let stored = state.insert_at(created, 0);

        assert!(stored.prev_sliding_id.is_none());
        assert_eq!(
            state.child_ids(Some("r")),
            ["new".to_string(), "a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_insert_in_middle_points_at_predecessor() {
        let mut state = loaded();

        let stored = state.insert_at(node("new", Some("r"), None), 1);

        assert_eq!(stored.prev_sliding_id.as_deref(), Some("a"));
        assert_eq!(
            state.child_ids(Some("r")),
            ["a".to_string(), "new".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_insert_index_is_clamped() {
        let mut state = loaded();

        let stored = state.insert_at(node("new", Some("r"), None), 99);

        assert_eq!(stored.prev_sliding_id.as_deref(), Some("b"));
        assert_eq!(
            state.child_ids(Some("r")),
            ["a".to_string(), "b".to_string(), "new".to_string()]
        );
    }

    #[test]
    fn test_move_within_same_parent_excludes_self() {
        let mut state = loaded();

        // Move b to the head of r's children
        let moved = state.move_to("b", Some("r".to_string()), 0).unwrap();

        assert!(moved.prev_sliding_id.is_none());
        assert_eq!(
            state.child_ids(Some("r")),
            ["b".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn test_move_to_new_parent() {
        let mut state = loaded();

        let moved = state.move_to("b", Some("a".to_string()), 0).unwrap();

        assert_eq!(moved.parent_id.as_deref(), Some("a"));
        assert!(moved.prev_sliding_id.is_none());
        assert_eq!(state.child_ids(Some("r")), ["a".to_string()]);
        assert_eq!(state.child_ids(Some("a")), ["b".to_string()]);
    }

    #[test]
    fn test_move_to_root_level() {
        let mut state = loaded();

        let moved = state.move_to("a", None, 1).unwrap();

        assert!(moved.parent_id.is_none());
        assert_eq!(moved.prev_sliding_id.as_deref(), Some("r"));
        assert_eq!(state.child_ids(None), ["r".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_move_under_own_descendant_is_rejected() {
        let mut state = TreeState::new();
        state.load(vec![
            node("r", None, None),
            node("a", Some("r"), None),
            node("b", Some("a"), None),
        ]);

        assert_eq!(
            state.move_to("a", Some("b".to_string()), 0),
            Err(MoveError::WouldCycle)
        );
        assert_eq!(
            state.move_to("a", Some("a".to_string()), 0),
            Err(MoveError::WouldCycle)
        );
    }

    #[test]
    fn test_move_to_unknown_parent_is_rejected() {
        let mut state = loaded();
        assert_eq!(
            state.move_to("a", Some("ghost".to_string()), 0),
            Err(MoveError::ParentNotFound)
        );
    }

    #[test]
    fn test_remove_drops_whole_subtree() {
        let mut state = TreeState::new();
        state.load(vec![
            node("r", None, None),
            node("a", Some("r"), None),
            node("b", Some("a"), None),
            node("c", Some("b"), None),
            node("keep", Some("r"), Some("a")),
        ]);

        let removed = state.remove("a").unwrap();

        assert_eq!(removed[0], "a");
        assert_eq!(removed.len(), 3);
        assert_eq!(state.len(), 2);
        assert_eq!(state.child_ids(Some("r")), ["keep".to_string()]);
    }

    #[test]
    fn test_remove_then_reload_treats_dangling_prev_as_first() {
        // "keep" chained after "a"; once "a" is gone its pointer dangles and
        // the next load places it first
        let mut state = TreeState::new();
        state.load(vec![
            node("r", None, None),
            node("a", Some("r"), None),
            node("keep", Some("r"), Some("a")),
        ]);
        state.remove("a");

        let flat: Vec<Node> = vec![node("r", None, None), node("keep", Some("r"), Some("a"))];
        state.load(flat);

        assert_eq!(state.child_ids(Some("r")), ["keep".to_string()]);
    }

    #[test]
    fn test_forest_materializes_nested_clone() {
        let state = loaded();

        let forest = state.forest();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "r");
        let children: Vec<&str> = forest[0].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(children, ["a", "b"]);
    }

    #[test]
    fn test_degraded_root_can_be_moved() {
        // Node whose parent never loaded sits in the root list but keeps its
        // stale parent_id; detach must still find it
        let mut state = TreeState::new();
        state.load(vec![node("r", None, None), node("lost", Some("gone"), None)]);
        assert_eq!(
            state.child_ids(None),
            ["r".to_string(), "lost".to_string()]
        );

        let moved = state.move_to("lost", Some("r".to_string()), 0).unwrap();

        assert_eq!(moved.parent_id.as_deref(), Some("r"));
        assert_eq!(state.child_ids(None), ["r".to_string()]);
        assert_eq!(state.child_ids(Some("r")), ["lost".to_string()]);
    }

    #[test]
    fn test_payload_mutators() {
        let mut state = loaded();

        assert!(state.rename("a", "renamed".to_string()));
        assert!(state.set_readonly("a", true));
        let version = state.set_content("a", "body".to_string());
        assert!(version.is_some());

        let a = state.node("a").unwrap();
        assert_eq!(a.name, "renamed");
        assert!(a.readonly);
        assert_eq!(a.content, "body");

        assert!(!state.rename("ghost", "x".to_string()));
        assert!(state.set_content("ghost", "x".to_string()).is_none());
    }
}
