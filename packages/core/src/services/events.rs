//! Tree Events
//!
//! Domain events emitted by [`OutlineService`] whenever the local tree
//! changes. Events go out on a tokio broadcast channel so any number of UI
//! layers can subscribe without coupling to the service internals; this
//! replaces ambient shared state with one owned container plus
//! notifications.
//!
//! Events describe *local* state transitions. Background persistence results
//! only appear as [`TreeEvent::ContentSaved`] (successful content save with
//! server-derived metadata) and [`TreeEvent::SyncFailed`] (a remote call
//! failed and the optimistic state stands).
//!
//! [`OutlineService`]: crate::services::OutlineService

use crate::models::{ContentParsedInfo, Node, NodeId};

/// Broadcast channel capacity for tree events.
///
/// 128 gives headroom for bursts (initial load, subtree deletes) while
/// keeping memory bounded. Lagging observers only miss intermediate states,
/// which they can rebuild from the service's current tree.
pub const TREE_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Events emitted on local tree changes
#[derive(Debug, Clone)]
pub enum TreeEvent {
    /// The whole tree was replaced from a fetch-all load
    Loaded { node_count: usize },

    /// A node was created locally (persistence may still be in flight)
    NodeCreated(Node),

    /// A node moved to a new parent/position
    NodeMoved {
        id: NodeId,
        parent_id: Option<NodeId>,
        prev_sliding_id: Option<NodeId>,
    },

    /// A node's display label changed
    NodeRenamed { id: NodeId, name: String },

    /// A node and its subtree were removed
    NodeDeleted { id: NodeId },

    /// A debounced content save succeeded; carries what the server extracted
    ContentSaved {
        id: NodeId,
        parsed_info: ContentParsedInfo,
    },

    /// The edit lock changed (only emitted after server confirmation)
    ReadonlyChanged { id: NodeId, readonly: bool },

    /// A background persistence call failed; local state was kept as-is
    SyncFailed { id: NodeId, operation: &'static str },
}

impl TreeEvent {
    /// String tag of the event kind, for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            TreeEvent::Loaded { .. } => "tree:loaded",
            TreeEvent::NodeCreated(_) => "node:created",
            TreeEvent::NodeMoved { .. } => "node:moved",
            TreeEvent::NodeRenamed { .. } => "node:renamed",
            TreeEvent::NodeDeleted { .. } => "node:deleted",
            TreeEvent::ContentSaved { .. } => "node:content-saved",
            TreeEvent::ReadonlyChanged { .. } => "node:readonly-changed",
            TreeEvent::SyncFailed { .. } => "node:sync-failed",
        }
    }
}
