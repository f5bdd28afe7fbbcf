//! Node Data Structures
//!
//! This module defines the core `Node` struct shared by the tree, store, and
//! service layers.
//!
//! # Architecture
//!
//! - **Flat on the wire**: the remote store holds nodes as flat records with a
//!   `parent_id` pointer and a `prev_sliding_id` previous-sibling pointer.
//! - **Derived hierarchy**: the `children` field is transient; only the tree
//!   reconciler populates it, and it is never authoritative.
//! - **Sibling order as a linked list**: `prev_sliding_id` encodes sibling
//!   order per parent; `None` marks the first child. Display order is always
//!   materialized by walking the chain, never trusted field-by-field.
//!
//! # Examples
//!
//! ```rust
//! use knotree_core::models::Node;
//!
//! // A root node, id and timestamps generated client-side
//! let root = Node::new("inbox".to_string(), None, None);
//! assert!(root.is_root());
//!
//! // A first child of that root
//! let child = Node::new("groceries".to_string(), Some(root.id.clone()), None);
//! assert!(child.prev_sliding_id.is_none());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque node identifier (UUID generated client-side, or server-assigned)
pub type NodeId = String;

/// Validation errors for Node operations
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Invalid sibling reference: {0}")]
    InvalidSibling(String),
}

/// Content format of a node payload.
///
/// Currently a single rich-document format; the enum keeps the wire value
/// (`"tiptap/v1"`) open for future formats without a schema change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    #[default]
    #[serde(rename = "tiptap/v1")]
    TiptapV1,
}

/// A tag the server extracted from node content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTag {
    pub name: String,
    pub create_time: DateTime<Utc>,
}

/// Server-derived metadata returned from content saves.
///
/// The store parses saved content and hands back what it extracted (todo
/// status, tags). The client never computes this locally; it only applies
/// whatever the latest save returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentParsedInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo_status: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<NodeTag>,
}

/// A single note in the outline tree.
///
/// # Fields
///
/// - `id`: unique identifier, generated client-side at creation time
/// - `name`: display label shown in the tree
/// - `content`: opaque payload (serialized rich-document)
/// - `parent_id`: containing node, `None` for root-level nodes
/// - `prev_sliding_id`: preceding sibling under the same parent, `None` for
///   the first child
/// - `version_time` / `initial_time`: last-modified and creation timestamps
/// - `readonly`: edit lock; content edits are rejected while set
/// - `children`: derived by the reconciler, never persisted as authority
///
/// # Invariants
///
/// - `id` is unique within a loaded set
/// - `parent_id` references another node in the set or is `None`; a node
///   whose parent is absent from the loaded set is treated as a root
/// - within one parent, at most one node has `prev_sliding_id = None`, and
///   that node is the first child; two siblings sharing a `prev_sliding_id`
///   indicate a corrupt order and yield an undefined (but stable) display
///   order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,

    pub name: String,

    pub content: String,

    pub node_type: NodeType,

    /// Namespace tag the store keeps on every record
    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub parsed_info: ContentParsedInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_sliding_id: Option<NodeId>,

    pub version_time: DateTime<Utc>,

    pub initial_time: DateTime<Utc>,

    /// Present on the wire for soft-deleted records; unused locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub readonly: bool,

    /// Populated only by the tree reconciler
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new Node with a generated UUID and current timestamps.
    ///
    /// This is the client-side creation path: empty content, not readonly,
    /// placed under `parent_id` after `prev_sliding_id` (both `None` for a
    /// first root).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use knotree_core::models::Node;
    /// let node = Node::new("untitled".to_string(), None, None);
    /// assert!(!node.id.is_empty());
    /// assert!(node.content.is_empty());
    /// assert!(!node.readonly);
    /// ```
    pub fn new(name: String, parent_id: Option<NodeId>, prev_sliding_id: Option<NodeId>) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            name,
            content: String::new(),
            node_type: NodeType::TiptapV1,
            domain: String::new(),
            parsed_info: ContentParsedInfo::default(),
            parent_id,
            prev_sliding_id,
            version_time: now,
            initial_time: now,
            delete_time: None,
            readonly: false,
            children: Vec::new(),
        }
    }

    /// Create a new Node with an explicit id.
    ///
    /// Used when the id is already known (server-assigned records, tests).
    pub fn new_with_id(
        id: NodeId,
        name: String,
        parent_id: Option<NodeId>,
        prev_sliding_id: Option<NodeId>,
    ) -> Self {
        let mut node = Self::new(name, parent_id, prev_sliding_id);
        node.id = id;
        node
    }

    /// Validate the locally checkable structure invariants.
    ///
    /// Empty names and empty content are valid; blank nodes exist while the
    /// user is still typing.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `id` is empty
    /// - the node references itself as parent or previous sibling
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if let Some(parent_id) = &self.parent_id {
            if parent_id == &self.id {
                return Err(ValidationError::InvalidParent(
                    "node cannot be its own parent".to_string(),
                ));
            }
        }

        if let Some(prev_id) = &self.prev_sliding_id {
            if prev_id == &self.id {
                return Err(ValidationError::InvalidSibling(
                    "node cannot be its own previous sibling".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Check whether this node declares no parent at all.
    ///
    /// Note the reconciler has a wider notion of "root": a node whose parent
    /// is absent from the loaded set also ends up a root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Replace the content and bump the modification timestamp
    pub fn set_content(&mut self, content: String) {
        self.content = content;
        self.version_time = Utc::now();
    }

    /// Apply server-derived metadata from a content save
    pub fn set_parsed_info(&mut self, parsed_info: ContentParsedInfo) {
        self.parsed_info = parsed_info;
    }
}
