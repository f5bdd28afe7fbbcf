//! NodeStore Trait - Remote Store Abstraction
//!
//! This module defines the `NodeStore` trait that abstracts the remote node
//! store. The canonical backend is a REST API ([`HttpStore`]); tests and
//! offline hosts use the in-process [`MemoryStore`].
//!
//! All methods are async; the store never blocks the caller's event loop.
//! Implementations must be `Send + Sync` so futures can move between tasks.
//!
//! The request shapes below mirror the wire contract one to one, so a record
//! written through one backend reads back identically through another.
//!
//! [`HttpStore`]: crate::store::HttpStore
//! [`MemoryStore`]: crate::store::MemoryStore

use crate::models::{Asset, ContentParsedInfo, Node, NodeId};
use crate::store::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filter kinds accepted by the fetch-nodes operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "filter", content = "value", rename_all = "lowercase")]
pub enum NodeFilter {
    /// Exact id lookup
    Id(NodeId),

    /// Substring match against name and content
    Like(String),
}

/// Body of the fetch-nodes operation: which column groups to return and how
/// to filter the records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSelector {
    /// Column groups the server should include ("cont" for content, "lim"
    /// for limited/summary fields)
    pub selection: Vec<String>,

    pub filter: NodeFilter,
}

impl NodeSelector {
    /// Selector for a single node's full content
    pub fn by_id(id: impl Into<NodeId>) -> Self {
        Self {
            selection: vec!["cont".to_string()],
            filter: NodeFilter::Id(id.into()),
        }
    }

    /// Selector for a substring search (backlink and mention lookups)
    pub fn like(query: impl Into<String>) -> Self {
        Self {
            selection: vec!["cont".to_string(), "lim".to_string()],
            filter: NodeFilter::Like(query.into()),
        }
    }
}

/// Body of the move-node operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveNodeRequest {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub prev_sliding_id: Option<NodeId>,
}

/// Body of the update-node-content operation; `version_time` is the last
/// version the client saw, for the server's conflict bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateContentRequest {
    pub id: NodeId,
    pub content: String,
    pub version_time: DateTime<Utc>,
}

/// Body of the update-node-name operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateNameRequest {
    pub id: NodeId,
    pub name: String,
}

/// Body of the update-node-readonly operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateReadonlyRequest {
    pub id: NodeId,
    pub readonly: bool,
}

/// Body of the delete-node operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteNodeRequest {
    pub id: NodeId,
}

/// Abstraction over the remote node store.
///
/// Thin request/response wrappers only: no retries, no caching, no local
/// bookkeeping. Those concerns belong to the service layer.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Fetch every node the store holds (initial tree load).
    ///
    /// Records come back flat; the caller reconciles them into a forest.
    async fn fetch_all_nodes(&self) -> Result<Vec<Node>, StoreError>;

    /// Fetch nodes matching a selector (single-node content fetch, backlink
    /// search).
    async fn fetch_nodes(&self, selector: NodeSelector) -> Result<Vec<Node>, StoreError>;

    /// Create a node with structural placement (parent and previous sibling
    /// taken from the record).
    ///
    /// Returns the server-derived [`ContentParsedInfo`] for the saved
    /// content.
    async fn insert_node(&self, node: &Node) -> Result<ContentParsedInfo, StoreError>;

    /// Upsert a node's payload without touching its placement.
    async fn insert_node_only(&self, node: &Node) -> Result<ContentParsedInfo, StoreError>;

    /// Save new content for a node.
    ///
    /// `version_time` is the version the edit was based on.
    async fn update_node_content(
        &self,
        id: &str,
        content: &str,
        version_time: DateTime<Utc>,
    ) -> Result<ContentParsedInfo, StoreError>;

    /// Rename a node. Returns the affected-row count.
    async fn update_node_name(&self, id: &str, name: &str) -> Result<u64, StoreError>;

    /// Toggle the edit lock. Returns the affected-row count; the caller only
    /// commits the toggle locally when the count is positive.
    async fn update_node_readonly(&self, id: &str, readonly: bool) -> Result<u64, StoreError>;

    /// Reposition a node under `parent_id` after `prev_sliding_id`.
    async fn move_node(
        &self,
        id: &str,
        parent_id: Option<&str>,
        prev_sliding_id: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Delete a node. The store decides what happens to descendants.
    async fn delete_node(&self, id: &str) -> Result<(), StoreError>;

    /// Upload a file (image paste/drop), returning its descriptor.
    async fn upload_asset(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Asset, StoreError>;
}
