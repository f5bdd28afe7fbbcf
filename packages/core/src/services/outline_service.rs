//! Outline Service - Local Tree & Optimistic Sync
//!
//! This module provides the main coordination layer between the local tree
//! view-state and the remote store:
//!
//! - initial load (fetch-all, reconcile, replace)
//! - structural user actions (create, move, rename, delete) applied to the
//!   local tree first, persisted asynchronously after
//! - content edits handed to the debounced autosaver
//! - confirm-then-apply toggles (readonly) gated on the server's row count
//!
//! # Optimistic sync policy
//!
//! Structural mutations never wait for the server and never roll back. When
//! a persistence call fails the local state stands, the failure is logged,
//! and a [`TreeEvent::SyncFailed`] goes out for hosts that want to react.
//! Calls for the same node are not sequenced against each other; whatever
//! response arrives last wins.
//!
//! # Concurrency
//!
//! The view-state is the single shared mutable structure. Every mutation
//! goes through one async mutex, and no lock is held across a store call, so
//! a slow server never blocks local edits.
//!
//! # Examples
//!
//! ```no_run
//! use knotree_core::services::OutlineService;
//! use knotree_core::store::{HttpStore, HttpStoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(HttpStore::new(HttpStoreConfig::default())?);
//!     let service = OutlineService::new(store);
//!
//!     service.load().await?;
//!     let node = service.create_node(None, 0, "inbox").await?;
//!     println!("created {}", node.id);
//!     Ok(())
//! }
//! ```

use crate::models::{Asset, Node, NodeId};
use crate::services::autosave::{AutosaveConfig, ContentAutosaver};
use crate::services::error::OutlineError;
use crate::services::events::{TreeEvent, TREE_EVENT_CHANNEL_CAPACITY};
use crate::services::tree_state::{MoveError, TreeState};
use crate::store::{NodeSelector, NodeStore};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Coordination layer owning the local tree and its persistence
#[derive(Clone)]
pub struct OutlineService {
    state: Arc<Mutex<TreeState>>,
    store: Arc<dyn NodeStore>,
    autosaver: ContentAutosaver,
    event_tx: broadcast::Sender<TreeEvent>,
}

impl OutlineService {
    /// Create a service with the default autosave policy (600ms debounce)
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self::with_autosave(store, AutosaveConfig::default())
    }

    /// Create a service with an explicit autosave policy
    pub fn with_autosave(store: Arc<dyn NodeStore>, config: AutosaveConfig) -> Self {
        let state = Arc::new(Mutex::new(TreeState::new()));
        let (event_tx, _) = broadcast::channel(TREE_EVENT_CHANNEL_CAPACITY);
        let autosaver =
            ContentAutosaver::new(state.clone(), store.clone(), event_tx.clone(), config);

        Self {
            state,
            store,
            autosaver,
            event_tx,
        }
    }

    /// Subscribe to tree change events
    pub fn subscribe(&self) -> broadcast::Receiver<TreeEvent> {
        self.event_tx.subscribe()
    }

    /// Access the autosaver (pending-save indicators)
    pub fn autosaver(&self) -> &ContentAutosaver {
        &self.autosaver
    }

    /// Load the whole tree from the store, replacing local state.
    ///
    /// This is the one structural operation that surfaces store failures to
    /// the caller; without an initial load there is nothing to be
    /// optimistic about.
    pub async fn load(&self) -> Result<usize, OutlineError> {
        let nodes = self.store.fetch_all_nodes().await?;
        let node_count = nodes.len();

        {
            let mut state = self.state.lock().await;
            state.load(nodes);
        }
        tracing::info!(node_count, "tree loaded");
        let _ = self.event_tx.send(TreeEvent::Loaded { node_count });
        Ok(node_count)
    }

    /// Create a node at `index` under `parent_id` (`None` for root level).
    ///
    /// The node is generated client-side, inserted locally, and persisted in
    /// the background. Returns the created record immediately.
    pub async fn create_node(
        &self,
        parent_id: Option<&str>,
        index: usize,
        name: &str,
    ) -> Result<Node, OutlineError> {
        let node = Node::new(name.to_string(), parent_id.map(str::to_string), None);
        node.validate()?;

        let stored = {
            let mut state = self.state.lock().await;
            if let Some(parent_id) = parent_id {
                if !state.contains(parent_id) {
                    return Err(OutlineError::node_not_found(parent_id));
                }
            }
            state.insert_at(node, index)
        };

        let _ = self.event_tx.send(TreeEvent::NodeCreated(stored.clone()));

        if let Err(err) = self.store.insert_node(&stored).await {
            tracing::error!(node_id = %stored.id, error = %err, "insert-node failed, keeping optimistic node");
            let _ = self.event_tx.send(TreeEvent::SyncFailed {
                id: stored.id.clone(),
                operation: "insert-node",
            });
        }

        Ok(stored)
    }

    /// Move a node to `index` under `new_parent` (`None` for root level)
    pub async fn move_node(
        &self,
        id: &str,
        new_parent: Option<&str>,
        index: usize,
    ) -> Result<Node, OutlineError> {
        let moved = {
            let mut state = self.state.lock().await;
            state
                .move_to(id, new_parent.map(str::to_string), index)
                .map_err(|err| match err {
                    MoveError::NotFound => OutlineError::node_not_found(id),
                    MoveError::ParentNotFound => {
                        OutlineError::node_not_found(new_parent.unwrap_or_default())
                    }
                    MoveError::WouldCycle => OutlineError::circular_move(format!(
                        "cannot move {} under its own subtree",
                        id
                    )),
                })?
        };

        let _ = self.event_tx.send(TreeEvent::NodeMoved {
            id: moved.id.clone(),
            parent_id: moved.parent_id.clone(),
            prev_sliding_id: moved.prev_sliding_id.clone(),
        });

        if let Err(err) = self
            .store
            .move_node(
                id,
                moved.parent_id.as_deref(),
                moved.prev_sliding_id.as_deref(),
            )
            .await
        {
            tracing::error!(node_id = %id, error = %err, "move-node failed, keeping optimistic position");
            let _ = self.event_tx.send(TreeEvent::SyncFailed {
                id: id.to_string(),
                operation: "move-node",
            });
        }

        Ok(moved)
    }

    /// Rename a node.
    ///
    /// Only committed values reach this method; in-progress inline edits are
    /// a UI concern and never touch state or the store.
    pub async fn rename_node(&self, id: &str, name: &str) -> Result<(), OutlineError> {
        {
            let mut state = self.state.lock().await;
            if !state.rename(id, name.to_string()) {
                return Err(OutlineError::node_not_found(id));
            }
        }

        let _ = self.event_tx.send(TreeEvent::NodeRenamed {
            id: id.to_string(),
            name: name.to_string(),
        });

        match self.store.update_node_name(id, name).await {
            Ok(0) => tracing::warn!(node_id = %id, "rename affected no rows on the store"),
            Ok(_) => {}
            Err(err) => {
                tracing::error!(node_id = %id, error = %err, "update-node-name failed, keeping optimistic name");
                let _ = self.event_tx.send(TreeEvent::SyncFailed {
                    id: id.to_string(),
                    operation: "update-node-name",
                });
            }
        }

        Ok(())
    }

    /// Delete a node and its subtree.
    ///
    /// Removal is immediate and irreversible from this layer's perspective;
    /// there is no tombstone or undo.
    pub async fn delete_node(&self, id: &str) -> Result<Vec<NodeId>, OutlineError> {
        let removed = {
            let mut state = self.state.lock().await;
            state
                .remove(id)
                .ok_or_else(|| OutlineError::node_not_found(id))?
        };

        let _ = self.event_tx.send(TreeEvent::NodeDeleted {
            id: id.to_string(),
        });

        if let Err(err) = self.store.delete_node(id).await {
            tracing::error!(node_id = %id, error = %err, "delete-node failed, node already gone locally");
            let _ = self.event_tx.send(TreeEvent::SyncFailed {
                id: id.to_string(),
                operation: "delete-node",
            });
        }

        Ok(removed)
    }

    /// Record an edited content payload and arm the debounced save
    pub async fn edited_content(&self, id: &str, content: &str) -> Result<(), OutlineError> {
        {
            let mut state = self.state.lock().await;
            let readonly = state
                .node(id)
                .map(|node| node.readonly)
                .ok_or_else(|| OutlineError::node_not_found(id))?;
            if readonly {
                return Err(OutlineError::read_only(id));
            }
            state.set_content(id, content.to_string());
        }

        self.autosaver.content_changed(id).await;
        Ok(())
    }

    /// Toggle the edit lock.
    ///
    /// Unlike the structural operations this is confirm-then-apply: the
    /// local flag only flips when the store reports a positive row count.
    /// Returns whether the toggle was applied.
    pub async fn set_readonly(&self, id: &str, readonly: bool) -> Result<bool, OutlineError> {
        {
            let state = self.state.lock().await;
            if !state.contains(id) {
                return Err(OutlineError::node_not_found(id));
            }
        }

        let count = match self.store.update_node_readonly(id, readonly).await {
            Ok(count) => count,
            Err(err) => {
                tracing::error!(node_id = %id, error = %err, "update-node-readonly failed, lock unchanged");
                let _ = self.event_tx.send(TreeEvent::SyncFailed {
                    id: id.to_string(),
                    operation: "update-node-readonly",
                });
                return Ok(false);
            }
        };

        if count == 0 {
            return Ok(false);
        }

        {
            let mut state = self.state.lock().await;
            state.set_readonly(id, readonly);
        }
        let _ = self.event_tx.send(TreeEvent::ReadonlyChanged {
            id: id.to_string(),
            readonly,
        });
        Ok(true)
    }

    /// Fetch a node's full content from the store and refresh the local copy
    pub async fn fetch_content(&self, id: &str) -> Result<Node, OutlineError> {
        let nodes = self.store.fetch_nodes(NodeSelector::by_id(id)).await?;
        let node = nodes
            .into_iter()
            .next()
            .ok_or_else(|| OutlineError::node_not_found(id))?;

        {
            let mut state = self.state.lock().await;
            state.refresh_payload(&node);
        }
        Ok(node)
    }

    /// Substring search on the store (backlink and mention lookups)
    pub async fn search_nodes(&self, query: &str) -> Result<Vec<Node>, OutlineError> {
        Ok(self.store.fetch_nodes(NodeSelector::like(query)).await?)
    }

    /// Upload a file, returning its asset descriptor
    pub async fn upload_asset(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Asset, OutlineError> {
        Ok(self
            .store
            .upload_asset(file_name, bytes, content_type)
            .await?)
    }

    /// Snapshot of the current forest for rendering
    pub async fn forest(&self) -> Vec<Node> {
        self.state.lock().await.forest()
    }

    /// Snapshot of a single node
    pub async fn node(&self, id: &str) -> Option<Node> {
        self.state.lock().await.node(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.is_empty()
    }
}
