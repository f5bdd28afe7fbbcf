//! Content Autosave
//!
//! Content edits arrive as a high-frequency stream of change notifications;
//! [`ContentAutosaver`] coalesces them into at most one save per quiet
//! period. Each notification re-arms the node's debounce timer, and when the
//! timer finally fires the save carries whatever content the view-state
//! holds at that moment, together with the last known `version_time`.
//!
//! Guarantees:
//!
//! - at most one save in flight per node (a per-node lock serializes them)
//! - the final save after input stops reflects the last edit (content is read
//!   at fire time, not capture time)
//! - the pending marker clears whether the save succeeds or fails; failures
//!   are logged and the local edit stands

use crate::models::NodeId;
use crate::services::events::TreeEvent;
use crate::services::tree_state::TreeState;
use crate::store::NodeStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

/// Debounce policy settings
#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    /// Quiet period before a pending edit is persisted
    pub debounce: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(600),
        }
    }
}

/// Debounced persistence of content edits
#[derive(Clone)]
pub struct ContentAutosaver {
    state: Arc<Mutex<TreeState>>,
    store: Arc<dyn NodeStore>,
    event_tx: broadcast::Sender<TreeEvent>,
    debounce: Duration,

    /// Newest edit generation per node; a sleeper only saves when its
    /// generation is still current at fire time
    pending: Arc<Mutex<HashMap<NodeId, u64>>>,

    /// Per-node save locks, so saves never overlap for one node
    locks: Arc<Mutex<HashMap<NodeId, Arc<Mutex<()>>>>>,
}

impl ContentAutosaver {
    pub(crate) fn new(
        state: Arc<Mutex<TreeState>>,
        store: Arc<dyn NodeStore>,
        event_tx: broadcast::Sender<TreeEvent>,
        config: AutosaveConfig,
    ) -> Self {
        Self {
            state,
            store,
            event_tx,
            debounce: config.debounce,
            pending: Arc::new(Mutex::new(HashMap::new())),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Note a content change and (re)arm the node's debounce timer
    pub async fn content_changed(&self, id: &str) {
        let generation = {
            let mut pending = self.pending.lock().await;
            let counter = pending.entry(id.to_string()).or_insert(0);
            *counter += 1;
            *counter
        };

        let autosaver = self.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(autosaver.debounce).await;
            autosaver.flush_if_latest(&id, generation).await;
        });
    }

    /// True while an edit is waiting for its quiet period
    pub async fn has_pending(&self, id: &str) -> bool {
        self.pending.lock().await.contains_key(id)
    }

    async fn flush_if_latest(&self, id: &str, generation: u64) {
        let node_lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _in_flight = node_lock.lock().await;

        // A newer edit re-armed the timer; its sleeper carries the save.
        {
            let pending = self.pending.lock().await;
            if pending.get(id) != Some(&generation) {
                return;
            }
        }

        let snapshot = {
            let state = self.state.lock().await;
            state
                .node(id)
                .map(|node| (node.content.clone(), node.version_time))
        };
        let Some((content, version_time)) = snapshot else {
            // Node vanished locally (deleted mid-debounce); nothing to save
            self.clear_pending(id, generation).await;
            return;
        };

        let result = self
            .store
            .update_node_content(id, &content, version_time)
            .await;

        // Pending clears regardless of the outcome
        self.clear_pending(id, generation).await;

        match result {
            Ok(parsed_info) => {
                {
                    let mut state = self.state.lock().await;
                    state.set_parsed_info(id, parsed_info.clone());
                }
                let _ = self.event_tx.send(TreeEvent::ContentSaved {
                    id: id.to_string(),
                    parsed_info,
                });
            }
            Err(err) => {
                tracing::error!(node_id = %id, error = %err, "content save failed, keeping local edit");
                let _ = self.event_tx.send(TreeEvent::SyncFailed {
                    id: id.to_string(),
                    operation: "update-node-content",
                });
            }
        }
    }

    async fn clear_pending(&self, id: &str, generation: u64) {
        let mut pending = self.pending.lock().await;
        if pending.get(id) == Some(&generation) {
            pending.remove(id);
        }
    }
}
