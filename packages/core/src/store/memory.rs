//! Memory Store - In-Process Backend
//!
//! [`MemoryStore`] keeps the node map behind a mutex and implements the same
//! [`NodeStore`] contract as the REST backend. Service tests run against it,
//! and it doubles as an offline backend for embedding hosts.
//!
//! Test support: operations are recorded, and errors can be queued with
//! [`MemoryStore::inject_failure`] to script the next calls' outcomes.

use crate::models::{Asset, ContentParsedInfo, Node, NodeId};
use crate::store::error::StoreError;
use crate::store::node_store::{NodeFilter, NodeSelector, NodeStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    nodes: HashMap<NodeId, Node>,
    failures: VecDeque<StoreError>,
    ops: Vec<String>,
}

/// In-process [`NodeStore`] implementation
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with flat records
    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        let mut records = HashMap::with_capacity(nodes.len());
        for mut node in nodes {
            node.children.clear();
            records.insert(node.id.clone(), node);
        }
        Self {
            inner: Mutex::new(Inner {
                nodes: records,
                ..Inner::default()
            }),
        }
    }

    /// Queue an error; each queued error fails exactly one upcoming call
    pub async fn inject_failure(&self, err: StoreError) {
        self.inner.lock().await.failures.push_back(err);
    }

    /// Current record for a node, if any
    pub async fn node(&self, id: &str) -> Option<Node> {
        self.inner.lock().await.nodes.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.nodes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.nodes.is_empty()
    }

    /// Operations seen so far, as `"<op> <id>"` strings
    pub async fn recorded_ops(&self) -> Vec<String> {
        self.inner.lock().await.ops.clone()
    }

    fn begin(inner: &mut Inner, op: String) -> Result<(), StoreError> {
        inner.ops.push(op);
        match inner.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn descendants(nodes: &HashMap<NodeId, Node>, id: &str) -> Vec<NodeId> {
        let mut collected = Vec::new();
        let mut frontier = vec![id.to_string()];
        while let Some(current) = frontier.pop() {
            for node in nodes.values() {
                if node.parent_id.as_deref() == Some(current.as_str()) {
                    frontier.push(node.id.clone());
                    collected.push(node.id.clone());
                }
            }
        }
        collected
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn fetch_all_nodes(&self) -> Result<Vec<Node>, StoreError> {
        let mut inner = self.inner.lock().await;
        Self::begin(&mut inner, "fetch-all-nodes".to_string())?;
        Ok(inner.nodes.values().cloned().collect())
    }

    async fn fetch_nodes(&self, selector: NodeSelector) -> Result<Vec<Node>, StoreError> {
        let mut inner = self.inner.lock().await;
        Self::begin(&mut inner, format!("fetch-nodes {:?}", selector.filter))?;

        let nodes = match &selector.filter {
            NodeFilter::Id(id) => inner.nodes.get(id).cloned().into_iter().collect(),
            NodeFilter::Like(query) => inner
                .nodes
                .values()
                .filter(|node| node.name.contains(query.as_str()) || node.content.contains(query.as_str()))
                .cloned()
                .collect(),
        };
        Ok(nodes)
    }

    async fn insert_node(&self, node: &Node) -> Result<ContentParsedInfo, StoreError> {
        let mut inner = self.inner.lock().await;
        Self::begin(&mut inner, format!("insert-node {}", node.id))?;

        let mut record = node.clone();
        record.children.clear();
        let parsed_info = record.parsed_info.clone();
        inner.nodes.insert(record.id.clone(), record);
        Ok(parsed_info)
    }

    async fn insert_node_only(&self, node: &Node) -> Result<ContentParsedInfo, StoreError> {
        let mut inner = self.inner.lock().await;
        Self::begin(&mut inner, format!("insert-node-only {}", node.id))?;

        let mut record = node.clone();
        record.children.clear();
        // Payload-only upsert keeps existing placement
        if let Some(existing) = inner.nodes.get(&record.id) {
            record.parent_id = existing.parent_id.clone();
            record.prev_sliding_id = existing.prev_sliding_id.clone();
        }
        let parsed_info = record.parsed_info.clone();
        inner.nodes.insert(record.id.clone(), record);
        Ok(parsed_info)
    }

    async fn update_node_content(
        &self,
        id: &str,
        content: &str,
        version_time: DateTime<Utc>,
    ) -> Result<ContentParsedInfo, StoreError> {
        let mut inner = self.inner.lock().await;
        Self::begin(&mut inner, format!("update-node-content {}", id))?;

        let node = inner
            .nodes
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id))?;
        node.content = content.to_string();
        node.version_time = version_time;
        Ok(node.parsed_info.clone())
    }

    async fn update_node_name(&self, id: &str, name: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        Self::begin(&mut inner, format!("update-node-name {}", id))?;

        match inner.nodes.get_mut(id) {
            Some(node) => {
                node.name = name.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_node_readonly(&self, id: &str, readonly: bool) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        Self::begin(&mut inner, format!("update-node-readonly {}", id))?;

        match inner.nodes.get_mut(id) {
            Some(node) => {
                node.readonly = readonly;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn move_node(
        &self,
        id: &str,
        parent_id: Option<&str>,
        prev_sliding_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        Self::begin(&mut inner, format!("move-node {}", id))?;

        let node = inner
            .nodes
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id))?;
        node.parent_id = parent_id.map(str::to_string);
        node.prev_sliding_id = prev_sliding_id.map(str::to_string);
        Ok(())
    }

    async fn delete_node(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        Self::begin(&mut inner, format!("delete-node {}", id))?;

        let descendants = Self::descendants(&inner.nodes, id);
        inner.nodes.remove(id);
        for descendant in descendants {
            inner.nodes.remove(&descendant);
        }
        Ok(())
    }

    async fn upload_asset(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Asset, StoreError> {
        let mut inner = self.inner.lock().await;
        Self::begin(
            &mut inner,
            format!("upload {} ({} bytes)", file_name, bytes.len()),
        )?;

        Ok(Asset {
            id: Uuid::new_v4().to_string(),
            domain: None,
            ori_file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            create_time: Utc::now(),
        })
    }
}
