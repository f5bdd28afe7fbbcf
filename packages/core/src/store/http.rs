//! HTTP Store - REST Backend
//!
//! [`HttpStore`] talks to the node server's REST API: JSON bodies on
//! `api/...` routes, multipart for uploads. It is a direct mapping of the
//! [`NodeStore`] wire contract; nothing here retries or caches.

use crate::models::{Asset, ContentParsedInfo, Node};
use crate::store::error::StoreError;
use crate::store::node_store::{
    DeleteNodeRequest, MoveNodeRequest, NodeSelector, NodeStore, UpdateContentRequest,
    UpdateNameRequest, UpdateReadonlyRequest,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Connection settings for [`HttpStore`]
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Base URL up to and including the API prefix, e.g.
    /// `http://127.0.0.1:3011/api`
    pub base_url: String,

    /// Client-level request timeout
    pub timeout: Duration,
}

impl HttpStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3011/api".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// REST-backed [`NodeStore`] implementation
pub struct HttpStore {
    client: reqwest::Client,
    config: HttpStoreConfig,
}

impl HttpStore {
    /// Create a store against the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Request` if the underlying HTTP client cannot be
    /// constructed (bad TLS backend, invalid configuration).
    pub fn new(config: HttpStoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| StoreError::request(err.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode_json(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode_json(response).await
    }

    /// POST whose response body carries no information (move, delete acks)
    async fn post_acked<B: Serialize>(&self, path: &str, body: &B) -> Result<(), StoreError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(StoreError::status(status.as_u16(), message))
    }
}

#[async_trait]
impl NodeStore for HttpStore {
    async fn fetch_all_nodes(&self) -> Result<Vec<Node>, StoreError> {
        self.get_json("fetch-all-nodes").await
    }

    async fn fetch_nodes(&self, selector: NodeSelector) -> Result<Vec<Node>, StoreError> {
        self.post_json("fetch-nodes", &selector).await
    }

    async fn insert_node(&self, node: &Node) -> Result<ContentParsedInfo, StoreError> {
        self.post_json("insert-node", node).await
    }

    async fn insert_node_only(&self, node: &Node) -> Result<ContentParsedInfo, StoreError> {
        self.post_json("insert-node-only", node).await
    }

    async fn update_node_content(
        &self,
        id: &str,
        content: &str,
        version_time: DateTime<Utc>,
    ) -> Result<ContentParsedInfo, StoreError> {
        let request = UpdateContentRequest {
            id: id.to_string(),
            content: content.to_string(),
            version_time,
        };
        self.post_json("update-node-content", &request).await
    }

    async fn update_node_name(&self, id: &str, name: &str) -> Result<u64, StoreError> {
        let request = UpdateNameRequest {
            id: id.to_string(),
            name: name.to_string(),
        };
        self.post_json("update-node-name", &request).await
    }

    async fn update_node_readonly(&self, id: &str, readonly: bool) -> Result<u64, StoreError> {
        let request = UpdateReadonlyRequest {
            id: id.to_string(),
            readonly,
        };
        self.post_json("update-node-readonly", &request).await
    }

    async fn move_node(
        &self,
        id: &str,
        parent_id: Option<&str>,
        prev_sliding_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let request = MoveNodeRequest {
            id: id.to_string(),
            parent_id: parent_id.map(str::to_string),
            prev_sliding_id: prev_sliding_id.map(str::to_string),
        };
        self.post_acked("move-node", &request).await
    }

    async fn delete_node(&self, id: &str) -> Result<(), StoreError> {
        let request = DeleteNodeRequest { id: id.to_string() };
        self.post_acked("delete-node", &request).await
    }

    async fn upload_asset(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Asset, StoreError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|err| StoreError::request(err.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("upload"))
            .multipart(form)
            .send()
            .await?;
        let assets: Vec<Asset> = Self::decode_json(response).await?;

        assets
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::decode("upload returned an empty asset list"))
    }
}
