//! Remote Store Layer
//!
//! Thin data access over the node server:
//!
//! - [`NodeStore`] - the operation contract, one method per wire operation
//! - [`HttpStore`] - REST backend (the canonical store)
//! - [`MemoryStore`] - in-process backend for tests and offline hosts
//!
//! The store layer carries no policy: no retries, no caching, no optimistic
//! state. Failures surface as [`StoreError`] and the service layer decides
//! what to do with them.

mod error;
mod http;
mod memory;
mod node_store;

pub use error::StoreError;
pub use http::{HttpStore, HttpStoreConfig};
pub use memory::MemoryStore;
pub use node_store::{
    DeleteNodeRequest, MoveNodeRequest, NodeFilter, NodeSelector, NodeStore, UpdateContentRequest,
    UpdateNameRequest, UpdateReadonlyRequest,
};
