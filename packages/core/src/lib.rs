//! Knotree Core
//!
//! Client-side core for an outliner: a tree of hierarchical notes backed by
//! a remote HTTP store, kept responsive through optimistic local state.
//!
//! # Architecture
//!
//! - **Flat records, derived forest**: the store holds nodes with parent and
//!   previous-sibling pointers; the reconciler builds the display tree
//! - **Optimistic sync**: user actions mutate the local tree first and
//!   persist asynchronously; failures are logged, not rolled back
//! - **Debounced saves**: content edit streams coalesce into one save per
//!   quiet period
//!
//! # Modules
//!
//! - [`models`] - data structures (Node, Asset, parsed content metadata)
//! - [`tree`] - reconciliation and sibling-order functions
//! - [`store`] - remote store trait with HTTP and in-memory backends
//! - [`services`] - view-state, optimistic sync, autosave, events

pub mod models;
pub mod services;
pub mod store;
pub mod tree;

// Re-export commonly used types
pub use models::*;
pub use services::*;
pub use store::{HttpStore, HttpStoreConfig, MemoryStore, NodeSelector, NodeStore, StoreError};
pub use tree::{arrange_nodes, arrange_ordered};
