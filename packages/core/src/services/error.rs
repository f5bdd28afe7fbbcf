//! Service Layer Error Types

use crate::models::ValidationError;
use crate::store::StoreError;
use thiserror::Error;

/// Outline operation errors
///
/// High-level errors for view-state operations, with proper chaining from
/// the store and model layers. Background persistence failures never show up
/// here; they are logged and emitted as sync-failure events instead.
#[derive(Error, Debug)]
pub enum OutlineError {
    /// Node not found in the local tree
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    /// Content edits are rejected while the edit lock is set
    #[error("Node is read-only: {id}")]
    ReadOnly { id: String },

    /// Move would make a node its own ancestor
    #[error("Move would create a cycle: {context}")]
    CircularMove { context: String },

    /// Node validation failed
    #[error("Node validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Store operation failed (load and fetch paths only)
    #[error("Store operation failed: {0}")]
    StoreFailed(#[from] StoreError),
}

impl OutlineError {
    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create a read-only error
    pub fn read_only(id: impl Into<String>) -> Self {
        Self::ReadOnly { id: id.into() }
    }

    /// Create a circular move error
    pub fn circular_move(context: impl Into<String>) -> Self {
        Self::CircularMove {
            context: context.into(),
        }
    }
}
