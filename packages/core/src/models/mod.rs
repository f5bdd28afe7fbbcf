//! Data Models
//!
//! Core data structures shared across the crate:
//!
//! - [`Node`] - a single note with content, name, and tree placement
//! - [`ContentParsedInfo`] - server-derived metadata from content saves
//! - [`Asset`] - uploaded file descriptor

pub mod asset;
pub mod node;

pub use asset::Asset;
pub use node::{ContentParsedInfo, Node, NodeId, NodeTag, NodeType, ValidationError};
