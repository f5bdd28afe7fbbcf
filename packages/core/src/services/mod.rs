//! Business Services
//!
//! This module contains the coordination layer over the tree and store:
//!
//! - `OutlineService` - local tree ownership and optimistic sync
//! - `TreeState` - the in-memory view-state cache
//! - `ContentAutosaver` - debounced content persistence
//! - `TreeEvent` - broadcast notifications for UI layers
//!
//! Services own all policy: what is optimistic, what is confirm-then-apply,
//! and what happens when the store misbehaves.

pub mod autosave;
pub mod error;
pub mod events;
pub mod outline_service;
pub mod tree_state;

pub use autosave::{AutosaveConfig, ContentAutosaver};
pub use error::OutlineError;
pub use events::{TreeEvent, TREE_EVENT_CHANNEL_CAPACITY};
pub use outline_service::OutlineService;
pub use tree_state::TreeState;
