//! Tree Reconciliation
//!
//! Pure functions between the store's flat node records and the nested forest
//! the UI renders:
//!
//! - [`arrange`] - flat set to forest via `parent_id` resolution
//! - [`sibling`] - display order from the `prev_sliding_id` chain, plus
//!   insert-position derivation for writers

pub mod arrange;
pub mod sibling;

pub use arrange::{arrange_nodes, arrange_ordered};
pub use sibling::{chain_order, prev_sliding_for_insert, sort_by_sibling_chain};
