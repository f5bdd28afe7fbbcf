//! End-to-end outline flow tests
//!
//! Drives the public API the way a UI host would: load the tree, create and
//! rearrange nodes, edit content through the debounced autosaver, and verify
//! the store converges on the same structure the local state shows.

use knotree_core::models::Node;
use knotree_core::services::{OutlineService, TreeEvent};
use knotree_core::store::{MemoryStore, StoreError};
use std::sync::Arc;
use std::time::Duration;

fn seed() -> Vec<Node> {
    vec![
        Node::new_with_id("home".to_string(), "home".to_string(), None, None),
        Node::new_with_id(
            "work".to_string(),
            "work".to_string(),
            None,
            Some("home".to_string()),
        ),
        Node::new_with_id(
            "todo".to_string(),
            "todo".to_string(),
            Some("home".to_string()),
            None,
        ),
    ]
}

fn ids(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(|node| node.id.as_str()).collect()
}

#[tokio::test]
async fn full_session_converges_local_and_remote() {
    let store = Arc::new(MemoryStore::with_nodes(seed()));
    let service = OutlineService::new(store.clone());

    assert_eq!(service.load().await.unwrap(), 3);
    let forest = service.forest().await;
    assert_eq!(ids(&forest), ["home", "work"]);

    // New sibling between the two roots
    let note = service.create_node(None, 1, "journal").await.unwrap();
    assert_eq!(note.prev_sliding_id.as_deref(), Some("home"));

    // Drag it under "work"
    let moved = service.move_node(&note.id, Some("work"), 0).await.unwrap();
    assert_eq!(moved.parent_id.as_deref(), Some("work"));
    assert!(moved.prev_sliding_id.is_none());

    service.rename_node(&note.id, "daily journal").await.unwrap();

    // Remote caught up with every structural change
    let remote = store.node(&note.id).await.unwrap();
    assert_eq!(remote.parent_id.as_deref(), Some("work"));
    assert_eq!(remote.name, "daily journal");

    // A fresh client loading from the same store sees the same forest
    let other = OutlineService::new(store.clone());
    other.load().await.unwrap();
    assert_eq!(service.forest().await, other.forest().await);
}

#[tokio::test(start_paused = true)]
async fn content_edits_reach_the_store_once_per_quiet_period() {
    let store = Arc::new(MemoryStore::with_nodes(seed()));
    let service = OutlineService::new(store.clone());
    service.load().await.unwrap();

    for draft in ["d", "dr", "dra", "draft"] {
        service.edited_content("todo", draft).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(store.node("todo").await.unwrap().content, "draft");
    let save_calls = store
        .recorded_ops()
        .await
        .into_iter()
        .filter(|op| op.starts_with("update-node-content"))
        .count();
    assert_eq!(save_calls, 1);
}

#[tokio::test]
async fn offline_actions_keep_the_local_tree_usable() {
    let store = Arc::new(MemoryStore::with_nodes(seed()));
    let service = OutlineService::new(store.clone());
    service.load().await.unwrap();
    let mut events = service.subscribe();

    // Every structural call fails at the store
    for _ in 0..3 {
        store.inject_failure(StoreError::request("offline")).await;
    }

    let note = service.create_node(Some("home"), 0, "offline").await.unwrap();
    service.move_node("todo", None, 0).await.unwrap();
    service.delete_node("work").await.unwrap();

    // Local tree reflects all three actions
    let forest = service.forest().await;
    assert_eq!(ids(&forest), ["todo", "home"]);
    assert!(service.node(&note.id).await.is_some());

    // Remote saw none of them
    assert!(store.node(&note.id).await.is_none());
    assert!(store.node("work").await.is_some());
    assert_eq!(
        store.node("todo").await.unwrap().parent_id.as_deref(),
        Some("home")
    );

    // Each failure was surfaced as an event
    let mut failures = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, TreeEvent::SyncFailed { .. }) {
            failures += 1;
        }
    }
    assert_eq!(failures, 3);
}

#[tokio::test]
async fn deleted_sibling_leaves_survivor_first_on_reload() {
    // "work" chains after "home"; delete "home" and the dangling pointer
    // must read as "first child" instead of dropping "work"
    let store = Arc::new(MemoryStore::with_nodes(seed()));
    let service = OutlineService::new(store.clone());
    service.load().await.unwrap();

    service.delete_node("home").await.unwrap();

    let other = OutlineService::new(store.clone());
    other.load().await.unwrap();
    let forest = other.forest().await;
    assert_eq!(ids(&forest), ["work"]);
}
