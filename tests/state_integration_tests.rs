//! Integration tests for StateManager with state change events
//!
//! These tests verify that the StateManager correctly:
//! - Emits state change events on mutations
//! - Supports multiple subscribers
//! - Handles concurrent access from multiple tasks
//! - Keeps clones pointed at the same underlying state

use std::sync::Arc;

use loadstone::models::LoadOrderEntry;
use loadstone::{StateChange, StateManager};
use tokio::time::{Duration, timeout};

fn order_of(ids: &[&str]) -> Vec<LoadOrderEntry> {
    ids.iter().map(|id| LoadOrderEntry::new(*id)).collect()
}

#[tokio::test]
async fn test_load_order_replacement_emits_event() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    state.replace_load_order("profile-1", order_of(&["skyui", "dragonui"]));

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");

    match event {
        StateChange::LoadOrderReplaced {
            profile_id,
            entries,
        } => {
            assert_eq!(profile_id, "profile-1");
            assert_eq!(entries, vec!["skyui", "dragonui"]);
        }
        other => panic!("Expected LoadOrderReplaced, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let state = Arc::new(StateManager::new());
    let mut rx1 = state.subscribe();
    let mut rx2 = state.subscribe();
    let mut rx3 = state.subscribe();

    state.set_active_game(Some("skyrimse".to_string()));

    for rx in [&mut rx1, &mut rx2, &mut rx3] {
        let event = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout")
            .expect("Channel closed");
        assert!(matches!(event, StateChange::ActiveGameChanged { .. }));
    }
}

#[tokio::test]
async fn test_profile_switch_clears_old_order() {
    let state = Arc::new(StateManager::new());
    state.replace_load_order("profile-1", order_of(&["skyui"]));

    let mut rx = state.subscribe();
    let changes = state.update(|s| {
        s.load_orders.remove("profile-1");
        s.load_orders
            .insert("profile-2".to_string(), order_of(&["dragonui"]));
    });

    assert_eq!(changes.len(), 2);
    assert!(changes.iter().any(|c| matches!(
        c,
        StateChange::LoadOrderCleared { profile_id } if profile_id == "profile-1"
    )));
    assert!(changes.iter().any(|c| matches!(
        c,
        StateChange::LoadOrderReplaced { profile_id, .. } if profile_id == "profile-2"
    )));

    // Both events also went out over the channel.
    for _ in 0..2 {
        timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout")
            .expect("Channel closed");
    }
}

#[tokio::test]
async fn test_concurrent_updates_from_tasks() {
    let state = Arc::new(StateManager::new());

    let mut handles = Vec::new();
    for i in 0..8 {
        let state = Arc::clone(&state);
        handles.push(tokio::spawn(async move {
            state.replace_load_order(&format!("profile-{i}"), order_of(&["skyui"]));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(state.snapshot().load_orders.len(), 8);
}

#[tokio::test]
async fn test_clones_share_underlying_state() {
    let state = StateManager::new();
    let clone = state.clone();
    let mut rx = clone.subscribe();

    state.note_userlist_reset();

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout")
        .expect("Channel closed");
    assert_eq!(event, StateChange::UserlistReset);
    assert_eq!(clone.snapshot().userlist_generation, 1);
}

#[tokio::test]
async fn test_lagged_subscriber_still_sees_current_state() {
    let state = Arc::new(StateManager::new());
    let rx = state.subscribe();
    drop(rx); // No active listener; sends must not error the updater.

    for i in 0..10 {
        state.set_active_game(Some(format!("game-{i}")));
    }

    assert_eq!(state.snapshot().active_game.as_deref(), Some("game-9"));
}
