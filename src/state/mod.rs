// Session state management
//
// Wraps the shared application state in Arc<RwLock<T>> and emits change
// events over a broadcast channel so host surfaces can react without polling.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use crate::models::{LoadOrder, entry_names};

/// Change events emitted when session state is modified.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The managed game changed (or was deselected).
    ActiveGameChanged { game_id: Option<String> },

    /// A profile's load order was replaced wholesale.
    LoadOrderReplaced {
        profile_id: String,
        entries: Vec<String>,
    },

    /// A profile's load order was discarded (profile disabled or switched).
    LoadOrderCleared { profile_id: String },

    /// The userlist document was replaced out-of-band (loaded from disk or
    /// reset on deactivation); dependent surfaces should refresh.
    UserlistReset,
}

/// Shared application state the core reads and the host owns.
///
/// `load_orders` holds the canonical per-profile orders - the "previous
/// order" context [`generate_load_order`](crate::services::generate_load_order)
/// validates against. Orders are replaced wholesale, never patched in place.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub active_game: Option<String>,
    pub load_orders: HashMap<String, LoadOrder>,
    /// Bumped whenever the persisted userlist is replaced out-of-band.
    pub userlist_generation: u64,
}

/// Thread-safe state manager with event emission.
///
/// Always go through this instead of holding [`SessionState`] directly:
/// [`read()`](Self::read) for queries, [`update()`](Self::update) for
/// mutations with automatic event emission, [`subscribe()`](Self::subscribe)
/// to listen for changes.
pub struct StateManager {
    state: Arc<RwLock<SessionState>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events.
    ///
    /// Captures the old state, applies `update_fn`, diffs, and broadcasts
    /// one event per detected change. Returns the emitted events.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut SessionState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = detect_changes(&old_state, &state);
        drop(state);

        for change in &changes {
            // It's fine if no one is listening.
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    // Convenience methods for common updates

    pub fn set_active_game(&self, game_id: Option<String>) -> Vec<StateChange> {
        self.update(|state| {
            state.active_game = game_id.clone();
        })
    }

    /// Replace a profile's load order wholesale.
    pub fn replace_load_order(&self, profile_id: &str, order: LoadOrder) -> Vec<StateChange> {
        self.update(|state| {
            state.load_orders.insert(profile_id.to_string(), order.clone());
        })
    }

    /// Discard a profile's load order, e.g. when the profile is disabled.
    pub fn clear_load_order(&self, profile_id: &str) -> Vec<StateChange> {
        self.update(|state| {
            state.load_orders.remove(profile_id);
        })
    }

    /// Record an out-of-band userlist replacement. Wire this to
    /// [`UserlistPersistor::on_reset`](crate::persist::UserlistPersistor::on_reset).
    pub fn note_userlist_reset(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.userlist_generation += 1;
        })
    }
}

/// Diff two states and produce the events to emit.
fn detect_changes(old: &SessionState, new: &SessionState) -> Vec<StateChange> {
    let mut changes = Vec::new();

    if old.active_game != new.active_game {
        changes.push(StateChange::ActiveGameChanged {
            game_id: new.active_game.clone(),
        });
    }

    for (profile_id, order) in &new.load_orders {
        if old.load_orders.get(profile_id) != Some(order) {
            changes.push(StateChange::LoadOrderReplaced {
                profile_id: profile_id.clone(),
                entries: entry_names(order),
            });
        }
    }

    for profile_id in old.load_orders.keys() {
        if !new.load_orders.contains_key(profile_id) {
            changes.push(StateChange::LoadOrderCleared {
                profile_id: profile_id.clone(),
            });
        }
    }

    if old.userlist_generation != new.userlist_generation {
        changes.push(StateChange::UserlistReset);
    }

    changes
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Cloneable for sharing across tasks; clones share the same state.
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoadOrderEntry;

    fn order_of(ids: &[&str]) -> LoadOrder {
        ids.iter().map(|id| LoadOrderEntry::new(*id)).collect()
    }

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert!(state.active_game.is_none());
        assert!(state.load_orders.is_empty());
        assert_eq!(state.userlist_generation, 0);
    }

    #[test]
    fn test_replace_load_order_emits_event() {
        let manager = StateManager::new();

        let changes = manager.replace_load_order("profile-1", order_of(&["skyui", "dragonui"]));

        assert_eq!(changes.len(), 1);
        match &changes[0] {
            StateChange::LoadOrderReplaced {
                profile_id,
                entries,
            } => {
                assert_eq!(profile_id, "profile-1");
                assert_eq!(entries, &["skyui", "dragonui"]);
            }
            other => panic!("Expected LoadOrderReplaced, got: {:?}", other),
        }
    }

    #[test]
    fn test_replacing_with_same_order_is_silent() {
        let manager = StateManager::new();
        manager.replace_load_order("profile-1", order_of(&["skyui"]));

        let changes = manager.replace_load_order("profile-1", order_of(&["skyui"]));
        assert!(changes.is_empty());
    }

    #[test]
    fn test_clear_load_order() {
        let manager = StateManager::new();
        manager.replace_load_order("profile-1", order_of(&["skyui"]));

        let changes = manager.clear_load_order("profile-1");

        assert_eq!(
            changes,
            vec![StateChange::LoadOrderCleared {
                profile_id: "profile-1".to_string()
            }]
        );
        assert!(manager.snapshot().load_orders.is_empty());
    }

    #[test]
    fn test_active_game_change_detection() {
        let manager = StateManager::new();

        let changes = manager.set_active_game(Some("skyrimse".to_string()));
        assert_eq!(
            changes,
            vec![StateChange::ActiveGameChanged {
                game_id: Some("skyrimse".to_string())
            }]
        );

        // No change, no event.
        assert!(manager.set_active_game(Some("skyrimse".to_string())).is_empty());
    }

    #[test]
    fn test_userlist_reset_bumps_generation() {
        let manager = StateManager::new();

        let changes = manager.note_userlist_reset();

        assert_eq!(changes, vec![StateChange::UserlistReset]);
        assert_eq!(manager.snapshot().userlist_generation, 1);
    }

    #[test]
    fn test_subscribe_receives_changes() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        manager.replace_load_order("profile-1", order_of(&["skyui"]));

        let event = rx.try_recv().unwrap();
        assert!(matches!(event, StateChange::LoadOrderReplaced { .. }));
    }

    #[test]
    fn test_clone_shares_state() {
        let manager = StateManager::new();
        let clone = manager.clone();

        manager.set_active_game(Some("skyrimse".to_string()));

        assert_eq!(
            clone.snapshot().active_game.as_deref(),
            Some("skyrimse")
        );
    }

    #[test]
    fn test_read_with_closure() {
        let manager = StateManager::new();
        manager.replace_load_order("profile-1", order_of(&["skyui"]));

        let len = manager.read(|state| state.load_orders["profile-1"].len());
        assert_eq!(len, 1);
    }
}
