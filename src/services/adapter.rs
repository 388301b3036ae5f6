use serde_json::Value;

use super::load_order::LoadOrderError;
use crate::models::LoadOrder;

/// Per-game extension point supplying (de)serialization and validation of
/// load orders.
///
/// Adapters own the external representation (a plugins.txt, an ini section,
/// whatever the game uses) and the game's ordering rules. The core never
/// touches that representation directly.
///
/// Adapters must eventually settle every returned future; the core imposes
/// no timeout on them.
pub trait GameAdapter: Send + Sync {
    /// Identifier of the game this adapter manages (e.g. `"skyrimse"`).
    fn game_id(&self) -> &str;

    /// Whether this adapter is community-contributed. Failures from
    /// contributed adapters are shown to the user but never auto-reported
    /// upstream.
    fn is_contributed(&self) -> bool;

    /// Load the current external order into the core representation.
    ///
    /// Fails with [`LoadOrderError::Serialization`] when the external
    /// representation cannot be parsed.
    fn deserialize_load_order(
        &self,
    ) -> impl Future<Output = Result<LoadOrder, LoadOrderError>> + Send;

    /// Write an order back to the external representation.
    fn serialize_load_order(
        &self,
        order: &LoadOrder,
    ) -> impl Future<Output = Result<(), LoadOrderError>> + Send;

    /// Check a candidate order against the game's rules, given the
    /// previously accepted order for context.
    ///
    /// The result is deliberately loose, since adapters are pluggable and often
    /// third-party, and is checked by the core immediately on receipt:
    /// `None` means valid, anything else must be an object with a non-empty
    /// `invalid` list. See
    /// [`ValidationOutcome::from_raw`](crate::models::ValidationOutcome::from_raw).
    fn validate(
        &self,
        prev: &LoadOrder,
        candidate: &LoadOrder,
    ) -> impl Future<Output = Result<Option<Value>, LoadOrderError>> + Send;
}
