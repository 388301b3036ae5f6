use std::collections::HashMap;

use indexmap::IndexMap;
use thiserror::Error;

use super::adapter::GameAdapter;
use super::reference::ReferenceMatcher;
use crate::models::{
    LoadOrder, MalformedValidationResult, ModInfo, ValidationFailure, ValidationOutcome,
    entry_names,
};

/// Errors from load order operations.
#[derive(Debug, Error)]
pub enum LoadOrderError {
    /// The candidate order was rejected by game-specific rules. Recoverable;
    /// surfaced to the user with per-entry detail.
    #[error("load order failed validation ({} invalid entries)", invalid.len())]
    Validation {
        invalid: Vec<ValidationFailure>,
        /// Display names of the attempted order, for diagnostics.
        attempted: Vec<String>,
    },

    /// The external order representation could not be read or written.
    /// Recoverable; `attempted` is empty when the failure was on the read
    /// side.
    #[error("failed to serialize load order: {reason}")]
    Serialization {
        reason: String,
        attempted: Vec<String>,
    },

    /// The adapter's validation result did not conform to the contract.
    /// An integration defect, raised immediately.
    #[error(transparent)]
    MalformedValidation(#[from] MalformedValidationResult),

    /// Unclassified load order operation failure.
    #[error("load order operation failed: {0}")]
    Other(#[from] anyhow::Error),
}

impl LoadOrderError {
    /// Serialization failure on the read side, before any order exists.
    pub fn serialization<S: Into<String>>(reason: S) -> Self {
        Self::Serialization {
            reason: reason.into(),
            attempted: Vec::new(),
        }
    }
}

/// A mod is usable in a load order when it is known to the registry and is
/// not itself a collection.
pub fn is_valid_mod(info: Option<&ModInfo>) -> bool {
    info.is_some_and(|info| !info.is_collection())
}

/// Whether one of the collection's rules references the candidate mod, under
/// the given matcher.
pub fn is_mod_in_collection<M: ReferenceMatcher>(
    collection: &ModInfo,
    candidate: &ModInfo,
    matcher: &M,
) -> bool {
    collection
        .rules
        .iter()
        .any(|rule| matcher.matches(candidate, &rule.reference))
}

/// Produce a validated load order for a profile, optionally restricted to a
/// collection's members.
///
/// Deserializes the current external order through the adapter, drops entries
/// whose mod is unknown or is a collection (and, when `collection` is given,
/// entries not referenced by its rules), then asks the adapter to validate
/// the result against the previously persisted order for `profile_id`
/// (defaulting to empty). Relative order of surviving entries is preserved.
///
/// Pure read + compute: nothing here mutates shared state. `previous_orders`
/// is a snapshot of the caller-owned per-profile orders (see
/// [`crate::state::StateManager`]); the caller also owns persisting the
/// returned order.
///
/// # Errors
///
/// [`LoadOrderError::Validation`] when the adapter rejects the candidate,
/// [`LoadOrderError::Serialization`] when it cannot read the external
/// representation, [`LoadOrderError::MalformedValidation`] when its result
/// violates the contract.
pub async fn generate_load_order<A, M>(
    adapter: &A,
    mods: &IndexMap<String, ModInfo>,
    previous_orders: &HashMap<String, LoadOrder>,
    profile_id: &str,
    collection: Option<&ModInfo>,
    matcher: &M,
) -> Result<LoadOrder, LoadOrderError>
where
    A: GameAdapter,
    M: ReferenceMatcher,
{
    let prev = previous_orders.get(profile_id).cloned().unwrap_or_default();

    let deserialized = adapter.deserialize_load_order().await?;
    let filtered: LoadOrder = deserialized
        .into_iter()
        .filter(|entry| {
            let info = mods.get(&entry.mod_id);
            if !is_valid_mod(info) {
                return false;
            }
            let Some(info) = info else { return false };
            collection.is_none_or(|collection| is_mod_in_collection(collection, info, matcher))
        })
        .collect();

    tracing::debug!(
        game = adapter.game_id(),
        profile = profile_id,
        entries = filtered.len(),
        "validating candidate load order"
    );

    let raw = adapter.validate(&prev, &filtered).await?;
    match ValidationOutcome::from_raw(raw)? {
        ValidationOutcome::Valid => Ok(filtered),
        ValidationOutcome::Invalid(invalid) => Err(LoadOrderError::Validation {
            invalid,
            attempted: entry_names(&filtered),
        }),
    }
}

/// Validate a candidate order against the previous one and, if it passes,
/// write it back through the adapter.
///
/// The caller keeps the canonical copy; this only pushes the external
/// representation.
pub async fn apply_load_order<A: GameAdapter>(
    adapter: &A,
    prev: &LoadOrder,
    candidate: &LoadOrder,
) -> Result<(), LoadOrderError> {
    let raw = adapter.validate(prev, candidate).await?;
    match ValidationOutcome::from_raw(raw)? {
        ValidationOutcome::Valid => {}
        ValidationOutcome::Invalid(invalid) => {
            return Err(LoadOrderError::Validation {
                invalid,
                attempted: entry_names(candidate),
            });
        }
    }

    adapter.serialize_load_order(candidate).await?;
    tracing::info!(
        game = adapter.game_id(),
        entries = candidate.len(),
        "load order written"
    );
    Ok(())
}
