//! Data models for the Loadstone core.
//!
//! This module contains the data structures shared across the crate:
//! - [`LoadOrderEntry`] / [`LoadOrder`]: the ordered sequence of manageable items
//! - [`ValidationOutcome`] / [`ValidationFailure`]: checked results from game adapters
//! - [`ModInfo`] / [`ReferenceDescriptor`]: the mod registry contract supplied by callers
//! - [`UserlistDocument`] / [`UserlistRule`]: the persisted rule-override document
//! - [`AppSettings`]: host settings loaded from `Loadstone.yaml`
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: everything derives `Serialize`/`Deserialize`; the userlist
//!   persists as YAML, the key-value transport form is JSON
//! - **Owned by the caller**: the core reads registries and load orders but the
//!   canonical copies live with the host (see [`crate::state::StateManager`])
//! - **Complete**: a [`UserlistDocument`] is never partially constructed; writes
//!   always serialize the whole document

pub mod load_order;
pub mod mods;
pub mod settings;
pub mod userlist;

pub use load_order::{
    LoadOrder, LoadOrderEntry, MalformedValidationResult, ValidationFailure, ValidationOutcome,
    entry_names,
};
pub use mods::{COLLECTION_TYPE, ModInfo, ModRule, ReferenceDescriptor};
pub use settings::{AppSettings, SettingsData};
pub use userlist::{UserlistDocument, UserlistRule};
