//! Services module - Pure business logic for load order management.
//!
//! Everything here is **framework-agnostic**: no GUI types, no global state,
//! all inputs are explicit parameters. The host shell composes these pieces
//! and renders whatever they return.
//!
//! # Components
//!
//! - [`GameAdapter`]: the per-game extension point supplying load order
//!   (de)serialization and validation
//! - [`generate_load_order`] / [`apply_load_order`]: the orchestrator -
//!   deserialize, filter against the mod registry (and optionally a
//!   collection's membership rules), validate, classify failures
//! - [`ReferenceMatcher`] / [`FuzzyMatcher`]: the injected predicate for
//!   matching a mod against a collection rule's reference descriptor
//! - [`ErrorReporter`]: turns classified failures into deduplicated,
//!   user-facing reports, gating upstream auto-reporting on whether the
//!   adapter is community-contributed
//!
//! # Design Philosophy
//!
//! - **Pure**: `generate_load_order` performs no mutation of shared state;
//!   callers own the canonical load order and decide what to persist
//! - **Typed boundaries**: loose adapter results are converted to tagged
//!   outcomes immediately on receipt, so malformed adapter behavior fails
//!   fast as an integration defect instead of masquerading as data
//! - **Testable**: adapters and matchers are traits; tests script them

pub mod adapter;
pub mod load_order;
pub mod reference;
pub mod reporting;

pub use adapter::GameAdapter;
pub use load_order::{
    LoadOrderError, apply_load_order, generate_load_order, is_mod_in_collection, is_valid_mod,
};
pub use reference::{FuzzyMatcher, ReferenceMatcher};
pub use reporting::{ErrorReport, ErrorReporter, Notify};
