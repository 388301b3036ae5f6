// Loadstone - load order management core for desktop mod managers.
//
// This is the library crate containing the load order orchestration, the
// game adapter boundary, and the userlist persistence pipeline. The GUI
// shell lives elsewhere and calls into this crate.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod persist;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::SettingsManager;
pub use metrics::Metrics;
pub use models::{LoadOrder, LoadOrderEntry, UserlistDocument, ValidationOutcome};
pub use persist::{KeyValueStore, PersistError, UserlistPersistor};
pub use services::{GameAdapter, LoadOrderError, generate_load_order};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
