//! Persistence pipeline: a FIFO serialization queue plus the persistors that
//! funnel document reads and writes through it.
//!
//! # Components
//!
//! - [`SerializationQueue`]: strict FIFO task sequencer; at most one
//!   persistence operation is in flight at a time.
//! - [`UserlistPersistor`]: owns the in-memory userlist document for one
//!   persistence scope and its on-disk `userlist.yaml`, writing through the
//!   queue with a write-temp-then-rename discipline.
//! - [`KeyValueStore`]: the four-operation store surface exposed to the host,
//!   typed results instead of error-first callbacks.
//!
//! # Consistency rules
//!
//! The on-disk file, once written, is always either the previous complete
//! document or the new complete document; a failed write leaves it untouched.
//! The in-memory document and the file are exclusively owned by one persistor
//! instance per scope.

pub mod queue;
pub mod userlist;

pub use queue::SerializationQueue;
pub use userlist::{PersistorState, UserlistPersistor};

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors from the persistence pipeline.
#[derive(Debug, Error)]
pub enum PersistError {
    /// A document blob could not be decoded from (or encoded as) the JSON
    /// transport form.
    #[error("userlist document is not valid JSON: {0}")]
    InvalidDocument(#[source] serde_json::Error),

    /// A disk write failed; the on-disk file is whatever it was before.
    /// Reported once per failure streak, recoverable.
    #[error("failed to write userlist to {path}: {source}")]
    WriteFailure {
        path: Utf8PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The file exists but could not be read or parsed. Fatal for the scope:
    /// defaulting here would destroy the real file on the next write, so the
    /// scope halts instead.
    #[error("failed to read userlist from {path}: {source}")]
    FatalRead {
        path: Utf8PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The scope hit a fatal read earlier; writes are refused until it is
    /// reactivated.
    #[error("persistence scope is in a failed state, refusing further writes")]
    ScopeFailed,

    /// The serialization queue worker is gone (runtime shut down).
    #[error("serialization queue is closed")]
    QueueClosed,
}

/// Asynchronous key-value store surface exposed to the host.
///
/// Four operations, typed results. Implementations funnel every operation
/// through their [`SerializationQueue`], so a read observes every previously
/// submitted write.
pub trait KeyValueStore: Send + Sync {
    fn get_item(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<String, PersistError>> + Send;

    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), PersistError>> + Send;

    fn remove_item(&self, key: &str)
    -> impl Future<Output = Result<(), PersistError>> + Send;

    fn list_keys(&self) -> impl Future<Output = Result<Vec<String>, PersistError>> + Send;
}
