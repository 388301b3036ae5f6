use std::io::ErrorKind;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use tokio::fs;

use super::{KeyValueStore, PersistError, SerializationQueue};
use crate::metrics::Metrics;
use crate::models::UserlistDocument;

/// Name of the persisted file inside a scope directory.
const USERLIST_FILE: &str = "userlist.yaml";

/// Suffix of the temporary file written before the atomic rename.
const TMP_SUFFIX: &str = ".tmp";

/// The single logical key this document kind is stored under.
const USERLIST_KEY: &str = "userlist";

/// Lifecycle state of a persistor scope.
///
/// `activate` moves the scope to `Loading`; a successful (or first-run) read
/// lands in `Ready`; a non-missing-file read failure lands in `Failed`, which
/// is terminal until the scope is reactivated; `deactivate` returns to
/// `Uninitialized`. Disk writes happen only in `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistorState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

type ResetCallback = Box<dyn Fn() + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&PersistError) + Send + Sync>;

struct Shared {
    document: UserlistDocument,
    path: Option<Utf8PathBuf>,
    state: PersistorState,
    /// Sticky flag: set after a failed write, cleared by a successful one.
    /// While set, further write failures are logged but not re-reported.
    write_failed: bool,
}

/// Persistor syncing one game's userlist rules to and from `userlist.yaml`.
///
/// Exclusively owns the in-memory [`UserlistDocument`] and the on-disk file
/// for its scope. Every operation (the [`KeyValueStore`] surface as well as
/// the internal reads and writes) runs through one [`SerializationQueue`],
/// so no two persistence operations ever interleave.
///
/// Writes go to `<path>.tmp` first and are renamed over the real file, so the
/// on-disk document is always either the previous or the new complete
/// version.
pub struct UserlistPersistor {
    shared: Arc<Mutex<Shared>>,
    queue: SerializationQueue,
    data_root: Utf8PathBuf,
    reset_cb: Arc<Mutex<Option<ResetCallback>>>,
    on_error: Arc<ErrorCallback>,
    metrics: Arc<Metrics>,
}

impl UserlistPersistor {
    /// Create a persistor rooted at `data_root` (one subdirectory per scope).
    ///
    /// `on_error` receives recoverable write failures, once per failure
    /// streak. Must be called from within a tokio runtime; the queue worker
    /// is spawned here.
    pub fn new<P, F>(data_root: P, metrics: Arc<Metrics>, on_error: F) -> Self
    where
        P: AsRef<Utf8Path>,
        F: Fn(&PersistError) + Send + Sync + 'static,
    {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                document: UserlistDocument::default(),
                path: None,
                state: PersistorState::Uninitialized,
                write_failed: false,
            })),
            queue: SerializationQueue::new(),
            data_root: data_root.as_ref().to_path_buf(),
            reset_cb: Arc::new(Mutex::new(None)),
            on_error: Arc::new(Box::new(on_error)),
            metrics,
        }
    }

    /// Register the callback invoked whenever the in-memory document is
    /// replaced out-of-band (after a load, or on deactivation).
    pub fn on_reset<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.reset_cb.lock().unwrap() = Some(Box::new(callback));
    }

    /// Current lifecycle state of the scope.
    pub fn state(&self) -> PersistorState {
        self.shared.lock().unwrap().state
    }

    /// Snapshot of the current in-memory document.
    pub fn document(&self) -> UserlistDocument {
        self.shared.lock().unwrap().document.clone()
    }

    /// Path the scope persists to, if a scope is active.
    pub fn path(&self) -> Option<Utf8PathBuf> {
        self.shared.lock().unwrap().path.clone()
    }

    /// Bind the persistor to a scope and load its file.
    ///
    /// A missing file is the expected first-run case and yields the default
    /// empty document. Any other read or parse failure is fatal for the
    /// scope: the in-memory document is left untouched, the scope moves to
    /// [`PersistorState::Failed`], and the error propagates so the owner can
    /// halt the workflow instead of risking the file on the next write.
    pub async fn activate(&self, scope_id: &str) -> Result<(), PersistError> {
        let path = self.data_root.join(scope_id).join(USERLIST_FILE);

        // Leaving Ready right away keeps writes queued for a previous scope
        // from landing on the new path.
        self.shared.lock().unwrap().state = PersistorState::Loading;

        let shared = Arc::clone(&self.shared);
        let reset_cb = Arc::clone(&self.reset_cb);
        let metrics = Arc::clone(&self.metrics);

        self.metrics.record_queue_task();
        self.queue
            .enqueue(async move {
                shared.lock().unwrap().path = Some(path.clone());

                let document = match fs::read_to_string(&path).await {
                    Ok(text) => match serde_yaml_ng::from_str::<UserlistDocument>(&text) {
                        Ok(document) => document,
                        Err(err) => {
                            shared.lock().unwrap().state = PersistorState::Failed;
                            return Err(PersistError::FatalRead {
                                path,
                                source: anyhow::Error::new(err).context("parse userlist YAML"),
                            });
                        }
                    },
                    Err(err) if err.kind() == ErrorKind::NotFound => {
                        tracing::info!("no userlist at {}, starting empty", path);
                        UserlistDocument::default()
                    }
                    Err(err) => {
                        shared.lock().unwrap().state = PersistorState::Failed;
                        return Err(PersistError::FatalRead {
                            path,
                            source: anyhow::Error::new(err).context("read userlist file"),
                        });
                    }
                };

                {
                    let mut shared = shared.lock().unwrap();
                    shared.document = document;
                    shared.state = PersistorState::Ready;
                    shared.write_failed = false;
                }
                metrics.record_userlist_load();
                fire_reset(&reset_cb);
                tracing::debug!("userlist scope activated at {}", path);
                Ok(())
            })
            .await?
    }

    /// Detach from the current scope: reset the document to the empty
    /// default, clear the path, and notify the reset callback.
    pub async fn deactivate(&self) -> Result<(), PersistError> {
        let shared = Arc::clone(&self.shared);
        let reset_cb = Arc::clone(&self.reset_cb);

        self.metrics.record_queue_task();
        self.queue
            .enqueue(async move {
                {
                    let mut shared = shared.lock().unwrap();
                    shared.document = UserlistDocument::default();
                    shared.path = None;
                    shared.state = PersistorState::Uninitialized;
                    shared.write_failed = false;
                }
                fire_reset(&reset_cb);
            })
            .await
    }
}

impl KeyValueStore for UserlistPersistor {
    /// The whole document as one JSON blob, regardless of `key`; the default
    /// empty document when nothing has been loaded yet.
    async fn get_item(&self, _key: &str) -> Result<String, PersistError> {
        let shared = Arc::clone(&self.shared);

        self.metrics.record_queue_task();
        self.queue
            .enqueue(async move {
                let document = shared.lock().unwrap().document.clone();
                serde_json::to_string(&document).map_err(PersistError::InvalidDocument)
            })
            .await?
    }

    /// Replace the whole document with the parsed `value` and write through.
    async fn set_item(&self, _key: &str, value: &str) -> Result<(), PersistError> {
        let value = value.to_string();
        let shared = Arc::clone(&self.shared);
        let on_error = Arc::clone(&self.on_error);
        let metrics = Arc::clone(&self.metrics);

        self.metrics.record_queue_task();
        self.queue
            .enqueue(async move {
                let document: UserlistDocument =
                    serde_json::from_str(&value).map_err(PersistError::InvalidDocument)?;

                {
                    let mut shared = shared.lock().unwrap();
                    if shared.state == PersistorState::Failed {
                        return Err(PersistError::ScopeFailed);
                    }
                    shared.document = document;
                }

                do_serialize(&shared, &on_error, &metrics).await;
                Ok(())
            })
            .await?
    }

    /// Clear the named top-level section and write through.
    async fn remove_item(&self, key: &str) -> Result<(), PersistError> {
        let key = key.to_string();
        let shared = Arc::clone(&self.shared);
        let on_error = Arc::clone(&self.on_error);
        let metrics = Arc::clone(&self.metrics);

        self.metrics.record_queue_task();
        self.queue
            .enqueue(async move {
                {
                    let mut shared = shared.lock().unwrap();
                    if shared.state == PersistorState::Failed {
                        return Err(PersistError::ScopeFailed);
                    }
                    if !shared.document.clear_section(&key) {
                        tracing::debug!("remove_item: unknown userlist key {}", key);
                        return Ok(());
                    }
                }

                do_serialize(&shared, &on_error, &metrics).await;
                Ok(())
            })
            .await?
    }

    /// This document kind lives under a single logical key.
    async fn list_keys(&self) -> Result<Vec<String>, PersistError> {
        self.metrics.record_queue_task();
        self.queue
            .enqueue(async { vec![USERLIST_KEY.to_string()] })
            .await
    }
}

fn fire_reset(reset_cb: &Mutex<Option<ResetCallback>>) {
    if let Some(callback) = reset_cb.lock().unwrap().as_ref() {
        callback();
    }
}

/// Write the current document to disk. Runs inside an already-queued job.
///
/// Writes are suppressed until the first successful load completes, so a
/// freshly constructed persistor cannot clobber a real file with default
/// values. Failures leave the on-disk file untouched (the rename never
/// happened) and are reported once per failure streak.
async fn do_serialize(
    shared: &Mutex<Shared>,
    on_error: &ErrorCallback,
    metrics: &Metrics,
) {
    let (path, document) = {
        let shared = shared.lock().unwrap();
        if shared.state != PersistorState::Ready {
            return;
        }
        let Some(path) = shared.path.clone() else {
            return;
        };
        (path, shared.document.clone())
    };

    let tmp_path = Utf8PathBuf::from(format!("{path}{TMP_SUFFIX}"));
    let outcome: anyhow::Result<()> = async {
        let yaml = serde_yaml_ng::to_string(&document).context("encode userlist as YAML")?;
        if let Some(scope_dir) = path.parent() {
            fs::create_dir_all(scope_dir)
                .await
                .with_context(|| format!("create scope directory {scope_dir}"))?;
        }
        fs::write(&tmp_path, yaml)
            .await
            .with_context(|| format!("write temp file {tmp_path}"))?;
        fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("rename {tmp_path} over {path}"))?;
        Ok(())
    }
    .await;

    match outcome {
        Ok(()) => {
            shared.lock().unwrap().write_failed = false;
            metrics.record_userlist_write();
            tracing::debug!("userlist written to {}", path);
        }
        Err(err) => {
            let first_in_streak = {
                let mut shared = shared.lock().unwrap();
                let first = !shared.write_failed;
                shared.write_failed = true;
                first
            };
            metrics.record_userlist_write_failure();

            let error = PersistError::WriteFailure { path, source: err };
            if first_in_streak {
                tracing::error!("{}", error);
                on_error(&error);
            } else {
                tracing::debug!("still failing to write userlist: {}", error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn test_persistor(root: &TempDir) -> UserlistPersistor {
        let root = Utf8PathBuf::try_from(root.path().to_path_buf()).unwrap();
        UserlistPersistor::new(root, Arc::new(Metrics::new()), |_| {})
    }

    #[tokio::test]
    async fn test_fresh_persistor_is_uninitialized() {
        let dir = TempDir::new().unwrap();
        let persistor = test_persistor(&dir);

        assert_eq!(persistor.state(), PersistorState::Uninitialized);
        assert!(persistor.path().is_none());
        assert!(persistor.document().is_empty());
    }

    #[tokio::test]
    async fn test_activate_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let persistor = test_persistor(&dir);

        persistor.activate("skyrimse").await.unwrap();

        assert_eq!(persistor.state(), PersistorState::Ready);
        assert!(persistor.document().is_empty());
        assert!(
            persistor
                .path()
                .unwrap()
                .as_str()
                .ends_with("skyrimse/userlist.yaml")
        );
    }

    #[tokio::test]
    async fn test_get_item_defaults_before_activation() {
        let dir = TempDir::new().unwrap();
        let persistor = test_persistor(&dir);

        let blob = persistor.get_item("userlist").await.unwrap();
        let document: UserlistDocument = serde_json::from_str(&blob).unwrap();
        assert!(document.is_empty());
    }

    #[tokio::test]
    async fn test_set_item_rejects_invalid_json() {
        let dir = TempDir::new().unwrap();
        let persistor = test_persistor(&dir);
        persistor.activate("skyrimse").await.unwrap();

        let err = persistor.set_item("userlist", "not json").await.unwrap_err();
        assert!(matches!(err, PersistError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn test_list_keys_single_logical_key() {
        let dir = TempDir::new().unwrap();
        let persistor = test_persistor(&dir);

        assert_eq!(persistor.list_keys().await.unwrap(), vec!["userlist"]);
    }

    #[tokio::test]
    async fn test_write_suppressed_until_loaded() {
        let dir = TempDir::new().unwrap();
        let persistor = test_persistor(&dir);

        // No activate: the document is replaced in memory but nothing may
        // touch the disk.
        persistor
            .set_item("userlist", r#"{"globals":[],"plugins":[{"name":"SkyUI.esp"}]}"#)
            .await
            .unwrap();

        assert_eq!(persistor.document().plugins.len(), 1);
        assert!(persistor.path().is_none());
    }
}
