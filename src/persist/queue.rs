use std::future::Future;
use std::pin::Pin;

use tokio::sync::{mpsc, oneshot};

use super::PersistError;

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// FIFO sequencer for persistence tasks.
///
/// A single worker task drains the queue one job at a time, strictly in
/// submission order. A job enqueued while another is pending does not start
/// until every prior job has fully settled, including its error handling;
/// this is what keeps two writers from interleaving partial document states
/// or racing on the temp-file rename.
///
/// A job's failure is its own result value and never stops the worker loop.
/// Jobs are not cancellable once enqueued and have no timeout; a stuck
/// filesystem operation stalls the queue.
pub struct SerializationQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl SerializationQueue {
    /// Create a queue and spawn its worker loop on the current runtime.
    ///
    /// The worker holds the receive side; once every queue handle is dropped
    /// it drains what is already enqueued and exits, so pending writes still
    /// land.
    pub fn new() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                job.await;
            }
            tracing::debug!("serialization queue worker stopped");
        });

        Self { tx }
    }

    /// Enqueue a task and wait for its result.
    ///
    /// Resolves only after the task, and every task submitted before it,
    /// has settled.
    pub async fn enqueue<F, T>(&self, task: F) -> Result<T, PersistError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();

        let job: Job = Box::pin(async move {
            // Receiver may be gone if the submitter stopped waiting; the task
            // still ran to completion in order, which is all ordering needs.
            let _ = done_tx.send(task.await);
        });

        self.tx.send(job).map_err(|_| PersistError::QueueClosed)?;
        done_rx.await.map_err(|_| PersistError::QueueClosed)
    }
}

impl Default for SerializationQueue {
    fn default() -> Self {
        Self::new()
    }
}
