//! Fire-and-forget writer for the progress blob.
//!
//! Mutations enqueue an encoded snapshot and return immediately; a background
//! task drains the queue in order. The first failed write switches the session
//! to in-memory mode: later snapshots are dropped instead of retried.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use storage::blob::encode;
use storage::repository::ProgressRepository;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use tutorial_core::model::ProgressState;

enum WriteCommand {
    Save(String),
    Flush(oneshot::Sender<()>),
}

pub(crate) struct Persister {
    queue: Option<mpsc::UnboundedSender<WriteCommand>>,
    durable: Arc<AtomicBool>,
    schema_version: u32,
}

impl Persister {
    /// Starts the writer task on the current tokio runtime.
    pub(crate) fn spawn(
        repo: Arc<dyn ProgressRepository>,
        key: String,
        schema_version: u32,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let durable = Arc::new(AtomicBool::new(true));
        tokio::spawn(run_writer(repo, key, rx, Arc::clone(&durable)));
        Self {
            queue: Some(tx),
            durable,
            schema_version,
        }
    }

    /// A persister that never writes.
    pub(crate) fn disabled(schema_version: u32) -> Self {
        Self {
            queue: None,
            durable: Arc::new(AtomicBool::new(false)),
            schema_version,
        }
    }

    pub(crate) fn is_durable(&self) -> bool {
        self.durable.load(Ordering::Acquire)
    }

    pub(crate) fn save(&self, state: &ProgressState) {
        let Some(queue) = self.queue.as_ref() else {
            return;
        };
        if !self.is_durable() {
            return;
        }
        match encode(state, self.schema_version) {
            Ok(blob) => {
                if queue.send(WriteCommand::Save(blob)).is_err() {
                    self.durable.store(false, Ordering::Release);
                    warn!("progress writer stopped; keeping progress in memory");
                }
            }
            Err(err) => warn!(error = %err, "failed to encode progress"),
        }
    }

    /// Resolves once every snapshot queued before this call has been handled.
    pub(crate) async fn flush(&self) {
        let Some(queue) = self.queue.as_ref() else {
            return;
        };
        let (done, wait) = oneshot::channel();
        if queue.send(WriteCommand::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

async fn run_writer(
    repo: Arc<dyn ProgressRepository>,
    key: String,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
    durable: Arc<AtomicBool>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Save(blob) => {
                if !durable.load(Ordering::Acquire) {
                    continue;
                }
                match repo.save_blob(&key, &blob).await {
                    Ok(()) => debug!(key = %key, "progress persisted"),
                    Err(err) => {
                        durable.store(false, Ordering::Release);
                        warn!(
                            key = %key,
                            error = %err,
                            "progress write failed; continuing in memory for this session"
                        );
                    }
                }
            }
            WriteCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
