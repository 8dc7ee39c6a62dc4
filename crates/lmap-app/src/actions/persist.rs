//! Store writer
//!
//! One long-lived task owns every write to the [`PreferenceStore`]. Writes
//! run one at a time in the order they were queued, so a later list always
//! lands after an earlier one for the same key.

use tokio::sync::{mpsc, oneshot};

use lmap_core::prelude::*;

use crate::store::PreferenceStore;

type WriteFn = Box<dyn FnOnce(&PreferenceStore) -> Result<()> + Send>;

enum StoreJob {
    Write { what: &'static str, write: WriteFn },
    /// Answered once every earlier write has finished
    Flush(oneshot::Sender<()>),
}

/// Queue side of the store writer task
#[derive(Clone)]
pub struct StoreWriter {
    tx: mpsc::UnboundedSender<StoreJob>,
}

impl StoreWriter {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    pub fn spawn(prefs: PreferenceStore) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<StoreJob>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    StoreJob::Write { what, write } => {
                        let prefs = prefs.clone();
                        match tokio::task::spawn_blocking(move || write(&prefs)).await {
                            Ok(Ok(())) => debug!("Persisted {}", what),
                            Ok(Err(e)) => error!("Failed to persist {}: {}", what, e),
                            Err(e) => error!("Store write for {} panicked: {}", what, e),
                        }
                    }
                    StoreJob::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("store writer finished");
        });

        Self { tx }
    }

    /// Queue a blocking write behind every write already queued
    pub fn write<F>(&self, what: &'static str, write: F)
    where
        F: FnOnce(&PreferenceStore) -> Result<()> + Send + 'static,
    {
        let job = StoreJob::Write {
            what,
            write: Box::new(write),
        };
        if self.tx.send(job).is_err() {
            warn!("Store writer gone, {} not persisted", what);
        }
    }

    /// Wait until every write queued so far has reached the store
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(StoreJob::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}
