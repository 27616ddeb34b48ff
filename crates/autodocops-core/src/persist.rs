//! Write-behind persistence for a single store record.
//!
//! # Overview
//!
//! A store keeps its state in memory and mutates it synchronously. The fields
//! it wants to keep across restarts are serialized together as one JSON record
//! under a fixed name, e.g. `autodocops-session`.
//!
//! Writes are handed to a background task over a FIFO channel, so mutating
//! the store never waits on I/O:
//!
//! ```text
//! store.set_theme(Dark) ──schedule──▶ [Put, Put, Flush] ──▶ writer task ──▶ backend
//!                                               │
//! store.flush().await ◀──────── ack ────────────┘
//! ```
//!
//! # Guarantees
//!
//! - Writes are applied in the order they were scheduled, so the last value
//!   scheduled is the one that ends up persisted.
//! - [`PersistedRecord::flush`] resolves once every write scheduled before it
//!   has been applied.
//! - Backend write failures are logged by the writer and never reach the code
//!   that mutated the store.
//!
//! Between a mutation and the next flush there is a window where memory and
//! storage disagree; a crash inside it loses the pending writes.

use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::storage::SharedBackend;

enum WriteOp {
    Put(String),
    Flush(oneshot::Sender<()>),
}

/// One JSON record in a backend, with a background writer.
pub struct PersistedRecord<T> {
    name: String,
    backend: SharedBackend,
    tx: Mutex<Option<mpsc::UnboundedSender<WriteOp>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> PersistedRecord<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Start the writer for `name`. Must be called inside a tokio runtime.
    pub fn new(name: impl Into<String>, backend: SharedBackend) -> Self {
        let name = name.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_writer(name.clone(), backend.clone(), rx));

        Self {
            name,
            backend,
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            _record: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the record back.
    ///
    /// Returns `None` when nothing is stored, when the backend cannot be
    /// read, or when the stored JSON is malformed. A malformed record is
    /// removed so the next start begins clean.
    pub async fn hydrate(&self) -> Option<T> {
        let raw = match self.backend.get(&self.name).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Could not read '{}' from {}: {e}", self.name, self.backend.name());
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => {
                log::debug!("Hydrated '{}' from {}", self.name, self.backend.name());
                Some(record)
            }
            Err(e) => {
                log::warn!("Discarding malformed '{}' record: {e}", self.name);
                if let Err(e) = self.backend.remove(&self.name).await {
                    log::warn!("Could not remove malformed '{}' record: {e}", self.name);
                }
                None
            }
        }
    }

    /// Queue a write of `value`. Never blocks.
    pub fn schedule(&self, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.send(WriteOp::Put(json)),
            Err(e) => log::warn!("Failed to serialize '{}' record: {e}", self.name),
        }
    }

    /// Wait until every write scheduled so far has been applied.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(WriteOp::Flush(ack_tx));
        // A closed writer has nothing left to apply.
        let _ = ack_rx.await;
    }

    /// Apply pending writes and stop the writer. Later writes are dropped.
    pub async fn close(&self) {
        // Dropping the sender lets the writer drain its queue and exit.
        drop(self.sender().take());
        let worker = lock(&self.worker).take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                log::warn!("Writer for '{}' ended abnormally: {e}", self.name);
            }
        }
    }

    fn send(&self, op: WriteOp) {
        let sent = match self.sender().as_ref() {
            Some(tx) => tx.send(op).is_ok(),
            None => false,
        };
        if !sent {
            log::debug!("Writer for '{}' is closed; dropping write", self.name);
        }
    }

    fn sender(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<WriteOp>>> {
        lock(&self.tx)
    }
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_writer(
    name: String,
    backend: SharedBackend,
    mut rx: mpsc::UnboundedReceiver<WriteOp>,
) {
    while let Some(op) = rx.recv().await {
        match op {
            WriteOp::Put(json) => {
                if let Err(e) = backend.set(&name, &json).await {
                    log::warn!("Failed to persist '{name}' to {}: {e}", backend.name());
                }
            }
            WriteOp::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    log::debug!("Writer for '{name}' stopped");
}
