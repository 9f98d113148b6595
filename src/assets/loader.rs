//! Drives one model fetch at a time.
//!
//! `begin` spawns the read on the runtime and immediately supersedes any
//! fetch still in flight, so a retry can never race its predecessor. The
//! driver is polled from the render loop; results land in the
//! [`ResourceSlot`] and failures surface as [`ViewerError::Fetch`].

use std::time::Duration;

use tokio::runtime::Runtime;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::assets::slot::ResourceSlot;
use crate::assets::source::ModelReader;
use crate::error::ViewerError;

/// What a finished fetch amounts to.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Bytes are published in the slot and ready to decode.
    Ready,
    Failed(ViewerError),
}

struct Pending {
    generation: u64,
    rx: oneshot::Receiver<Result<Vec<u8>, String>>,
    task: JoinHandle<()>,
}

/// Owns the resource slot and the in-flight fetch, if any.
#[derive(Default)]
pub struct LoadDriver {
    slot: ResourceSlot,
    generation: u64,
    pending: Option<Pending>,
}

impl LoadDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kick off a fetch for `asset`, dropping the previous payload and
    /// cancelling any fetch still running. A read that exceeds `limit` is
    /// abandoned and reported as a fetch failure.
    pub fn begin(
        &mut self,
        runtime: &Runtime,
        reader: &ModelReader,
        asset: &str,
        limit: Duration,
    ) {
        self.generation += 1;
        self.slot.release();
        if let Some(old) = self.pending.take() {
            log::debug!(
                "superseding in-flight load (generation {})",
                old.generation
            );
            old.task.abort();
        }

        log::info!("loading model `{asset}` (generation {})", self.generation);
        let (tx, rx) = oneshot::channel();
        let read = reader(asset);
        let task = runtime.spawn(async move {
            let result = match tokio::time::timeout(limit, read).await {
                Ok(Ok(bytes)) => Ok(bytes),
                Ok(Err(err)) => Err(format!("{err:#}")),
                Err(_) => Err(format!("timed out after {limit:?}")),
            };
            // The receiver is gone when the load was superseded; nothing to do.
            let _ = tx.send(result);
        });
        self.pending = Some(Pending {
            generation: self.generation,
            rx,
            task,
        });
    }

    /// Non-blocking check on the in-flight fetch. Returns `None` while it is
    /// still running (or none was started), otherwise the outcome once.
    pub fn poll(&mut self, asset: &str) -> Option<LoadOutcome> {
        let finished = match &mut self.pending {
            None => return None,
            Some(pending) => match pending.rx.try_recv() {
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => {
                    Err("load task dropped without a result".to_owned())
                }
                Ok(result) => result,
            },
        };
        self.pending = None;

        match finished {
            Ok(bytes) => {
                log::info!("model `{asset}` fetched ({} bytes)", bytes.len());
                self.slot.publish(asset, bytes);
                Some(LoadOutcome::Ready)
            }
            Err(reason) => Some(LoadOutcome::Failed(ViewerError::fetch(asset, reason))),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn slot(&self) -> &ResourceSlot {
        &self.slot
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.slot.bytes()
    }

    /// Cancel any in-flight fetch and drop the live payload. Returns whether
    /// a payload was actually released, so callers can tell the first
    /// unmount from a repeat.
    pub fn unmount(&mut self) -> bool {
        if let Some(pending) = self.pending.take() {
            log::debug!(
                "cancelling in-flight load (generation {})",
                pending.generation
            );
            pending.task.abort();
        }
        self.slot.release()
    }
}
