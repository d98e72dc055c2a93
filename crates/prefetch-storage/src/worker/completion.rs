//! Completion signals for store operations.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use prefetch_core::errors::{StorageError, StorageResult};

/// Pending result of a store operation.
///
/// Dropping a `Completion` discards the result; the operation itself still
/// runs to completion on the worker.
#[must_use = "dropping a Completion discards the operation's result"]
#[derive(Debug)]
pub struct Completion<T> {
    rx: Receiver<StorageResult<T>>,
}

/// Worker side of a [`Completion`].
#[derive(Debug)]
pub struct Responder<T> {
    tx: Sender<StorageResult<T>>,
}

impl<T> Completion<T> {
    pub(crate) fn channel() -> (Responder<T>, Completion<T>) {
        let (tx, rx) = bounded(1);
        (Responder { tx }, Completion { rx })
    }

    /// A completion that has already failed.
    pub(crate) fn failed(error: StorageError) -> Self {
        let (responder, completion) = Self::channel();
        responder.send(Err(error));
        completion
    }

    /// Block until the operation finishes.
    pub fn wait(self) -> StorageResult<T> {
        self.rx
            .recv()
            .unwrap_or(Err(StorageError::BackendUnavailable))
    }

    /// Block for at most `timeout`. `None` means still pending; the result
    /// is yielded at most once.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<StorageResult<T>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(StorageError::BackendUnavailable)),
        }
    }

    /// Non-blocking poll. `None` means still pending.
    pub fn try_take(&self) -> Option<StorageResult<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(StorageError::BackendUnavailable)),
        }
    }
}

impl<T> Responder<T> {
    /// Deliver the result. A dropped `Completion` is not an error.
    pub fn send(self, result: StorageResult<T>) {
        let _ = self.tx.send(result);
    }
}
