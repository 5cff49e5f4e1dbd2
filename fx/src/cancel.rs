//! Caller-driven cancellation of rate lookups and conversions.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use ratebook_common::{RatebookError, Result};

/// Create a linked cancellation handle and signal.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(None);
    (CancelHandle { tx: Arc::new(tx) }, CancelSignal { rx })
}

/// Triggers cancellation of every operation watching the paired signal.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl CancelHandle {
    /// Cancel with a reason. Later calls keep the first reason.
    pub fn cancel(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
    }

    /// Check if cancellation has been triggered.
    pub fn is_cancelled(&self) -> bool {
        self.tx.borrow().is_some()
    }
}

/// Observed by operations that accept external cancellation.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<Option<String>>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, signal) = cancel_pair();
        signal
    }

    /// Check if cancellation has been triggered.
    pub fn is_cancelled(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Wait until cancellation is triggered and return its reason.
    ///
    /// Never completes if every handle is dropped without cancelling.
    pub async fn cancelled(&self) -> String {
        let mut rx = self.rx.clone();
        let reason = match rx.wait_for(|reason| reason.is_some()).await {
            Ok(reason) => reason.clone(),
            Err(_) => None,
        };

        match reason {
            Some(reason) => reason,
            None => std::future::pending().await,
        }
    }

    /// Run `operation` unless cancellation fires first.
    ///
    /// On cancellation the operation future is dropped and `Cancelled` is
    /// returned; no partial result escapes.
    pub async fn run<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let current = self.rx.borrow().clone();
        if let Some(reason) = current {
            return Err(RatebookError::Cancelled(reason));
        }

        tokio::select! {
            biased;
            reason = self.cancelled() => Err(RatebookError::Cancelled(reason)),
            result = operation => result,
        }
    }
}
