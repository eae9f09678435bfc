//! Single-slot cancellation for the client's in-flight request.

use std::future::Future;
use std::sync::Mutex;

use tokio::sync::watch;

use crate::error::ApiError;

/// Holds the sender for whichever request is currently "the" request.
#[derive(Debug, Default)]
pub(super) struct CancelSlot {
    current: Mutex<Option<watch::Sender<bool>>>,
}

impl CancelSlot {
    /// Cancel any previous request and install a fresh handle.
    pub(super) fn begin(&self) -> CancelToken {
        let (tx, rx) = watch::channel(false);
        if let Some(previous) = self.lock().replace(tx) {
            let _ = previous.send(true);
        }
        CancelToken { rx }
    }

    /// Cancel the current request without installing a replacement.
    pub(super) fn cancel(&self) -> bool {
        match self.lock().take() {
            Some(current) => {
                let _ = current.send(true);
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<watch::Sender<bool>>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Receiver side of one request's cancellation handle.
#[derive(Debug, Clone)]
pub(crate) struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub(crate) fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once this request has been cancelled.
    pub(crate) async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // The owning client is gone; nothing can cancel us now.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Drive `fut` unless the request is cancelled first.
    pub(crate) async fn run<T, F>(&self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let mut token = self.clone();
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(ApiError::Cancelled),
            result = fut => result,
        }
    }
}
