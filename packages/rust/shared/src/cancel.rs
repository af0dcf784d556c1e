//! Run-level cancellation.
//!
//! A run can be aborted between addresses (never mid-request) and during
//! the rate-limit backoff wait. The orchestrator holds a [`CancelToken`];
//! the CLI holds the matching [`CancelHandle`] and fires it on ctrl-c.

use tokio::sync::watch;

/// Create a linked cancel handle/token pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// The triggering side of a cancellation pair.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation to all linked tokens.
    pub fn cancel(&self) {
        // Receivers may already be gone if the run finished first.
        let _ = self.tx.send(true);
    }
}

/// The observing side of a cancellation pair. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that never fires, for headless/test usage.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        Self { rx }
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve when cancellation is signalled. If the handle was dropped
    /// without cancelling, this pends forever (suitable for `select!`).
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                // Handle dropped without cancelling: never resolves.
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_is_observed() {
        let (handle, token) = cancel_pair();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
        // Must resolve promptly once cancelled.
        token.cancelled().await;
    }

    #[tokio::test]
    async fn never_token_pends() {
        let token = CancelToken::never();
        assert!(!token.is_cancelled());
        let timeout =
            tokio::time::timeout(std::time::Duration::from_millis(20), token.cancelled()).await;
        assert!(timeout.is_err());
    }

    #[tokio::test]
    async fn dropped_handle_does_not_cancel() {
        let (handle, token) = cancel_pair();
        drop(handle);
        assert!(!token.is_cancelled());
        let timeout =
            tokio::time::timeout(std::time::Duration::from_millis(20), token.cancelled()).await;
        assert!(timeout.is_err());
    }
}
