//! Cancellation scope for the active view.
//!
//! Each active view owns a [`ViewScope`]. Leaving the view cancels it, and
//! any fetch still running under the scope resolves to
//! [`ClientError::Cancelled`] instead of delivering stale data.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ClientError;

/// Cancellation handle shared by a view and its in-flight fetches.
///
/// Clones observe the same cancellation.
#[derive(Debug, Clone)]
pub struct ViewScope {
    cancelled: Arc<watch::Sender<bool>>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            cancelled: Arc::new(tx),
        }
    }

    /// Cancel the scope. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Resolves once the scope is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Run `fut` under the scope.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Cancelled`] if the scope is cancelled before
    /// `fut` completes, or by the time it does; otherwise `fut`'s own result.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        tokio::select! {
            biased;
            () = self.cancelled() => Err(ClientError::Cancelled),
            result = fut => {
                if self.is_cancelled() {
                    Err(ClientError::Cancelled)
                } else {
                    result
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_completed_fetch_is_delivered() {
        let scope = ViewScope::new();
        let result = scope.run(async { Ok::<_, ClientError>(7) }).await;
        assert!(matches!(result, Ok(7)));
    }

    #[tokio::test]
    async fn test_cancelled_scope_rejects_new_work() {
        let scope = ViewScope::new();
        scope.cancel();
        scope.cancel();
        let result = scope.run(async { Ok::<_, ClientError>(7) }).await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_fetch() {
        let scope = ViewScope::new();
        let handle = scope.clone();

        let task = tokio::spawn(async move {
            handle
                .run(async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok::<_, ClientError>("stale")
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        scope.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), task).await;
        assert!(matches!(result, Ok(Ok(Err(ClientError::Cancelled)))));
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let scope = ViewScope::new();
        let result: Result<(), _> = scope
            .run(async { Err(ClientError::Forbidden("no".to_string())) })
            .await;
        assert!(matches!(result, Err(ClientError::Forbidden(_))));
    }
}
