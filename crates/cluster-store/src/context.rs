//! Per-invocation cancellation context
//!
//! Each reconcile invocation carries an [`InvocationContext`]. Store lookups
//! race against its cancellation token and fail with
//! [`StoreError::Cancelled`] as soon as the token fires.

use crate::error::StoreError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Cancellable context for a single reconcile invocation
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    token: CancellationToken,
}

impl InvocationContext {
    /// Create a fresh, uncancelled context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context driven by an existing token
    pub fn with_token(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Derive a context that is cancelled together with this one, but can
    /// also be cancelled on its own
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Cancel this context and all of its children
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the context has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run a store operation, failing fast if the context is (or becomes)
    /// cancelled. `what` names the operation in the resulting error.
    pub async fn run<T, F>(&self, what: impl Into<String>, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        if self.token.is_cancelled() {
            return Err(StoreError::Cancelled(what.into()));
        }

        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(StoreError::Cancelled(what.into())),
            result = op => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_completes_when_not_cancelled() {
        let ctx = InvocationContext::new();
        let result = ctx.run("lookup", async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_run_fails_fast_when_already_cancelled() {
        let ctx = InvocationContext::new();
        ctx.cancel();
        let result = ctx
            .run("Gateway default/gw", async { Ok::<_, StoreError>(()) })
            .await;
        assert!(matches!(result, Err(StoreError::Cancelled(what)) if what == "Gateway default/gw"));
    }

    #[tokio::test]
    async fn test_run_interrupted_by_cancellation() {
        let ctx = InvocationContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = ctx
            .run("slow lookup", async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, StoreError>(())
            })
            .await;
        assert!(matches!(result, Err(StoreError::Cancelled(_))));
    }

    #[test]
    fn test_child_follows_parent() {
        let parent = InvocationContext::new();
        let child = parent.child();
        assert!(!child.is_cancelled());
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_child_cancel_does_not_affect_parent() {
        let parent = InvocationContext::new();
        let child = parent.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }
}
