//! Bounded outbound calls.
//!
//! Every call to an external service goes through [`bounded`], which races it
//! against a [`CancellationToken`] and a timeout. Losing the race drops the
//! call's future, which aborts the in-flight request (or kills the child
//! process) without keeping any partial state.

use crate::error::{Result, TubescribeError};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Run `fut` until it completes, `cancel` fires, or `timeout` elapses.
pub async fn bounded<T, F>(
    cancel: &CancellationToken,
    timeout: Duration,
    operation: &str,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(TubescribeError::Cancelled(operation.to_string()));
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TubescribeError::Cancelled(operation.to_string())),
        res = tokio::time::timeout(timeout, fut) => match res {
            Ok(inner) => inner,
            Err(_) => Err(TubescribeError::Timeout(format!(
                "{} did not finish within {}s",
                operation,
                timeout.as_secs_f64()
            ))),
        },
    }
}

/// Token cancelled when the process receives Ctrl-C.
pub fn ctrl_c_token() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling outstanding requests");
            child.cancel();
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_budget() {
        let token = CancellationToken::new();
        let out = bounded(&token, Duration::from_secs(1), "noop", async { Ok(42) }).await;
        assert_eq!(out.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_times_out() {
        let token = CancellationToken::new();
        let out: Result<()> = bounded(&token, Duration::from_millis(10), "sleep", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(out, Err(TubescribeError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let out = bounded(&token, Duration::from_secs(1), "noop", async { Ok(1) }).await;
        assert!(matches!(out, Err(TubescribeError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_cancelled_mid_flight() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let out: Result<()> = bounded(&token, Duration::from_secs(5), "sleep", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(out, Err(TubescribeError::Cancelled(_))));
    }

    #[test]
    fn test_error_propagates() {
        let token = CancellationToken::new();
        let out: Result<()> = tokio_test::block_on(bounded(
            &token,
            Duration::from_secs(1),
            "fail",
            async { Err(TubescribeError::GenerationFailure("boom".into())) },
        ));
        assert!(matches!(out, Err(TubescribeError::GenerationFailure(_))));
    }
}
