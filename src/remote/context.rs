//! Per-call cancellation and deadlines.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::error::{MemoryError, Result};

/// Caller-supplied context for a single API call.
///
/// Cloning shares the cancellation token, so cancelling any clone aborts every
/// call running under it.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl CallContext {
    /// A context that never cancels and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose calls fail with [`MemoryError::Timeout`] after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }

    /// Replace the cancellation token, e.g. with a child of an app-wide token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` to completion unless the context is cancelled or times out
    /// first. The losing future is dropped, which aborts any in-flight I/O.
    pub async fn guard<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let bounded = async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(MemoryError::Timeout(limit)),
                },
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(MemoryError::Cancelled),
            result = bounded => result,
        }
    }
}
