use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::CoreError;

/// The language model provider — an external collaborator treated as an
/// opaque streaming service. Only the interface the orchestrator consumes
/// is specified: stream tokens for an assembled prompt, honoring
/// cooperative cancellation.
#[async_trait]
pub trait ModelProviderService: Send + Sync {
    /// Streams generated text chunks for `prompt`. The returned stream ends
    /// with `None` on normal completion; an `Err` item maps to one of
    /// `CoreError::RateLimited` / `CoreError::Upstream` / `CoreError::Cancelled`.
    async fn stream_generate(
        &self,
        prompt: String,
        cancel: CancellationContext,
    ) -> BoxStream<'static, Result<String, CoreError>>;
}

/// Cooperative cancellation signal threaded through every external call —
/// an explicit cancellation context propagated through each downstream call
/// rather than relying on the caller dropping the future.
#[derive(Debug, Clone)]
pub struct CancellationContext {
    token: tokio_util_lite::CancellationToken,
}

impl CancellationContext {
    pub fn new() -> Self {
        Self { token: tokio_util_lite::CancellationToken::new() }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn child(&self) -> Self {
        Self { token: self.token.clone() }
    }
}

impl Default for CancellationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A minimal cooperative cancellation token, avoiding a dependency on the
/// full `tokio-util` crate for a single primitive: a shared `Notify` backed
/// flag, cloned by reference so every child context observes the same
/// cancellation.
mod tokio_util_lite {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    pub struct CancellationToken {
        cancelled: Arc<AtomicBool>,
    }

    impl CancellationToken {
        pub fn new() -> Self {
            Self { cancelled: Arc::new(AtomicBool::new(false)) }
        }

        pub fn cancel(&self) {
            self.cancelled.store(true, Ordering::SeqCst);
        }

        pub fn is_cancelled(&self) -> bool {
            self.cancelled.load(Ordering::SeqCst)
        }
    }
}
