//! Per-request cancellation and deadline scope.
//!
//! # Responsibility
//! - Carry an optional deadline and a shared cancellation flag into every
//!   repository call.
//!
//! # Invariants
//! - A cancelled context stays cancelled.
//! - Repositories call `check()` before touching storage.

use crate::repo::{RepoError, RepoResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Request-scoped context threaded through repository operations.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    token: CancellationToken,
}

impl RequestContext {
    /// Context without deadline that is never cancelled unless asked to.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            token: CancellationToken::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Returns a copy bound to an externally owned cancellation token.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fails when the request was cancelled or its deadline has passed.
    pub fn check(&self) -> RepoResult<()> {
        if self.is_cancelled() {
            return Err(RepoError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(RepoError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CancellationToken, RequestContext};
    use crate::repo::RepoError;
    use std::time::{Duration, Instant};

    #[test]
    fn background_context_is_always_active() {
        let ctx = RequestContext::background();
        assert!(ctx.check().is_ok());
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let ctx = RequestContext::background().with_token(token.clone());
        let copy = ctx.clone();

        token.cancel();

        assert!(matches!(ctx.check(), Err(RepoError::Cancelled)));
        assert!(matches!(copy.check(), Err(RepoError::Cancelled)));
    }

    #[test]
    fn elapsed_deadline_is_reported() {
        let ctx = RequestContext::with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(matches!(ctx.check(), Err(RepoError::DeadlineExceeded)));
    }

    #[test]
    fn future_deadline_passes_check() {
        let ctx = RequestContext::with_timeout(Duration::from_secs(60));
        assert!(ctx.check().is_ok());

        ctx.cancel();
        assert!(matches!(ctx.check(), Err(RepoError::Cancelled)));
    }
}
