//! Cancellation scope with deadline and stop reason.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Why a scope stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The scope's absolute deadline passed.
    DeadlineExceeded,
    /// The scope or one of its ancestors was cancelled or released.
    Cancelled,
}

impl StopReason {
    pub fn is_deadline(self) -> bool {
        matches!(self, StopReason::DeadlineExceeded)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::DeadlineExceeded => write!(f, "deadline exceeded"),
            StopReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Handle telling work whether it may continue.
///
/// Clones share state. Child scopes are derived with [`Scope::with_timeout`],
/// [`Scope::with_deadline`] or [`Scope::with_cancel`]; each derivation hands
/// back a [`ScopeGuard`] that releases the child when dropped.
#[derive(Debug, Clone)]
pub struct Scope {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    token: CancellationToken,
    /// Effective deadline: the earlier of our own and the parent's.
    deadline: Option<Instant>,
    reason: OnceLock<StopReason>,
    parent: Option<Scope>,
}

impl Scope {
    /// Create a root scope with no deadline.
    pub fn root() -> Self {
        Self::build(CancellationToken::new(), None, None)
    }

    fn build(token: CancellationToken, deadline: Option<Instant>, parent: Option<Scope>) -> Self {
        Self {
            inner: Arc::new(Inner {
                token,
                deadline,
                reason: OnceLock::new(),
                parent,
            }),
        }
    }

    fn child(&self, deadline: Option<Instant>) -> (Scope, ScopeGuard) {
        let child = Self::build(self.inner.token.child_token(), deadline, Some(self.clone()));
        let guard = ScopeGuard {
            scope: Some(child.clone()),
        };
        (child, guard)
    }

    /// Derive a child that stops at `deadline`, or earlier if this scope does.
    pub fn with_deadline(&self, deadline: Instant) -> (Scope, ScopeGuard) {
        let effective = match self.inner.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        self.child(Some(effective))
    }

    /// Derive a child that stops `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> (Scope, ScopeGuard) {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a child that only stops through cancellation (or this scope's deadline).
    pub fn with_cancel(&self) -> (Scope, ScopeGuard) {
        self.child(self.inner.deadline)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left before the deadline, `None` for scopes without one.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Current stop reason, or `None` while the scope is active.
    ///
    /// The first reason observed is latched.
    pub fn reason(&self) -> Option<StopReason> {
        if let Some(reason) = self.inner.reason.get() {
            return Some(*reason);
        }

        if self.deadline_passed() {
            return Some(self.latch(StopReason::DeadlineExceeded));
        }

        if self.inner.token.is_cancelled() {
            // Stopped through an ancestor: inherit its reason.
            let inherited = self
                .inner
                .parent
                .as_ref()
                .and_then(Scope::reason)
                .unwrap_or(StopReason::Cancelled);
            return Some(self.latch(inherited));
        }

        None
    }

    pub fn is_stopped(&self) -> bool {
        self.reason().is_some()
    }

    /// Stop this scope and every scope derived from it.
    ///
    /// A scope that already stopped keeps its original reason. Safe to call
    /// any number of times.
    pub fn cancel(&self) {
        if self.reason().is_none() {
            self.latch(StopReason::Cancelled);
        }
        self.inner.token.cancel();
    }

    /// Resolve once the scope stops, yielding the reason.
    pub async fn stopped(&self) -> StopReason {
        let expiry = async {
            match self.inner.deadline {
                Some(deadline) => time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        let expired = tokio::select! {
            _ = self.inner.token.cancelled() => false,
            _ = expiry => true,
        };

        if expired {
            return self.latch(StopReason::DeadlineExceeded);
        }
        self.reason().unwrap_or(StopReason::Cancelled)
    }

    fn deadline_passed(&self) -> bool {
        self.inner
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn latch(&self, reason: StopReason) -> StopReason {
        *self.inner.reason.get_or_init(|| reason)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::root()
    }
}

/// Releases a derived scope when dropped.
///
/// Dropping covers every exit path of the owner: normal return, early
/// return, unwinding, or the owning future being dropped mid-await.
#[derive(Debug)]
#[must_use = "dropping the guard releases the scope immediately"]
pub struct ScopeGuard {
    scope: Option<Scope>,
}

impl ScopeGuard {
    /// Release the scope now instead of at drop.
    pub fn release(mut self) {
        if let Some(scope) = self.scope.take() {
            scope.cancel();
        }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Some(scope) = self.scope.take() {
            scope.cancel();
            tracing::trace!(reason = ?scope.reason(), "Scope released");
        }
    }
}
