//! Per-request context: cancellation, deadline and the caller identity.
//!
//! Every store and cache operation receives a `&RequestContext`. A context that
//! is already cancelled or past its deadline fails before any I/O starts, and an
//! operation in flight is abandoned as soon as either fires. Dropping the
//! abandoned future drops whatever it held (an open transaction rolls back).

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use warden_domain::id::UserId;
use warden_domain::identity::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("request cancelled")]
    Cancelled,
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    identity: Option<Identity>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline or identity.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Derive a context whose cancellation follows this one but can also be
    /// cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
            identity: self.identity,
        }
    }

    /// Same identity, but detached from this context's cancellation and deadline.
    ///
    /// Work that must follow a committed write (cache invalidation) runs on a
    /// detached context so a caller hanging up cannot leave stale entries behind.
    pub fn detached(&self) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: None,
            identity: self.identity,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// User id of the caller, if a gate established one.
    pub fn actor(&self) -> Option<UserId> {
        self.identity.map(|i| i.user_id)
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fail fast if the context is already done.
    pub fn check(&self) -> Result<(), ContextError> {
        if self.cancel.is_cancelled() {
            return Err(ContextError::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(ContextError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Run `fut` to completion unless the context is cancelled or its deadline passes first.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        self.check()?;
        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ContextError::Cancelled),
            _ = expired => Err(ContextError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }

    /// [`run`](Self::run) for fallible work whose error type absorbs [`ContextError`].
    pub async fn guard<T, E, F>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<ContextError>,
    {
        self.run(fut).await?
    }
}
