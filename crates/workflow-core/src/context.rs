// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cancellation context passed to every repository and service operation.
//!
//! A [`Context`] combines a [`CancellationToken`] with an optional deadline.
//! Operations wrap their backend future in [`Context::run`], which aborts at
//! the next suspension point once the token fires or the deadline passes.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::WorkflowError;

/// Cancellation scope with an optional deadline.
///
/// Cloning shares the token; [`child`](Context::child) and the `with_*`
/// constructors derive a scope that is cancelled with its parent but can
/// also be cancelled on its own.
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A root context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Wraps an existing token, e.g. a process shutdown token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derives a child scope with the same deadline.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derives a child scope that expires after `timeout`.
    ///
    /// The earlier of the parent's deadline and the new one wins.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derives a child scope that expires at `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancels this scope and every scope derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns the cancellation error if the scope is already done.
    pub fn check(&self) -> Result<(), WorkflowError> {
        if self.token.is_cancelled() {
            return Err(WorkflowError::Cancelled);
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(WorkflowError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drives `fut` unless the scope is cancelled or its deadline passes first.
    ///
    /// Dropping `fut` on abort is the cancellation mechanism, so it only suits
    /// reads and other work whose effects vanish with the future. Writes have
    /// to check the scope at their commit point instead and report what the
    /// backend actually committed.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, WorkflowError>
    where
        F: Future<Output = Result<T, WorkflowError>>,
    {
        self.check()?;
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Err(WorkflowError::Cancelled),
                    _ = tokio::time::sleep_until(deadline) => Err(WorkflowError::DeadlineExceeded),
                    res = fut => res,
                }
            }
            None => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Err(WorkflowError::Cancelled),
                    res = fut => res,
                }
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
