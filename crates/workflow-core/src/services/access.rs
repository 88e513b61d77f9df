// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session authorization.
//!
//! This service is the only authority on whether a user may act on a
//! session. Callers consult it before any read or mutation scoped to one.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::context::Context;
use crate::domain::Session;
use crate::error::WorkflowError;
use crate::traits::SessionRepository;
use crate::types::{SessionId, UserId};

/// Grants session access to the session's owner and nobody else.
#[derive(Clone)]
pub struct SessionAccessService {
    sessions: Arc<dyn SessionRepository>,
}

impl SessionAccessService {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// True iff the session exists and belongs to `user_id`.
    ///
    /// A missing session or any lookup error denies.
    pub async fn can_access(&self, ctx: &Context, user_id: &UserId, session_id: &SessionId) -> bool {
        match self.sessions.find_by_id(ctx, session_id).await {
            Ok(session) => session.is_owned_by(user_id),
            Err(e) if e.is_not_found() => {
                debug!(user_id = %user_id, session_id = %session_id, "session not found, denying access");
                false
            }
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    session_id = %session_id,
                    error = %e,
                    "session lookup failed, denying access"
                );
                false
            }
        }
    }

    /// Loads the session if `user_id` owns it.
    ///
    /// Returns [`WorkflowError::AccessDenied`] for a foreign or missing
    /// session; cancellation errors pass through unchanged.
    pub async fn ensure_access(
        &self,
        ctx: &Context,
        user_id: &UserId,
        session_id: &SessionId,
    ) -> Result<Session, WorkflowError> {
        let denied = || WorkflowError::AccessDenied {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
        };
        match self.sessions.find_by_id(ctx, session_id).await {
            Ok(session) if session.is_owned_by(user_id) => Ok(session),
            Ok(_) => Err(denied()),
            Err(e) if e.is_cancellation() => Err(e),
            Err(e) => {
                if !e.is_not_found() {
                    warn!(
                        user_id = %user_id,
                        session_id = %session_id,
                        error = %e,
                        "session lookup failed, denying access"
                    );
                }
                Err(denied())
            }
        }
    }
}
