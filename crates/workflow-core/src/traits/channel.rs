// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contract for messaging platform connectors (Telegram, Discord, web).
//!
//! Connectors live outside this crate. They deliver inbound messages and
//! resolve platform identities to [`User`]s; the engine replies through
//! [`ChannelConnector::send_response`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::context::Context;
use crate::domain::User;
use crate::error::WorkflowError;
use crate::types::{Channel, UserId};

/// A message received from a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// The resolved engine user.
    pub user_id: UserId,
    /// The sender's identifier on the platform.
    pub channel_id: String,
    pub content: String,
    pub metadata: HashMap<String, String>,
}

/// A reply to deliver back to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingResponse {
    pub content: String,
    pub metadata: HashMap<String, String>,
}

impl OutgoingResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }
}

#[async_trait]
pub trait ChannelConnector: Send + Sync {
    /// Human-readable connector name, e.g. `"telegram"`.
    fn name(&self) -> &str;

    fn channel(&self) -> Channel;

    /// Takes the inbound message stream. Only the first call returns `Some`.
    async fn incoming(&self) -> Option<mpsc::Receiver<IncomingMessage>>;

    async fn send_response(
        &self,
        ctx: &Context,
        user_id: &UserId,
        response: OutgoingResponse,
    ) -> Result<(), WorkflowError>;

    /// Looks up the user for a platform identity.
    async fn get_user(&self, ctx: &Context, channel_user_id: &str) -> Result<User, WorkflowError>;

    /// Registers a new user for a platform identity.
    async fn create_user(&self, ctx: &Context, channel_user_id: &str)
    -> Result<User, WorkflowError>;

    async fn start(&self) -> Result<(), WorkflowError>;

    async fn stop(&self) -> Result<(), WorkflowError>;

    fn is_running(&self) -> bool;
}
