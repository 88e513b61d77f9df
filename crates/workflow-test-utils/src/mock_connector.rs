// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel connector for deterministic testing.
//!
//! `MockConnector` implements `ChannelConnector` with injectable inbound
//! messages and captured outbound responses. Identities resolve through a
//! real [`UserDirectory`], so users it creates land in the backing store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;
use workflow_core::{
    Channel, ChannelConnector, Context, IncomingMessage, OutgoingResponse, User, UserDirectory,
    UserId, WorkflowError,
};

const INBOUND_CAPACITY: usize = 64;

/// An in-memory connector for one channel.
///
/// Provides two queues:
/// - **inbound**: messages passed to `inject()` arrive on the `incoming()` receiver
/// - **sent**: responses passed to `send_response()` are kept for `sent_responses()`
pub struct MockConnector {
    channel: Channel,
    directory: UserDirectory,
    inbound_tx: mpsc::Sender<IncomingMessage>,
    inbound_rx: Mutex<Option<mpsc::Receiver<IncomingMessage>>>,
    sent: Arc<Mutex<Vec<(UserId, OutgoingResponse)>>>,
    running: AtomicBool,
}

impl MockConnector {
    pub fn new(channel: Channel, directory: UserDirectory) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
        Self {
            channel,
            directory,
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
            sent: Arc::new(Mutex::new(Vec::new())),
            running: AtomicBool::new(false),
        }
    }

    /// Resolves `channel_user_id` and queues a message from that user.
    ///
    /// Fails while the connector is stopped.
    pub async fn inject(
        &self,
        ctx: &Context,
        channel_user_id: &str,
        content: &str,
    ) -> Result<User, WorkflowError> {
        if !self.is_running() {
            return Err(WorkflowError::storage_msg(format!(
                "{} connector is not running",
                self.channel
            )));
        }
        let user = self.directory.resolve(ctx, self.channel, channel_user_id).await?;
        let message = IncomingMessage {
            user_id: user.id().clone(),
            channel_id: channel_user_id.to_string(),
            content: content.to_string(),
            metadata: HashMap::new(),
        };
        self.inbound_tx
            .send(message)
            .await
            .map_err(|_| WorkflowError::storage_msg("inbound receiver dropped"))?;
        Ok(user)
    }

    /// Get all responses that were sent through `send_response()`.
    pub async fn sent_responses(&self) -> Vec<(UserId, OutgoingResponse)> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl ChannelConnector for MockConnector {
    fn name(&self) -> &str {
        "mock"
    }

    fn channel(&self) -> Channel {
        self.channel
    }

    async fn incoming(&self) -> Option<mpsc::Receiver<IncomingMessage>> {
        self.inbound_rx.lock().await.take()
    }

    async fn send_response(
        &self,
        ctx: &Context,
        user_id: &UserId,
        response: OutgoingResponse,
    ) -> Result<(), WorkflowError> {
        ctx.check()?;
        debug!(user_id = %user_id, len = response.content.len(), "mock response sent");
        self.sent.lock().await.push((user_id.clone(), response));
        Ok(())
    }

    async fn get_user(&self, ctx: &Context, channel_user_id: &str) -> Result<User, WorkflowError> {
        self.directory.find(ctx, self.channel, channel_user_id).await
    }

    async fn create_user(
        &self,
        ctx: &Context,
        channel_user_id: &str,
    ) -> Result<User, WorkflowError> {
        self.directory.register(ctx, self.channel, channel_user_id).await
    }

    async fn start(&self) -> Result<(), WorkflowError> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), WorkflowError> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
