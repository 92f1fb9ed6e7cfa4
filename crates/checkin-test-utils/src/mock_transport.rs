// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock delivery transport for deterministic testing.
//!
//! `MockTransport` implements `TransportAdapter` and captures every delivery
//! for assertion in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use checkin_core::{
    AdapterType, CheckinError, Delivery, HealthStatus, MessageId, PluginAdapter, TransportAdapter,
};

/// A mock transport that records deliveries.
///
/// A failing transport still records the attempt so tests can assert that
/// delivery was tried.
pub struct MockTransport {
    sent: Arc<Mutex<Vec<Delivery>>>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl MockTransport {
    /// A transport that accepts every delivery.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failure: None,
            delay: None,
        }
    }

    /// A transport that rejects every delivery with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    /// Sleep for `delay` before answering each send.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All deliveries passed to `send()`.
    pub async fn sent_messages(&self) -> Vec<Delivery> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, CheckinError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CheckinError> {
        Ok(())
    }
}

#[async_trait]
impl TransportAdapter for MockTransport {
    async fn send(&self, delivery: &Delivery) -> Result<MessageId, CheckinError> {
        self.sent.lock().await.push(delivery.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(message) => Err(CheckinError::transport(message.clone())),
            None => Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4()))),
        }
    }
}
