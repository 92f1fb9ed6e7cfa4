// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log-only transport for local runs and staging.

use async_trait::async_trait;
use tracing::info;

use checkin_core::{
    AdapterType, CheckinError, Delivery, HealthStatus, MessageId, PluginAdapter, TransportAdapter,
};

/// Accepts every delivery and writes a summary to the log instead of sending.
///
/// The address and body are not logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

#[async_trait]
impl PluginAdapter for LogTransport {
    fn name(&self) -> &str {
        "log"
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
impl TransportAdapter for LogTransport {
    async fn send(&self, delivery: &Delivery) -> Result<MessageId, CheckinError> {
        let id = format!("log-{}", uuid::Uuid::new_v4());
        info!(
            message_id = %id,
            channel = %delivery.channel,
            subject = %delivery.subject,
            body_chars = delivery.body.chars().count(),
            "delivery logged, not sent"
        );
        Ok(MessageId(id))
    }
}
