// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes deliveries to the transport for their channel.

use std::sync::Arc;

use async_trait::async_trait;

use checkin_core::{
    AdapterType, Channel, CheckinError, Delivery, HealthStatus, MessageId, PluginAdapter,
    TransportAdapter,
};

/// One optional transport per channel.
pub struct ChannelRouter {
    email: Option<Arc<dyn TransportAdapter>>,
    sms: Option<Arc<dyn TransportAdapter>>,
}

impl ChannelRouter {
    pub fn new(
        email: Option<Arc<dyn TransportAdapter>>,
        sms: Option<Arc<dyn TransportAdapter>>,
    ) -> Self {
        Self { email, sms }
    }

    fn route(&self, channel: Channel) -> Option<&Arc<dyn TransportAdapter>> {
        match channel {
            Channel::Email => self.email.as_ref(),
            Channel::Sms => self.sms.as_ref(),
        }
    }

    pub fn has_channel(&self, channel: Channel) -> bool {
        self.route(channel).is_some()
    }

    pub fn email_name(&self) -> Option<&str> {
        self.email.as_ref().map(|t| t.name())
    }

    pub fn sms_name(&self) -> Option<&str> {
        self.sms.as_ref().map(|t| t.name())
    }

    fn transports(&self) -> impl Iterator<Item = &Arc<dyn TransportAdapter>> {
        self.email.iter().chain(self.sms.iter())
    }
}

#[async_trait]
impl PluginAdapter for ChannelRouter {
    fn name(&self) -> &str {
        "channel-router"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, CheckinError> {
        if self.email.is_none() && self.sms.is_none() {
            return Ok(HealthStatus::Unhealthy(
                "no delivery transport configured".to_string(),
            ));
        }
        for transport in self.transports() {
            match transport.health_check().await? {
                HealthStatus::Healthy => {}
                other => return Ok(other),
            }
        }
        if self.email.is_none() || self.sms.is_none() {
            return Ok(HealthStatus::Degraded(
                "one delivery channel is not configured".to_string(),
            ));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CheckinError> {
        for transport in self.transports() {
            transport.shutdown().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TransportAdapter for ChannelRouter {
    async fn send(&self, delivery: &Delivery) -> Result<MessageId, CheckinError> {
        let transport = self.route(delivery.channel).ok_or_else(|| {
            CheckinError::transport(format!(
                "no transport configured for channel {}",
                delivery.channel
            ))
        })?;
        transport.send(delivery).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogTransport;

    fn delivery(channel: Channel) -> Delivery {
        Delivery {
            channel,
            address: "someone".to_string(),
            subject: "Day 3 check-in".to_string(),
            body: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn routes_by_channel() {
        let router = ChannelRouter::new(Some(Arc::new(LogTransport)), None);
        assert!(router.send(&delivery(Channel::Email)).await.is_ok());

        let err = router.send(&delivery(Channel::Sms)).await.unwrap_err();
        assert_eq!(err.to_string(), "no transport configured for channel sms");
    }

    #[tokio::test]
    async fn health_reflects_configured_channels() {
        let none = ChannelRouter::new(None, None);
        assert!(matches!(
            none.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));

        let one = ChannelRouter::new(Some(Arc::new(LogTransport)), None);
        assert!(matches!(
            one.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));

        let both = ChannelRouter::new(Some(Arc::new(LogTransport)), Some(Arc::new(LogTransport)));
        assert_eq!(both.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
