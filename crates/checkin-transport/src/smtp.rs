// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email delivery over SMTP.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use checkin_config::model::EmailConfig;
use checkin_core::{
    AdapterType, CheckinError, Delivery, HealthStatus, MessageId, PluginAdapter, TransportAdapter,
};

/// Port that speaks TLS from the first byte rather than upgrading with STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Sends plain-text email through an SMTP relay.
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpTransport {
    pub fn new(
        host: &str,
        port: u16,
        credentials: Option<(String, SecretString)>,
        from: Mailbox,
    ) -> Result<Self, CheckinError> {
        let builder = if port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| CheckinError::Config(format!("invalid SMTP relay `{host}`: {e}")))?
        .port(port);

        let builder = match credentials {
            Some((user, password)) => builder.credentials(Credentials::new(
                user,
                password.expose_secret().to_string(),
            )),
            None => builder,
        };

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }

    /// Build from configuration. `None` when no SMTP host is set.
    pub fn from_config(config: &EmailConfig) -> Result<Option<Self>, CheckinError> {
        let Some(host) = config.smtp_host.as_deref() else {
            return Ok(None);
        };
        let from = config
            .from_address
            .as_deref()
            .ok_or_else(|| {
                CheckinError::Config(
                    "email.from_address is required when email.smtp_host is set".into(),
                )
            })?
            .parse::<Mailbox>()
            .map_err(|e| CheckinError::Config(format!("invalid email.from_address: {e}")))?;

        let credentials = match (&config.smtp_username, &config.smtp_password) {
            (Some(user), Some(password)) => {
                Some((user.clone(), SecretString::from(password.clone())))
            }
            (None, None) => None,
            _ => {
                return Err(CheckinError::Config(
                    "email.smtp_username and email.smtp_password must be set together".into(),
                ));
            }
        };

        Self::new(host, config.smtp_port, credentials, from).map(Some)
    }
}

/// Build the plain-text message for a delivery.
pub fn build_message(from: &Mailbox, delivery: &Delivery) -> Result<Message, CheckinError> {
    let to: Mailbox = delivery.address.parse().map_err(|e| CheckinError::Transport {
        message: format!("invalid recipient address: {e}"),
        source: Some(Box::new(e)),
    })?;
    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(delivery.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(delivery.body.clone())
        .map_err(|e| CheckinError::Transport {
            message: format!("failed to build email: {e}"),
            source: Some(Box::new(e)),
        })
}

#[async_trait]
impl PluginAdapter for SmtpTransport {
    fn name(&self) -> &str {
        "smtp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, CheckinError> {
        match self.mailer.test_connection().await {
            Ok(true) => Ok(HealthStatus::Healthy),
            Ok(false) => Ok(HealthStatus::Degraded("SMTP relay refused NOOP".to_string())),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("SMTP relay unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), CheckinError> {
        Ok(())
    }
}

#[async_trait]
impl TransportAdapter for SmtpTransport {
    async fn send(&self, delivery: &Delivery) -> Result<MessageId, CheckinError> {
        let message = build_message(&self.from, delivery)?;
        let response = self
            .mailer
            .send(message)
            .await
            .map_err(|e| CheckinError::Transport {
                message: format!("SMTP delivery failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        let reply = response.message().collect::<Vec<_>>().join(" ");
        debug!(code = %response.code(), reply = %reply, "SMTP relay accepted message");
        Ok(MessageId(format!("smtp-{}", uuid::Uuid::new_v4())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_core::Channel;

    fn delivery(address: &str) -> Delivery {
        Delivery {
            channel: Channel::Email,
            address: address.to_string(),
            subject: "Day 3 check-in".to_string(),
            body: "Hi there,\n\nHow are you feeling?".to_string(),
        }
    }

    fn from() -> Mailbox {
        "Check-ins <checkin@example.com>".parse().unwrap()
    }

    #[test]
    fn message_carries_subject_and_recipient() {
        let message = build_message(&from(), &delivery("pat@example.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Day 3 check-in"));
        assert!(raw.contains("To: pat@example.com"));
        assert!(raw.contains("How are you feeling?"));
    }

    #[test]
    fn invalid_recipient_is_transport_error() {
        let err = build_message(&from(), &delivery("not an address")).unwrap_err();
        assert!(matches!(err, CheckinError::Transport { .. }));
        assert!(err.to_string().starts_with("invalid recipient address"));
    }

    #[test]
    fn from_config_validates_fields() {
        let mut config = EmailConfig::default();
        assert!(SmtpTransport::from_config(&config).unwrap().is_none());

        config.smtp_host = Some("smtp.example.com".to_string());
        assert!(matches!(
            SmtpTransport::from_config(&config),
            Err(CheckinError::Config(m)) if m.contains("from_address")
        ));

        config.from_address = Some("Check-ins <checkin@example.com>".to_string());
        config.smtp_username = Some("user".to_string());
        assert!(matches!(
            SmtpTransport::from_config(&config),
            Err(CheckinError::Config(m)) if m.contains("together")
        ));

        config.smtp_password = Some("pw".to_string());
        assert!(SmtpTransport::from_config(&config).unwrap().is_some());
    }
}
