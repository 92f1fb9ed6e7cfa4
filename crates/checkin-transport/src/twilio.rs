// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS delivery through the Twilio Messages API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use checkin_config::model::SmsConfig;
use checkin_core::{
    AdapterType, CheckinError, Delivery, HealthStatus, MessageId, PluginAdapter, TransportAdapter,
};

/// Twilio's documented API version segment.
const API_VERSION: &str = "2010-04-01";

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<i64>,
    message: String,
}

/// Sends SMS messages with Twilio.
pub struct TwilioTransport {
    client: reqwest::Client,
    api_base: String,
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
}

impl std::fmt::Debug for TwilioTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioTransport")
            .field("api_base", &self.api_base)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .finish()
    }
}

impl TwilioTransport {
    pub fn new(
        api_base: impl Into<String>,
        account_sid: impl Into<String>,
        auth_token: SecretString,
        from_number: impl Into<String>,
    ) -> Result<Self, CheckinError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CheckinError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            account_sid: account_sid.into(),
            auth_token,
            from_number: from_number.into(),
        })
    }

    /// Build from configuration. `None` when no account SID is set.
    pub fn from_config(config: &SmsConfig) -> Result<Option<Self>, CheckinError> {
        let Some(account_sid) = config.account_sid.as_deref() else {
            return Ok(None);
        };
        let auth_token = config.auth_token.as_deref().ok_or_else(|| {
            CheckinError::Config("sms.auth_token is required when sms.account_sid is set".into())
        })?;
        let from_number = config.from_number.as_deref().ok_or_else(|| {
            CheckinError::Config("sms.from_number is required when sms.account_sid is set".into())
        })?;
        Self::new(
            config.api_base.as_str(),
            account_sid,
            SecretString::from(auth_token.to_string()),
            from_number,
        )
        .map(Some)
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{API_VERSION}/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        )
    }
}

#[async_trait]
impl PluginAdapter for TwilioTransport {
    fn name(&self) -> &str {
        "twilio"
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
impl TransportAdapter for TwilioTransport {
    async fn send(&self, delivery: &Delivery) -> Result<MessageId, CheckinError> {
        let form = serde_urlencoded::to_string([
            ("To", delivery.address.as_str()),
            ("From", self.from_number.as_str()),
            ("Body", delivery.body.as_str()),
        ])
        .map_err(|e| CheckinError::Transport {
            message: format!("failed to encode SMS form: {e}"),
            source: Some(Box::new(e)),
        })?;

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(|e| CheckinError::Transport {
                message: format!("SMS request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, "twilio response received");

        if status.is_success() {
            let resource: MessageResource =
                serde_json::from_str(&body).map_err(|e| CheckinError::Transport {
                    message: format!("failed to parse Twilio response: {e}"),
                    source: Some(Box::new(e)),
                })?;
            return Ok(MessageId(resource.sid));
        }

        let message = match serde_json::from_str::<ApiError>(&body) {
            Ok(ApiError {
                code: Some(code),
                message,
            }) => format!("Twilio error {code}: {message}"),
            Ok(ApiError { code: None, message }) => format!("Twilio error: {message}"),
            Err(_) => format!("Twilio returned {status}: {body}"),
        };
        Err(CheckinError::transport(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_core::Channel;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MESSAGES_PATH: &str = "/2010-04-01/Accounts/AC123/Messages.json";

    fn transport(base: &str) -> TwilioTransport {
        TwilioTransport::new(base, "AC123", SecretString::from("tok".to_string()), "+15550001111")
            .unwrap()
    }

    fn delivery() -> Delivery {
        Delivery {
            channel: Channel::Sms,
            address: "+15551234567".to_string(),
            subject: "Day 3 check-in".to_string(),
            body: "How are you? Reply & tap a link".to_string(),
        }
    }

    #[tokio::test]
    async fn posts_form_and_returns_sid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MESSAGES_PATH))
            .and(header("authorization", "Basic QUMxMjM6dG9r"))
            .and(body_string_contains("To=%2B15551234567"))
            .and(body_string_contains("From=%2B15550001111"))
            .and(body_string_contains("Reply+%26+tap"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"sid": "SM42"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = transport(&server.uri()).send(&delivery()).await.unwrap();
        assert_eq!(id, MessageId("SM42".to_string()));
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MESSAGES_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 21211,
                "message": "The 'To' number is not a valid phone number.",
                "status": 400
            })))
            .mount(&server)
            .await;

        let err = transport(&server.uri()).send(&delivery()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Twilio error 21211: The 'To' number is not a valid phone number."
        );
    }

    #[tokio::test]
    async fn non_json_error_includes_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = transport(&server.uri()).send(&delivery()).await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn from_config_requires_complete_credentials() {
        let mut config = SmsConfig::default();
        assert!(TwilioTransport::from_config(&config).unwrap().is_none());

        config.account_sid = Some("AC123".to_string());
        config.auth_token = Some("tok".to_string());
        assert!(matches!(
            TwilioTransport::from_config(&config),
            Err(CheckinError::Config(m)) if m.contains("from_number")
        ));

        config.from_number = Some("+15550001111".to_string());
        let t = TwilioTransport::from_config(&config).unwrap().unwrap();
        assert!(!format!("{t:?}").contains("tok\""));
    }
}
