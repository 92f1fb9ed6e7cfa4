// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HMAC-SHA256 token signing and constant-time verification.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use checkin_config::model::TokenConfig;
use checkin_core::{CheckinError, Day, ResponseValue};

type HmacSha256 = Hmac<Sha256>;

/// The single, deliberately opaque verification failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid")]
pub struct InvalidToken;

/// Claims carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionClaims {
    pub subject_id: String,
    pub day: Day,
    pub value: ResponseValue,
    pub expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WirePayload {
    s: String,
    d: Day,
    v: ResponseValue,
    e: i64,
}

/// Signs and verifies one-tap response tokens.
///
/// The keyed MAC is built once at construction; every sign or verify clones it.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
    link_ttl: Duration,
    preview_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"[REDACTED]")
            .field("link_ttl", &self.link_ttl)
            .field("preview_ttl", &self.preview_ttl)
            .finish()
    }
}

impl TokenCodec {
    /// Default lifetime of links in outbound messages.
    pub const DEFAULT_LINK_TTL: Duration = Duration::days(7);

    /// Default lifetime of links in previews.
    pub const DEFAULT_PREVIEW_TTL: Duration = Duration::hours(1);

    /// Build a codec from a signing secret. An empty secret is a configuration error.
    pub fn new(secret: SecretString) -> Result<Self, CheckinError> {
        let raw = secret.expose_secret();
        if raw.trim().is_empty() {
            return Err(CheckinError::Config(
                "token.secret must be set to a non-empty value".to_string(),
            ));
        }
        let mac = HmacSha256::new_from_slice(raw.as_bytes())
            .map_err(|e| CheckinError::Config(format!("token.secret rejected: {e}")))?;
        Ok(Self {
            mac,
            link_ttl: Self::DEFAULT_LINK_TTL,
            preview_ttl: Self::DEFAULT_PREVIEW_TTL,
        })
    }

    /// Build a codec from the `[token]` config section. A missing secret is fatal.
    pub fn from_config(config: &TokenConfig) -> Result<Self, CheckinError> {
        let secret = config.secret.clone().ok_or_else(|| {
            CheckinError::Config(
                "token.secret is required (set it in checkin.toml or CHECKIN_TOKEN_SECRET)"
                    .to_string(),
            )
        })?;
        let mut codec = Self::new(SecretString::from(secret))?;
        codec.link_ttl = secs(config.ttl_secs);
        codec.preview_ttl = secs(config.preview_ttl_secs);
        Ok(codec)
    }

    pub fn link_ttl(&self) -> Duration {
        self.link_ttl
    }

    pub fn preview_ttl(&self) -> Duration {
        self.preview_ttl
    }

    /// Sign a token expiring `ttl` from now.
    pub fn sign(&self, subject_id: &str, day: Day, value: ResponseValue, ttl: Duration) -> String {
        self.sign_at(subject_id, day, value, ttl, Utc::now())
    }

    /// Sign a token expiring `ttl` after `now`.
    pub fn sign_at(
        &self,
        subject_id: &str,
        day: Day,
        value: ResponseValue,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> String {
        let exp = now
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .timestamp();
        let payload = serde_json::json!({
            "s": subject_id,
            "d": day.as_u32(),
            "v": value,
            "e": exp,
        })
        .to_string();
        let encoded = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        let signature = self.signature(&encoded);
        format!("{encoded}.{signature}")
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<ActionClaims, InvalidToken> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against `now`. Valid only while `now < exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<ActionClaims, InvalidToken> {
        let (payload, signature) = token.split_once('.').ok_or(InvalidToken)?;
        if signature.contains('.') || payload.is_empty() || signature.is_empty() {
            return Err(InvalidToken);
        }

        let expected = self.signature(payload);
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            tracing::debug!("token signature mismatch");
            return Err(InvalidToken);
        }

        let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|_| InvalidToken)?;
        let wire: WirePayload = serde_json::from_slice(&bytes).map_err(|_| InvalidToken)?;
        if wire.s.is_empty() || now.timestamp() >= wire.e {
            return Err(InvalidToken);
        }
        let expires_at = DateTime::from_timestamp(wire.e, 0).ok_or(InvalidToken)?;

        Ok(ActionClaims {
            subject_id: wire.s,
            day: wire.d,
            value: wire.v,
            expires_at,
        })
    }

    fn signature(&self, encoded_payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(encoded_payload.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

fn secs(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX).min(i64::MAX / 1_000))
}
