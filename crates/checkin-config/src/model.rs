// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the check-in outreach engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CheckinConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Campaign scheduling and send-window settings.
    #[serde(default)]
    pub campaign: CampaignConfig,

    /// One-tap response token settings.
    #[serde(default)]
    pub token: TokenConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Dispatcher batch and concurrency settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// SMTP email transport settings.
    #[serde(default)]
    pub email: EmailConfig,

    /// Twilio SMS transport settings.
    #[serde(default)]
    pub sms: SmsConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "checkin".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Campaign configuration: feature flag, timezone, send window, start date.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignConfig {
    /// Global feature flag. When false, enqueue skips every subject.
    #[serde(default = "default_campaign_enabled")]
    pub enabled: bool,

    /// IANA timezone for the send window, start date, and scheduled send time.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Daily send window as `"HH:MM-HH:MM"` local time. `None` allows any time.
    #[serde(default = "default_send_window")]
    pub send_window: Option<String>,

    /// Campaign start date (local). Nothing is sent before it.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Suppress every real send, leaving items queued.
    #[serde(default)]
    pub sandbox: bool,

    /// Local wall-clock time at which scheduled touchpoints fall due.
    #[serde(default = "default_local_send_time")]
    pub local_send_time: String,

    /// Touchpoint offsets in days.
    #[serde(default = "default_days")]
    pub days: Vec<u32>,

    /// Template key convention; `{day}` and `{branch}` are substituted.
    #[serde(default = "default_template_key_pattern")]
    pub template_key_pattern: String,

    /// Base URL for one-tap response links.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            enabled: default_campaign_enabled(),
            timezone: default_timezone(),
            send_window: default_send_window(),
            start_date: None,
            sandbox: false,
            local_send_time: default_local_send_time(),
            days: default_days(),
            template_key_pattern: default_template_key_pattern(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_campaign_enabled() -> bool {
    true
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_send_window() -> Option<String> {
    Some("08:00-20:00".to_string())
}

fn default_local_send_time() -> String {
    "10:00".to_string()
}

fn default_days() -> Vec<u32> {
    vec![3, 7, 14]
}

fn default_template_key_pattern() -> String {
    "day{day}.{branch}".to_string()
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:3400".to_string()
}

/// Token codec configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// HMAC signing secret. Required at startup.
    #[serde(default)]
    pub secret: Option<String>,

    /// Lifetime of links embedded in outbound messages.
    #[serde(default = "default_token_ttl_secs")]
    pub ttl_secs: u64,

    /// Lifetime of links embedded in previews.
    #[serde(default = "default_preview_ttl_secs")]
    pub preview_ttl_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: None,
            ttl_secs: default_token_ttl_secs(),
            preview_ttl_secs: default_preview_ttl_secs(),
        }
    }
}

fn default_token_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_preview_ttl_secs() -> u64 {
    60 * 60
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL mode for concurrent reads.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("checkin").join("checkin.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "checkin.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Maximum items processed per batch.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: u32,

    /// Maximum items in flight within one batch.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Interval between batches in `serve` mode.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Items not started within this many seconds stay queued for the next batch.
    #[serde(default = "default_batch_deadline_secs")]
    pub batch_deadline_secs: u64,

    /// Timeout for a single delivery attempt.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,

    /// Timeout for a single store call.
    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,

    /// Claim lease held on an item while it is processed, counted from the claim.
    ///
    /// Must outlast one delivery plus every store call made after the claim,
    /// and must not be shorter than the batch deadline.
    #[serde(default = "default_lease_secs")]
    pub lease_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_limit: default_batch_limit(),
            concurrency: default_concurrency(),
            interval_secs: default_interval_secs(),
            batch_deadline_secs: default_batch_deadline_secs(),
            send_timeout_secs: default_send_timeout_secs(),
            store_timeout_secs: default_store_timeout_secs(),
            lease_secs: default_lease_secs(),
        }
    }
}

fn default_batch_limit() -> u32 {
    50
}

fn default_concurrency() -> usize {
    8
}

fn default_interval_secs() -> u64 {
    300
}

fn default_batch_deadline_secs() -> u64 {
    240
}

fn default_send_timeout_secs() -> u64 {
    15
}

fn default_store_timeout_secs() -> u64 {
    5
}

fn default_lease_secs() -> u64 {
    300
}

/// SMTP transport configuration. `smtp_host = None` disables email delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    #[serde(default)]
    pub smtp_host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,

    /// Sender mailbox, e.g. `"Check-ins <checkin@example.com>"`.
    #[serde(default)]
    pub from_address: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            from_address: None,
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

/// Twilio SMS transport configuration. `account_sid = None` disables SMS delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmsConfig {
    #[serde(default)]
    pub account_sid: Option<String>,

    #[serde(default)]
    pub auth_token: Option<String>,

    #[serde(default)]
    pub from_number: Option<String>,

    /// API base URL (overridable for testing).
    #[serde(default = "default_sms_api_base")]
    pub api_base: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            from_number: None,
            api_base: default_sms_api_base(),
        }
    }
}

fn default_sms_api_base() -> String {
    "https://api.twilio.com".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token for the admin dispatch endpoint. `None` rejects all admin calls.
    #[serde(default)]
    pub admin_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            host: default_gateway_host(),
            port: default_gateway_port(),
            admin_token: None,
        }
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3400
}
