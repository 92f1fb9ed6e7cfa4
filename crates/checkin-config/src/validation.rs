// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as IANA timezone names, wall-clock times, and concurrency bounds.

use std::collections::HashSet;

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::diagnostic::ConfigError;
use crate::model::CheckinConfig;

/// Touchpoint offsets the engine knows how to schedule.
const SUPPORTED_DAYS: &[u32] = &[3, 7, 14];

/// Upper bound for in-flight items per batch.
const MAX_CONCURRENCY: usize = 64;

/// Store calls a dispatcher makes while holding a claim: subject, template,
/// classifier, content, and the final write-back.
pub const STORE_CALLS_PER_ITEM: u64 = 5;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
///
/// A malformed `campaign.send_window` is not an error: the window gate fails
/// open at runtime, so it is only reported as a warning here.
pub fn validate_config(config: &CheckinConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let campaign = &config.campaign;

    if campaign.timezone.parse::<Tz>().is_err() {
        errors.push(ConfigError::Validation {
            message: format!(
                "campaign.timezone `{}` is not a known IANA timezone",
                campaign.timezone
            ),
        });
    }

    if parse_hhmm(&campaign.local_send_time).is_none() {
        errors.push(ConfigError::Validation {
            message: format!(
                "campaign.local_send_time `{}` must be HH:MM",
                campaign.local_send_time
            ),
        });
    }

    if campaign.days.is_empty() {
        errors.push(ConfigError::Validation {
            message: "campaign.days must not be empty".to_string(),
        });
    }
    let mut seen_days = HashSet::new();
    for day in &campaign.days {
        if !SUPPORTED_DAYS.contains(day) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "campaign.days contains unsupported day {day} (expected 3, 7 or 14)"
                ),
            });
        } else if !seen_days.insert(*day) {
            errors.push(ConfigError::Validation {
                message: format!("campaign.days contains duplicate day {day}"),
            });
        }
    }

    for placeholder in ["{day}", "{branch}"] {
        if !campaign.template_key_pattern.contains(placeholder) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "campaign.template_key_pattern `{}` must contain `{placeholder}`",
                    campaign.template_key_pattern
                ),
            });
        }
    }

    if let Some(window) = campaign.send_window.as_deref()
        && !window_is_well_formed(window)
    {
        tracing::warn!(
            send_window = window,
            "campaign.send_window is malformed; sends will not be restricted by time of day"
        );
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let dispatch = &config.dispatch;
    if dispatch.concurrency == 0 || dispatch.concurrency > MAX_CONCURRENCY {
        errors.push(ConfigError::Validation {
            message: format!(
                "dispatch.concurrency must be between 1 and {MAX_CONCURRENCY}, got {}",
                dispatch.concurrency
            ),
        });
    }

    if dispatch.batch_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.batch_limit must be at least 1".to_string(),
        });
    }

    for (key, value) in [
        ("dispatch.interval_secs", dispatch.interval_secs),
        ("dispatch.send_timeout_secs", dispatch.send_timeout_secs),
        ("dispatch.store_timeout_secs", dispatch.store_timeout_secs),
        ("dispatch.lease_secs", dispatch.lease_secs),
        ("token.ttl_secs", config.token.ttl_secs),
        ("token.preview_ttl_secs", config.token.preview_ttl_secs),
    ] {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be greater than zero"),
            });
        }
    }

    let held = dispatch
        .send_timeout_secs
        .saturating_add(dispatch.store_timeout_secs.saturating_mul(STORE_CALLS_PER_ITEM));
    if dispatch.lease_secs <= held {
        errors.push(ConfigError::Validation {
            message: format!(
                "dispatch.lease_secs ({}) must exceed send_timeout_secs + \
                 {STORE_CALLS_PER_ITEM} x store_timeout_secs ({held})",
                dispatch.lease_secs
            ),
        });
    }
    if dispatch.batch_deadline_secs > dispatch.lease_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "dispatch.batch_deadline_secs ({}) must not exceed dispatch.lease_secs ({})",
                dispatch.batch_deadline_secs, dispatch.lease_secs
            ),
        });
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse a 24-hour `HH:MM` wall-clock time.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

fn window_is_well_formed(window: &str) -> bool {
    match window.split_once('-') {
        Some((start, end)) => match (parse_hhmm(start), parse_hhmm(end)) {
            (Some(s), Some(e)) => s != e,
            _ => false,
        },
        None => false,
    }
}
