// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsed campaign settings shared by the scheduler and dispatcher.

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;

use checkin_config::model::CampaignConfig;
use checkin_config::validation::parse_hhmm;
use checkin_core::{Branch, CheckinError, Day};

/// Campaign settings with the timezone, send time, and day offsets parsed.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub enabled: bool,
    /// IANA name, kept as text so the window gate can fail open on it.
    pub timezone: String,
    pub tz: Tz,
    pub send_window: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub sandbox: bool,
    pub local_send_time: NaiveTime,
    pub days: Vec<Day>,
    pub template_key_pattern: String,
    pub public_base_url: String,
}

impl Campaign {
    pub fn from_config(config: &CampaignConfig) -> Result<Self, CheckinError> {
        let tz: Tz = config.timezone.parse().map_err(|_| {
            CheckinError::Config(format!("unknown campaign timezone `{}`", config.timezone))
        })?;
        let local_send_time = parse_hhmm(&config.local_send_time).ok_or_else(|| {
            CheckinError::Config(format!(
                "campaign.local_send_time `{}` must be HH:MM",
                config.local_send_time
            ))
        })?;
        let days = config
            .days
            .iter()
            .map(|d| Day::try_from(*d).map_err(CheckinError::Config))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enabled: config.enabled,
            timezone: config.timezone.clone(),
            tz,
            send_window: config.send_window.clone(),
            start_date: config.start_date,
            sandbox: config.sandbox,
            local_send_time,
            days,
            template_key_pattern: config.template_key_pattern.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Template key for a touchpoint, e.g. `day3.same`.
    pub fn template_key(&self, day: Day, branch: Branch) -> String {
        template_key(&self.template_key_pattern, day, branch)
    }

    /// One-tap response URL for a signed token.
    pub fn respond_url(&self, token: &str) -> String {
        format!("{}/checkin/respond?t={token}", self.public_base_url)
    }
}

/// Expand `{day}` and `{branch}` in a key pattern.
pub fn template_key(pattern: &str, day: Day, branch: Branch) -> String {
    pattern
        .replace("{day}", &day.to_string())
        .replace("{branch}", &branch.to_string())
}
