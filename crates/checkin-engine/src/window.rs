// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send-window and campaign start-date gates.
//!
//! Both gates are pure. The window gate fails open: a missing, malformed, or
//! zero-length window and an unknown timezone all allow the send, each with
//! its own [`WindowReason`] so callers can log why.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use strum::{Display, IntoStaticStr};

use checkin_config::validation::parse_hhmm;

/// Why the window gate reached its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum WindowReason {
    InsideWindow,
    OutsideWindow,
    NoWindow,
    MalformedWindow,
    EmptyWindow,
    UnknownTimezone,
}

/// Result of evaluating the send window for one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCheck {
    pub allowed: bool,
    /// Wall-clock time in the campaign zone, when the zone is known.
    pub local_time: Option<NaiveDateTime>,
    pub reason: WindowReason,
}

impl WindowCheck {
    fn open(local_time: Option<NaiveDateTime>, reason: WindowReason) -> Self {
        Self {
            allowed: true,
            local_time,
            reason,
        }
    }
}

/// Parse `"HH:MM-HH:MM"` into start and end times.
pub fn parse_window(window: &str) -> Result<(NaiveTime, NaiveTime), WindowReason> {
    let (start, end) = window.split_once('-').ok_or(WindowReason::MalformedWindow)?;
    let start = parse_hhmm(start).ok_or(WindowReason::MalformedWindow)?;
    let end = parse_hhmm(end).ok_or(WindowReason::MalformedWindow)?;
    if start == end {
        return Err(WindowReason::EmptyWindow);
    }
    Ok((start, end))
}

fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Whether `instant` falls inside the daily send window in `timezone`.
///
/// Start is inclusive and end exclusive. A window whose start is later than
/// its end wraps past midnight.
pub fn is_within_window(
    instant: DateTime<Utc>,
    timezone: &str,
    window: Option<&str>,
) -> WindowCheck {
    let Ok(tz) = timezone.parse::<Tz>() else {
        return WindowCheck::open(None, WindowReason::UnknownTimezone);
    };
    let local = instant.with_timezone(&tz).naive_local();

    let Some(window) = window.map(str::trim).filter(|s| !s.is_empty()) else {
        return WindowCheck::open(Some(local), WindowReason::NoWindow);
    };
    let (start, end) = match parse_window(window) {
        Ok(bounds) => bounds,
        Err(reason) => return WindowCheck::open(Some(local), reason),
    };

    let now = minute_of_day(local.time());
    let (start, end) = (minute_of_day(start), minute_of_day(end));
    let inside = if start < end {
        start <= now && now < end
    } else {
        now >= start || now < end
    };

    WindowCheck {
        allowed: inside,
        local_time: Some(local),
        reason: if inside {
            WindowReason::InsideWindow
        } else {
            WindowReason::OutsideWindow
        },
    }
}

/// Whether the local date of `instant` in `timezone` is before `start_date`.
///
/// No start date means the campaign has started. An unknown timezone falls
/// back to the UTC date.
pub fn is_before_start(
    instant: DateTime<Utc>,
    start_date: Option<NaiveDate>,
    timezone: &str,
) -> bool {
    let Some(start) = start_date else {
        return false;
    };
    let local_date = match timezone.parse::<Tz>() {
        Ok(tz) => instant.with_timezone(&tz).date_naive(),
        Err(_) => instant.date_naive(),
    };
    local_date < start
}
