// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Enqueuer: turns a completed questionnaire into scheduled touchpoints.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Days, Duration, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use strum::{Display, IntoStaticStr};
use tracing::{debug, info};

use checkin_core::{Branch, CheckinError, Day, NewQueueItem, StorageAdapter};

use crate::campaign::Campaign;
use crate::timeout::{default_store_timeout, within};

/// Why a subject was not enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Disabled,
    SubjectNotFound,
    Urgent,
    Purchased,
    NoContact,
}

/// Result of one enqueue call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnqueueOutcome {
    /// Touchpoints that did not exist before this call.
    pub created: usize,
    pub skipped_reason: Option<SkipReason>,
}

impl EnqueueOutcome {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            created: 0,
            skipped_reason: Some(reason),
        }
    }
}

/// Schedules the configured touchpoints for a subject.
pub struct Scheduler {
    store: Arc<dyn StorageAdapter>,
    campaign: Campaign,
    store_timeout: std::time::Duration,
}

impl Scheduler {
    pub fn new(store: Arc<dyn StorageAdapter>, campaign: Campaign) -> Self {
        Self {
            store,
            campaign,
            store_timeout: default_store_timeout(),
        }
    }

    /// Bound every store call made while enqueuing.
    pub fn with_store_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Enqueue every configured day for `subject_id`.
    ///
    /// Idempotent: rows are upserted on `(subject_id, day)` and only their
    /// `due_at` is refreshed on repeat calls.
    pub async fn enqueue(&self, subject_id: &str) -> Result<EnqueueOutcome, CheckinError> {
        if !self.campaign.enabled {
            debug!(subject_id, "campaign disabled, not enqueuing");
            return Ok(EnqueueOutcome::skipped(SkipReason::Disabled));
        }

        let limit = self.store_timeout;
        let Some(subject) = within(limit, self.store.get_subject(subject_id)).await? else {
            return Ok(EnqueueOutcome::skipped(SkipReason::SubjectNotFound));
        };
        if subject.is_urgent() {
            return Ok(EnqueueOutcome::skipped(SkipReason::Urgent));
        }
        if within(limit, self.store.count_successful_payments(subject_id)).await? > 0 {
            return Ok(EnqueueOutcome::skipped(SkipReason::Purchased));
        }
        let Some(channel) = subject.preferred_channel() else {
            return Ok(EnqueueOutcome::skipped(SkipReason::NoContact));
        };

        let existing: HashSet<Day> = within(limit, self.store.queue_items_for_subject(subject_id))
            .await?
            .into_iter()
            .map(|item| item.day)
            .collect();

        let mut created = 0;
        for &day in &self.campaign.days {
            let due_at = due_at(
                subject.created_at,
                day,
                self.campaign.tz,
                self.campaign.local_send_time,
            )
            .ok_or_else(|| {
                CheckinError::Internal(format!("due date out of range for day {day}"))
            })?;
            let item = NewQueueItem {
                subject_id: subject_id.to_string(),
                day,
                due_at,
                template_key: self.campaign.template_key(day, Branch::Same),
                branch: Branch::Same,
                channel,
            };
            within(limit, self.store.upsert_queue_item(&item)).await?;
            if !existing.contains(&day) {
                created += 1;
            }
        }

        info!(subject_id, %channel, created, "check-ins enqueued");
        Ok(EnqueueOutcome {
            created,
            skipped_reason: None,
        })
    }
}

/// Local creation date plus `day` days, at `local_time` in `tz`, as UTC.
///
/// A time that falls in a DST gap moves to the first valid instant after the
/// gap. An ambiguous time takes the earlier instant.
pub fn due_at(
    created_at: DateTime<Utc>,
    day: Day,
    tz: Tz,
    local_time: NaiveTime,
) -> Option<DateTime<Utc>> {
    let date = created_at
        .with_timezone(&tz)
        .date_naive()
        .checked_add_days(Days::new(u64::from(day.as_u32())))?;
    resolve_local(tz, date.and_time(local_time))
}

fn resolve_local(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    let mut candidate = naive;
    // No zone has a gap longer than a day.
    for _ in 0..=(24 * 60) {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => return Some(earliest.with_timezone(&Utc)),
            LocalResult::None => {
                candidate = candidate.checked_add_signed(Duration::minutes(1))?;
            }
        }
    }
    None
}
