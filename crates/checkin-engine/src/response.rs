// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-tap response recording.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use checkin_core::{CheckinError, Day, QueueStatus, ResponseRecord, ResponseValue, StorageAdapter};
use checkin_token::{InvalidToken, TokenCodec};

use crate::campaign::Campaign;
use crate::timeout::{default_store_timeout, within};

/// Longest free-text note kept with a response, in characters.
pub const MAX_NOTE_CHARS: usize = 2000;

/// Acknowledgement of a recorded response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseAck {
    pub subject_id: String,
    pub day: Day,
    pub value: ResponseValue,
    /// Whether a later queued touchpoint was moved onto the response's branch.
    pub rebranched: bool,
}

/// Why a response could not be recorded.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Invalid(#[from] InvalidToken),

    #[error(transparent)]
    Store(#[from] CheckinError),
}

/// Verifies response tokens and records what the user tapped.
pub struct ResponseRecorder {
    store: Arc<dyn StorageAdapter>,
    codec: TokenCodec,
    campaign: Campaign,
    store_timeout: Duration,
}

impl ResponseRecorder {
    pub fn new(store: Arc<dyn StorageAdapter>, codec: TokenCodec, campaign: Campaign) -> Self {
        Self {
            store,
            codec,
            campaign,
            store_timeout: default_store_timeout(),
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub async fn verify_and_record(
        &self,
        token: &str,
        note: Option<&str>,
    ) -> Result<ResponseAck, RecordError> {
        self.verify_and_record_at(token, note, Utc::now()).await
    }

    /// Verify `token` at `now`, store the response, and re-branch the next
    /// queued touchpoint for the subject.
    pub async fn verify_and_record_at(
        &self,
        token: &str,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ResponseAck, RecordError> {
        let claims = self.codec.verify_at(token, now)?;

        let note = note
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| n.chars().take(MAX_NOTE_CHARS).collect::<String>());
        let record = ResponseRecord {
            subject_id: claims.subject_id.clone(),
            day: claims.day,
            value: claims.value,
            note,
            responded_at: now,
        };
        within(self.store_timeout, self.store.record_response(&record)).await?;

        let rebranched = self.rebranch_next(&claims.subject_id, claims.day, claims.value).await?;

        info!(
            subject_id = %claims.subject_id,
            day = %claims.day,
            value = %claims.value,
            rebranched,
            "check-in response recorded"
        );
        Ok(ResponseAck {
            subject_id: claims.subject_id,
            day: claims.day,
            value: claims.value,
            rebranched,
        })
    }

    async fn rebranch_next(
        &self,
        subject_id: &str,
        day: Day,
        value: ResponseValue,
    ) -> Result<bool, CheckinError> {
        let next = within(self.store_timeout, self.store.queue_items_for_subject(subject_id))
            .await?
            .into_iter()
            .filter(|item| item.status == QueueStatus::Queued && item.day > day)
            .min_by_key(|item| item.day);
        let Some(next) = next else {
            debug!(subject_id, %day, "no later queued touchpoint to re-branch");
            return Ok(false);
        };
        let branch = value.branch();
        let key = self.campaign.template_key(next.day, branch);
        within(self.store_timeout, self.store.update_branch(next.id, branch, &key)).await
    }
}
