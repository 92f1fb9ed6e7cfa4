// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatcher: drives due queue items through `queued -> {sent, failed, skipped}`.
//!
//! Each item is claimed with a short lease before any work starts, so two
//! overlapping runs never both attempt delivery. The terminal write-back is a
//! compare-and-swap on `queued`; losing it is counted as a conflict.
//! A failure in one item is recorded in the batch summary and never aborts
//! the rest of the batch.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use checkin_config::model::DispatchConfig;
use checkin_content::{
    compose_message, resolve_content, resolve_diagnosis_code, ActionLink, ComposedMessage,
};
use checkin_core::{
    CheckinError, Day, Delivery, DiagnosisClassifier, FailureTag, QueueItem, QueueStatus,
    ResponseValue, StatusTransition, StorageAdapter, TransportAdapter,
};
use checkin_token::TokenCodec;

use crate::campaign::Campaign;
use crate::mode::{delivery_decision, DeliveryDecision, DispatchMode};
use crate::timeout::within;
use crate::window::{is_before_start, is_within_window, WindowReason};

/// Timeouts, lease, and concurrency for a dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub concurrency: usize,
    pub send_timeout: Duration,
    pub store_timeout: Duration,
    pub lease: chrono::Duration,
    pub batch_deadline: Duration,
}

impl DispatchSettings {
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            send_timeout: Duration::from_secs(config.send_timeout_secs),
            store_timeout: Duration::from_secs(config.store_timeout_secs),
            lease: chrono::Duration::seconds(
                i64::try_from(config.lease_secs).unwrap_or(i64::MAX / 1000),
            ),
            batch_deadline: Duration::from_secs(config.batch_deadline_secs),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default())
    }
}

/// A per-item error caught during a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    pub item_id: i64,
    pub message: String,
}

/// Tally of one dispatch batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    /// Items left queued: deferred, sandboxed, or not started before the deadline.
    pub queued: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Items another run claimed or finished first.
    pub conflicts: usize,
    pub errors: Vec<ItemError>,
}

impl DispatchSummary {
    /// Items that were picked up by this batch.
    pub fn processed(&self) -> usize {
        self.queued + self.sent + self.failed + self.skipped + self.conflicts + self.errors.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemOutcome {
    Sent,
    Failed,
    Skipped,
    Deferred,
    LeftQueued,
    NotStarted,
    Conflict,
}

/// A composed message and the address it goes to.
struct Prepared {
    address: String,
    message: ComposedMessage,
}

/// Processes due queue items.
pub struct Dispatcher {
    store: Arc<dyn StorageAdapter>,
    transport: Arc<dyn TransportAdapter>,
    classifier: Arc<dyn DiagnosisClassifier>,
    codec: TokenCodec,
    campaign: Campaign,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn StorageAdapter>,
        transport: Arc<dyn TransportAdapter>,
        classifier: Arc<dyn DiagnosisClassifier>,
        codec: TokenCodec,
        campaign: Campaign,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            store,
            transport,
            classifier,
            codec,
            campaign,
            settings,
        }
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    /// Effective mode for a request, folding in the campaign sandbox flag.
    pub fn mode_for(&self, dry_run: bool) -> DispatchMode {
        DispatchMode::effective(dry_run, self.campaign.sandbox)
    }

    /// Process up to `limit` due items. Safe to call repeatedly.
    pub async fn dispatch_due(
        &self,
        limit: u32,
        mode: DispatchMode,
    ) -> Result<DispatchSummary, CheckinError> {
        self.dispatch_due_at(limit, mode, Utc::now()).await
    }

    /// [`Dispatcher::dispatch_due`] against an explicit clock.
    ///
    /// Only reading the due set can fail the whole call; everything after that
    /// is isolated per item.
    pub async fn dispatch_due_at(
        &self,
        limit: u32,
        mode: DispatchMode,
        now: DateTime<Utc>,
    ) -> Result<DispatchSummary, CheckinError> {
        let due = self.with_store_timeout(self.store.due_items(now, limit)).await?;
        let started = Instant::now();
        let deadline = started + self.settings.batch_deadline;
        debug!(count = due.len(), limit, %mode, "dispatching due items");

        let results: Vec<(i64, Result<ItemOutcome, CheckinError>)> = stream::iter(due)
            .map(|item| async move {
                let id = item.id;
                (id, self.process(item, mode, now, started, deadline).await)
            })
            .buffer_unordered(self.settings.concurrency)
            .collect()
            .await;

        let mut summary = DispatchSummary::default();
        for (item_id, result) in results {
            match result {
                Ok(ItemOutcome::Sent) => summary.sent += 1,
                Ok(ItemOutcome::Failed) => summary.failed += 1,
                Ok(ItemOutcome::Skipped) => summary.skipped += 1,
                Ok(ItemOutcome::Deferred | ItemOutcome::LeftQueued | ItemOutcome::NotStarted) => {
                    summary.queued += 1
                }
                Ok(ItemOutcome::Conflict) => summary.conflicts += 1,
                Err(e) => {
                    warn!(item_id, error = %e, "queue item errored; leaving it queued");
                    summary.errors.push(ItemError {
                        item_id,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            %mode,
            sent = summary.sent,
            failed = summary.failed,
            skipped = summary.skipped,
            queued = summary.queued,
            conflicts = summary.conflicts,
            errors = summary.errors.len(),
            "dispatch batch complete"
        );
        Ok(summary)
    }

    /// Compose the message for a subject's touchpoint without changing its
    /// status. Links use the short preview lifetime.
    pub async fn preview(
        &self,
        subject_id: &str,
        day: Day,
    ) -> Result<ComposedMessage, CheckinError> {
        let item = self
            .with_store_timeout(self.store.queue_items_for_subject(subject_id))
            .await?
            .into_iter()
            .find(|item| item.day == day)
            .ok_or_else(|| CheckinError::NotFound {
                kind: "queue item",
                id: format!("{subject_id}/day{day}"),
            })?;
        let prepared = self
            .prepare(&item, self.codec.preview_ttl(), Utc::now())
            .await?;
        Ok(prepared.message)
    }

    async fn process(
        &self,
        item: QueueItem,
        mode: DispatchMode,
        now: DateTime<Utc>,
        started: Instant,
        deadline: Instant,
    ) -> Result<ItemOutcome, CheckinError> {
        if Instant::now() >= deadline {
            debug!(item_id = item.id, "batch deadline passed; item left for next run");
            return Ok(ItemOutcome::NotStarted);
        }

        // The lease runs from the moment of the claim, not from batch start.
        let elapsed =
            chrono::Duration::from_std(started.elapsed()).unwrap_or(chrono::Duration::zero());
        let claimed_at = now + elapsed;
        let lease_until = claimed_at + self.settings.lease;
        if !self
            .with_store_timeout(self.store.claim_item(item.id, claimed_at, lease_until))
            .await?
        {
            debug!(item_id = item.id, "item already claimed elsewhere");
            return Ok(ItemOutcome::Conflict);
        }

        let result = self.process_claimed(&item, mode, now).await;
        if result.is_err()
            && let Err(e) = self.with_store_timeout(self.store.release_claim(item.id)).await
        {
            warn!(item_id = item.id, error = %e, "failed to release claim; lease will expire");
        }
        result
    }

    async fn process_claimed(
        &self,
        item: &QueueItem,
        mode: DispatchMode,
        now: DateTime<Utc>,
    ) -> Result<ItemOutcome, CheckinError> {
        let campaign = &self.campaign;

        if is_before_start(now, campaign.start_date, &campaign.timezone) {
            debug!(item_id = item.id, reason = "before_start_date", "deferring item");
            return self.release(item.id, ItemOutcome::Deferred).await;
        }

        let window = is_within_window(now, &campaign.timezone, campaign.send_window.as_deref());
        if !window.allowed {
            debug!(
                item_id = item.id,
                reason = %window.reason,
                local_time = ?window.local_time,
                "deferring item"
            );
            return self.release(item.id, ItemOutcome::Deferred).await;
        }
        if !matches!(window.reason, WindowReason::InsideWindow | WindowReason::NoWindow) {
            debug!(item_id = item.id, reason = %window.reason, "send window not enforced");
        }

        let prepared = match self.prepare(item, self.codec.link_ttl(), now).await {
            Ok(prepared) => prepared,
            Err(CheckinError::Content(tag)) => {
                info!(item_id = item.id, subject_id = %item.subject_id, %tag, "content unresolved");
                return self.fail(item.id, tag.to_string()).await;
            }
            Err(e @ CheckinError::Timeout { .. }) => {
                warn!(item_id = item.id, error = %e, "content lookup timed out");
                return self.fail(item.id, e.to_string()).await;
            }
            Err(e) => return Err(e),
        };

        match delivery_decision(mode) {
            DeliveryDecision::Deliver => {
                let delivery = Delivery {
                    channel: item.channel,
                    address: prepared.address,
                    subject: prepared.message.subject,
                    body: prepared.message.body,
                };
                let attempt =
                    tokio::time::timeout(self.settings.send_timeout, self.transport.send(&delivery))
                        .await;
                match attempt {
                    Ok(Ok(message_id)) => {
                        info!(
                            item_id = item.id,
                            day = %item.day,
                            channel = %item.channel,
                            message_id = %message_id.0,
                            "check-in sent"
                        );
                        self.finish(item.id, StatusTransition::sent(now), ItemOutcome::Sent)
                            .await
                    }
                    Ok(Err(e)) => {
                        warn!(item_id = item.id, error = %e, "delivery failed");
                        self.fail(item.id, e.to_string()).await
                    }
                    Err(_) => {
                        let e = CheckinError::Timeout {
                            duration: self.settings.send_timeout,
                        };
                        warn!(item_id = item.id, error = %e, "delivery timed out");
                        self.fail(item.id, e.to_string()).await
                    }
                }
            }
            DeliveryDecision::MarkSkipped => {
                debug!(item_id = item.id, "dry run; marking skipped");
                self.finish(item.id, StatusTransition::skipped(), ItemOutcome::Skipped)
                    .await
            }
            DeliveryDecision::LeaveQueued => {
                debug!(item_id = item.id, "sandbox; leaving queued");
                self.release(item.id, ItemOutcome::LeftQueued).await
            }
        }
    }

    /// Resolve and compose everything needed to send `item`.
    ///
    /// Unresolvable content comes back as [`CheckinError::Content`].
    async fn prepare(
        &self,
        item: &QueueItem,
        ttl: chrono::Duration,
        now: DateTime<Utc>,
    ) -> Result<Prepared, CheckinError> {
        let subject = self
            .with_store_timeout(self.store.get_subject(&item.subject_id))
            .await?;
        let Some((subject, address)) = subject.and_then(|s| {
            let address = s.address_for(item.channel)?.to_string();
            Some((s, address))
        }) else {
            return Err(CheckinError::Content(FailureTag::MissingContact));
        };

        let template = self
            .with_store_timeout(self.store.get_template(&item.template_key))
            .await?
            .ok_or(CheckinError::Content(FailureTag::MissingTemplate))?;
        if template.channel != item.channel {
            return Err(CheckinError::Content(FailureTag::TemplateChannelMismatch));
        }

        let classify = async { Ok::<_, CheckinError>(self.classifier.classify(&subject).await) };
        let label = self.with_store_timeout(classify).await?;
        let code = label
            .and_then(|label| resolve_diagnosis_code(&label))
            .ok_or(CheckinError::Content(FailureTag::MissingDiagnosisMapping))?;

        let content = self
            .with_store_timeout(resolve_content(
                self.store.as_ref(),
                code,
                item.day,
                item.branch,
            ))
            .await?
            .ok_or(CheckinError::Content(FailureTag::MissingDiagnosisInsert))?;

        let links: Vec<ActionLink> = ResponseValue::ALL
            .iter()
            .map(|&value| {
                let token = self.codec.sign_at(&item.subject_id, item.day, value, ttl, now);
                ActionLink::new(value, self.campaign.respond_url(&token))
            })
            .collect();

        let message = compose_message(
            &template,
            &content.insert.body,
            &content.encouragement,
            &links,
        );
        Ok(Prepared { address, message })
    }

    async fn fail(&self, item_id: i64, reason: String) -> Result<ItemOutcome, CheckinError> {
        self.finish(item_id, StatusTransition::failed(reason), ItemOutcome::Failed)
            .await
    }

    async fn finish(
        &self,
        item_id: i64,
        next: StatusTransition,
        outcome: ItemOutcome,
    ) -> Result<ItemOutcome, CheckinError> {
        let applied = self
            .with_store_timeout(
                self.store
                    .transition_status(item_id, QueueStatus::Queued, &next),
            )
            .await?;
        if applied {
            Ok(outcome)
        } else {
            warn!(
                item_id,
                status = %next.status,
                "item left queued state before write-back; dropping result"
            );
            Ok(ItemOutcome::Conflict)
        }
    }

    async fn release(
        &self,
        item_id: i64,
        outcome: ItemOutcome,
    ) -> Result<ItemOutcome, CheckinError> {
        self.with_store_timeout(self.store.release_claim(item_id)).await?;
        Ok(outcome)
    }

    async fn with_store_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T, CheckinError>>,
    ) -> Result<T, CheckinError> {
        within(self.settings.store_timeout, fut).await
    }
}
