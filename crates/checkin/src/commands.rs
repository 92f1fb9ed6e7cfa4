// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: dispatch, enqueue, verify, preview, status, requeue.
//!
//! Each returns a serializable outcome; `main` prints it as JSON.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use checkin_core::{CheckinError, Day, HealthStatus, PluginAdapter, QueueStatus, StatusTransition};
use checkin_engine::{DispatchMode, DispatchSummary, EnqueueOutcome, RecordError, ResponseAck};

use crate::app::App;

#[derive(Debug, Serialize)]
pub struct DispatchReport {
    pub mode: DispatchMode,
    #[serde(flatten)]
    pub summary: DispatchSummary,
}

/// Run a single dispatch batch.
pub async fn dispatch(
    app: &App,
    limit: Option<u32>,
    dry_run: bool,
) -> Result<DispatchReport, CheckinError> {
    let limit = limit.unwrap_or(app.config.dispatch.batch_limit).max(1);
    let mode = app.dispatcher.mode_for(dry_run);
    let summary = app.dispatcher.dispatch_due(limit, mode).await?;
    Ok(DispatchReport { mode, summary })
}

/// Create the touchpoint chain for a subject.
pub async fn enqueue(app: &App, subject_id: &str) -> Result<EnqueueOutcome, CheckinError> {
    app.scheduler.enqueue(subject_id).await
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyReport {
    Recorded(ResponseAck),
    Invalid,
}

/// Verify a one-tap token and record the response.
pub async fn verify(
    app: &App,
    token: &str,
    note: Option<&str>,
) -> Result<VerifyReport, CheckinError> {
    match app.recorder.verify_and_record(token, note).await {
        Ok(ack) => Ok(VerifyReport::Recorded(ack)),
        Err(RecordError::Invalid(_)) => Ok(VerifyReport::Invalid),
        Err(RecordError::Store(e)) => Err(e),
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewReport {
    pub subject_id: String,
    pub day: Day,
    pub subject: String,
    pub body: String,
}

/// Render the message a subject would receive on `day`.
pub async fn preview(app: &App, subject_id: &str, day: Day) -> Result<PreviewReport, CheckinError> {
    let message = app.dispatcher.preview(subject_id, day).await?;
    Ok(PreviewReport {
        subject_id: subject_id.to_string(),
        day,
        subject: message.subject,
        body: message.body,
    })
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub storage: String,
    pub queue: BTreeMap<String, u64>,
}

/// Store health and queue counts by status.
pub async fn status(app: &App) -> Result<StatusReport, CheckinError> {
    let storage = match app.store.health_check().await? {
        HealthStatus::Healthy => "ok".to_string(),
        HealthStatus::Degraded(reason) => format!("degraded: {reason}"),
        HealthStatus::Unhealthy(reason) => format!("unhealthy: {reason}"),
    };
    let queue = app
        .store
        .count_by_status()
        .await?
        .into_iter()
        .map(|(status, n)| (status.to_string(), n))
        .collect();
    Ok(StatusReport { storage, queue })
}

#[derive(Debug, Serialize)]
pub struct RequeueReport {
    pub id: i64,
    pub previous: QueueStatus,
    pub requeued: bool,
}

/// Reset a failed item to queued. Items in any other status are left alone.
pub async fn requeue(app: &App, id: i64) -> Result<RequeueReport, CheckinError> {
    let item = app
        .store
        .get_queue_item(id)
        .await?
        .ok_or_else(|| CheckinError::NotFound {
            kind: "queue item",
            id: id.to_string(),
        })?;

    let requeued = item.status == QueueStatus::Failed
        && app
            .store
            .transition_status(id, QueueStatus::Failed, &StatusTransition::requeued())
            .await?;
    if requeued {
        info!(item_id = id, last_error = ?item.last_error, "failed item requeued");
    }
    Ok(RequeueReport {
        id,
        previous: item.status,
        requeued,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use checkin_config::CheckinConfig;
    use checkin_core::{QueueItem, ResponseValue};
    use checkin_test_utils::TestHarness;

    /// A harness whose store is reopened through [`App`], windowless.
    async fn setup() -> (TestHarness, App) {
        let mut config = CheckinConfig::default();
        config.campaign.send_window = None;
        let harness = TestHarness::builder().with_config(config).build().await.unwrap();
        let app = App::open(harness.config.clone(), true).await.unwrap();
        (harness, app)
    }

    async fn enroll_overdue(harness: &TestHarness, app: &App, id: &str) -> Vec<QueueItem> {
        let mut subject = TestHarness::subject(id);
        subject.created_at = Utc::now() - Duration::days(30);
        harness.add_subject(&subject).await.unwrap();
        let outcome = enqueue(app, id).await.unwrap();
        assert_eq!(outcome.created, 3);
        app.store.queue_items_for_subject(id).await.unwrap()
    }

    #[tokio::test]
    async fn enqueue_reports_skip_reason_for_unknown_subject() {
        let (_harness, app) = setup().await;
        let outcome = enqueue(&app, "nobody").await.unwrap();
        assert_eq!(outcome.created, 0);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["skipped_reason"], "subject_not_found");
    }

    #[tokio::test]
    async fn dispatch_sends_through_log_transport() {
        let (harness, app) = setup().await;
        enroll_overdue(&harness, &app, "s-1").await;

        let report = dispatch(&app, Some(2), false).await.unwrap();
        assert_eq!(report.mode, DispatchMode::Live);
        assert_eq!(report.summary.sent, 2);

        let report = dispatch(&app, None, false).await.unwrap();
        assert_eq!(report.summary.sent, 1);
    }

    #[tokio::test]
    async fn dry_run_dispatch_skips_items() {
        let (harness, app) = setup().await;
        enroll_overdue(&harness, &app, "s-1").await;

        let report = dispatch(&app, None, true).await.unwrap();
        assert_eq!(report.mode, DispatchMode::DryRun);
        assert_eq!(report.summary.skipped, 3);

        let status = status(&app).await.unwrap();
        assert_eq!(status.storage, "ok");
        assert_eq!(status.queue.get("skipped"), Some(&3));
    }

    #[tokio::test]
    async fn verify_records_valid_and_reports_invalid_tokens() {
        let (harness, app) = setup().await;
        harness.add_subject(&TestHarness::subject("s-1")).await.unwrap();
        let token = harness.codec.sign(
            "s-1",
            Day::Day3,
            ResponseValue::Better,
            harness.codec.link_ttl(),
        );

        match verify(&app, &token, Some("much better")).await.unwrap() {
            VerifyReport::Recorded(ack) => {
                assert_eq!(ack.day, Day::Day3);
                assert_eq!(ack.value, ResponseValue::Better);
            }
            VerifyReport::Invalid => panic!("valid token rejected"),
        }

        assert!(matches!(
            verify(&app, "not-a-token", None).await.unwrap(),
            VerifyReport::Invalid
        ));
    }

    #[tokio::test]
    async fn preview_renders_without_changing_status() {
        let (harness, app) = setup().await;
        enroll_overdue(&harness, &app, "s-1").await;

        let report = preview(&app, "s-1", Day::Day7).await.unwrap();
        assert_eq!(report.subject, "Day 7 check-in");
        assert!(report.body.contains("Sciatica day 7 same guidance."));

        let items = app.store.queue_items_for_subject("s-1").await.unwrap();
        assert!(items.iter().all(|i| i.status == QueueStatus::Queued));
    }

    #[tokio::test]
    async fn requeue_only_resets_failed_items() {
        let (harness, app) = setup().await;
        let items = enroll_overdue(&harness, &app, "s-1").await;
        let id = items[0].id;

        let report = requeue(&app, id).await.unwrap();
        assert!(!report.requeued);
        assert_eq!(report.previous, QueueStatus::Queued);

        app.store
            .transition_status(id, QueueStatus::Queued, &StatusTransition::failed("boom"))
            .await
            .unwrap();
        let report = requeue(&app, id).await.unwrap();
        assert!(report.requeued);
        assert_eq!(report.previous, QueueStatus::Failed);

        let item = app.store.get_queue_item(id).await.unwrap().unwrap();
        assert_eq!(item.status, QueueStatus::Queued);
        assert!(item.last_error.is_none());
    }

    #[tokio::test]
    async fn requeue_unknown_item_is_not_found() {
        let (_harness, app) = setup().await;
        let err = requeue(&app, 9999).await.unwrap_err();
        assert!(matches!(err, CheckinError::NotFound { .. }));
    }
}
