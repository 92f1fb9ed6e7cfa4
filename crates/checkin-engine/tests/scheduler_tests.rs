// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Enqueue behavior against a real SQLite store.

mod common;

use std::time::Duration;

use chrono::{TimeZone, Utc};

use checkin_core::{Branch, Channel, CheckinError, Day, QueueStatus};
use checkin_engine::{Scheduler, SkipReason};
use checkin_test_utils::TestHarness;

use common::EnvBuilder;

#[tokio::test]
async fn schedules_three_touchpoints_at_local_send_time() {
    let env = EnvBuilder::new().build().await;
    env.enrolled("s-1").await;

    let items = env.items("s-1").await;
    assert_eq!(items.len(), 3);

    let expected = [
        (Day::Day3, Utc.with_ymd_and_hms(2026, 1, 8, 15, 0, 0).unwrap(), "day3.same"),
        (Day::Day7, Utc.with_ymd_and_hms(2026, 1, 12, 15, 0, 0).unwrap(), "day7.same"),
        (Day::Day14, Utc.with_ymd_and_hms(2026, 1, 19, 15, 0, 0).unwrap(), "day14.same"),
    ];
    for (day, due_at, key) in expected {
        let item = items.iter().find(|i| i.day == day).unwrap();
        assert_eq!(item.due_at, due_at, "due_at for day {day}");
        assert_eq!(item.template_key, key);
        assert_eq!(item.branch, Branch::Same);
        assert_eq!(item.channel, Channel::Email);
        assert_eq!(item.status, QueueStatus::Queued);
        assert_eq!(item.sent_at, None);
        assert_eq!(item.last_error, None);
    }
}

#[tokio::test]
async fn enqueue_is_idempotent() {
    let env = EnvBuilder::new().build().await;
    env.enrolled("s-1").await;

    let again = env.scheduler.enqueue("s-1").await.unwrap();
    assert_eq!(again.created, 0);
    assert_eq!(again.skipped_reason, None);
    assert_eq!(env.items("s-1").await.len(), 3);
}

#[tokio::test]
async fn first_enqueue_reports_created_rows() {
    let env = EnvBuilder::new().build().await;
    env.harness
        .add_subject(&TestHarness::subject("s-1"))
        .await
        .unwrap();
    let outcome = env.scheduler.enqueue("s-1").await.unwrap();
    assert_eq!(outcome.created, 3);
}

#[tokio::test]
async fn configured_days_limit_touchpoints() {
    let env = EnvBuilder::new()
        .config(|c| c.campaign.days = vec![7])
        .build()
        .await;
    env.enrolled("s-1").await;
    let items = env.items("s-1").await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].day, Day::Day7);
}

#[tokio::test]
async fn sms_used_when_no_email() {
    let env = EnvBuilder::new().build().await;
    let mut subject = TestHarness::subject("s-1");
    subject.email = None;
    subject.phone = Some("+15551234567".to_string());
    env.harness.add_subject(&subject).await.unwrap();

    env.scheduler.enqueue("s-1").await.unwrap();
    assert!(env.items("s-1").await.iter().all(|i| i.channel == Channel::Sms));
}

#[tokio::test]
async fn skip_reasons_are_checked_in_order() {
    let disabled = EnvBuilder::new()
        .config(|c| c.campaign.enabled = false)
        .build()
        .await;
    disabled
        .harness
        .add_subject(&TestHarness::subject("s-1"))
        .await
        .unwrap();
    let outcome = disabled.scheduler.enqueue("s-1").await.unwrap();
    assert_eq!(outcome.skipped_reason, Some(SkipReason::Disabled));
    assert!(disabled.items("s-1").await.is_empty());

    let env = EnvBuilder::new().build().await;
    assert_eq!(
        env.scheduler.enqueue("ghost").await.unwrap().skipped_reason,
        Some(SkipReason::SubjectNotFound)
    );

    let mut urgent = TestHarness::subject("urgent");
    urgent.outcome = Some("URGENT".to_string());
    urgent.email = None;
    env.harness.add_subject(&urgent).await.unwrap();
    assert_eq!(
        env.scheduler.enqueue("urgent").await.unwrap().skipped_reason,
        Some(SkipReason::Urgent)
    );

    let buyer = TestHarness::subject("buyer");
    env.harness.add_subject(&buyer).await.unwrap();
    env.store().record_payment("buyer", "failed").await.unwrap();
    assert_eq!(env.scheduler.enqueue("buyer").await.unwrap().created, 3);
    env.store().record_payment("buyer", "succeeded").await.unwrap();
    assert_eq!(
        env.scheduler.enqueue("buyer").await.unwrap().skipped_reason,
        Some(SkipReason::Purchased)
    );

    let mut silent = TestHarness::subject("silent");
    silent.email = Some("   ".to_string());
    env.harness.add_subject(&silent).await.unwrap();
    let outcome = env.scheduler.enqueue("silent").await.unwrap();
    assert_eq!(outcome.skipped_reason, Some(SkipReason::NoContact));
    assert_eq!(outcome.created, 0);
    assert!(env.items("silent").await.is_empty());
}

#[tokio::test]
async fn re_enqueue_refreshes_due_at_without_touching_status() {
    let env = EnvBuilder::new()
        .config(|c| c.campaign.local_send_time = "09:00".to_string())
        .build()
        .await;
    env.enrolled("s-1").await;
    let before = env.items("s-1").await;

    let mut subject = TestHarness::subject("s-1");
    subject.created_at = Utc.with_ymd_and_hms(2026, 1, 6, 15, 0, 0).unwrap();
    env.harness.add_subject(&subject).await.unwrap();
    env.scheduler.enqueue("s-1").await.unwrap();

    let after = env.items("s-1").await;
    assert_eq!(after.len(), 3);
    for item in &after {
        let old = before.iter().find(|b| b.day == item.day).unwrap();
        assert_eq!(item.id, old.id);
        assert_eq!(item.due_at, old.due_at + chrono::Duration::days(1));
        assert_eq!(item.status, QueueStatus::Queued);
    }
}

#[tokio::test]
async fn stalled_store_times_out_enqueue() {
    let env = EnvBuilder::new().build().await;
    env.harness
        .add_subject(&TestHarness::subject("s-1"))
        .await
        .unwrap();
    let store = env.stalling_store(&["count_successful_payments"]);
    let scheduler = Scheduler::new(store, env.campaign.clone())
        .with_store_timeout(Duration::from_millis(250));

    assert!(matches!(
        scheduler.enqueue("s-1").await,
        Err(CheckinError::Timeout { .. })
    ));
    assert!(env.items("s-1").await.is_empty());
}
