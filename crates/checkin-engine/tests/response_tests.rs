// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-tap response recording and re-branching.

mod common;

use chrono::Duration;

use checkin_core::{Branch, CheckinError, Day, QueueStatus, ResponseValue};
use checkin_engine::{DispatchMode, RecordError, ResponseRecorder};

use common::{day3_due, day7_due, EnvBuilder};

#[tokio::test]
async fn response_is_recorded_and_next_touchpoint_rebranched() {
    let env = EnvBuilder::new().build().await;
    env.enrolled("s-1").await;

    let token = env.harness.codec.sign_at(
        "s-1",
        Day::Day3,
        ResponseValue::Worse,
        Duration::days(7),
        day3_due(),
    );
    let responded_at = day3_due() + Duration::hours(2);
    let ack = env
        .recorder
        .verify_and_record_at(&token, Some("  stiff in the morning  "), responded_at)
        .await
        .unwrap();
    assert_eq!(ack.subject_id, "s-1");
    assert_eq!(ack.day, Day::Day3);
    assert_eq!(ack.value, ResponseValue::Worse);
    assert!(ack.rebranched);

    let stored = env.store().get_response("s-1", Day::Day3).await.unwrap().unwrap();
    assert_eq!(stored.value, ResponseValue::Worse);
    assert_eq!(stored.note.as_deref(), Some("stiff in the morning"));
    assert_eq!(stored.responded_at, responded_at);

    let items = env.items("s-1").await;
    let day7 = items.iter().find(|i| i.day == Day::Day7).unwrap();
    assert_eq!(day7.branch, Branch::Worse);
    assert_eq!(day7.template_key, "day7.worse");
    let day14 = items.iter().find(|i| i.day == Day::Day14).unwrap();
    assert_eq!(day14.branch, Branch::Same);

    // The re-branched touchpoint pulls the matching content.
    let summary = env
        .dispatcher
        .dispatch_due_at(50, DispatchMode::Live, day7_due())
        .await
        .unwrap();
    assert_eq!(summary.sent, 2);
    let bodies: Vec<String> = env
        .harness
        .transport
        .sent_messages()
        .await
        .into_iter()
        .map(|d| d.body)
        .collect();
    assert!(bodies.iter().any(|b| b.contains("Sciatica day 7 worse guidance.")));
}

#[tokio::test]
async fn repeated_response_replaces_earlier_one() {
    let env = EnvBuilder::new().build().await;
    env.enrolled("s-1").await;

    for value in [ResponseValue::Worse, ResponseValue::Better] {
        let token = env
            .harness
            .codec
            .sign("s-1", Day::Day3, value, Duration::days(7));
        env.recorder.verify_and_record(&token, None).await.unwrap();
    }
    let stored = env.store().get_response("s-1", Day::Day3).await.unwrap().unwrap();
    assert_eq!(stored.value, ResponseValue::Better);
    assert_eq!(stored.note, None);

    let day7 = env
        .items("s-1")
        .await
        .into_iter()
        .find(|i| i.day == Day::Day7)
        .unwrap();
    assert_eq!(day7.template_key, "day7.better");
}

#[tokio::test]
async fn last_touchpoint_response_has_nothing_to_rebranch() {
    let env = EnvBuilder::new().build().await;
    env.enrolled("s-1").await;

    let token = env
        .harness
        .codec
        .sign("s-1", Day::Day14, ResponseValue::Better, Duration::days(7));
    let ack = env.recorder.verify_and_record(&token, None).await.unwrap();
    assert!(!ack.rebranched);
}

#[tokio::test]
async fn sent_touchpoints_are_not_rebranched() {
    let env = EnvBuilder::new().build().await;
    env.enrolled("s-1").await;
    env.dispatcher
        .dispatch_due_at(50, DispatchMode::Live, day7_due())
        .await
        .unwrap();

    let token = env
        .harness
        .codec
        .sign("s-1", Day::Day3, ResponseValue::Worse, Duration::days(7));
    let ack = env.recorder.verify_and_record(&token, None).await.unwrap();
    // Day 7 already went out; day 14 is the next queued touchpoint.
    assert!(ack.rebranched);
    let items = env.items("s-1").await;
    let day7 = items.iter().find(|i| i.day == Day::Day7).unwrap();
    assert_eq!(day7.status, QueueStatus::Sent);
    assert_eq!(day7.branch, Branch::Same);
    let day14 = items.iter().find(|i| i.day == Day::Day14).unwrap();
    assert_eq!(day14.template_key, "day14.worse");
}

#[tokio::test]
async fn bad_tokens_are_rejected_without_writes() {
    let env = EnvBuilder::new().build().await;
    env.enrolled("s-1").await;

    let expired = env.harness.codec.sign_at(
        "s-1",
        Day::Day3,
        ResponseValue::Worse,
        Duration::hours(1),
        day3_due(),
    );
    let result = env
        .recorder
        .verify_and_record_at(&expired, None, day3_due() + Duration::hours(1))
        .await;
    assert!(matches!(result, Err(RecordError::Invalid(_))));

    for garbage in ["", "abc", "abc.def", "a.b.c"] {
        assert!(matches!(
            env.recorder.verify_and_record(garbage, None).await,
            Err(RecordError::Invalid(_))
        ));
    }

    assert!(env.store().get_response("s-1", Day::Day3).await.unwrap().is_none());
}

#[tokio::test]
async fn long_notes_are_truncated() {
    let env = EnvBuilder::new().build().await;
    env.enrolled("s-1").await;
    let token = env
        .harness
        .codec
        .sign("s-1", Day::Day3, ResponseValue::Same, Duration::days(7));
    let note = "x".repeat(checkin_engine::response::MAX_NOTE_CHARS + 50);
    env.recorder
        .verify_and_record(&token, Some(&note))
        .await
        .unwrap();
    let stored = env.store().get_response("s-1", Day::Day3).await.unwrap().unwrap();
    assert_eq!(
        stored.note.unwrap().chars().count(),
        checkin_engine::response::MAX_NOTE_CHARS
    );
}

#[tokio::test]
async fn stalled_store_times_out_recording() {
    let env = EnvBuilder::new().build().await;
    env.enrolled("s-1").await;
    let store = env.stalling_store(&["record_response"]);
    let recorder = ResponseRecorder::new(store, env.harness.codec.clone(), env.campaign.clone())
        .with_store_timeout(std::time::Duration::from_millis(250));
    let token = env
        .harness
        .codec
        .sign("s-1", Day::Day3, ResponseValue::Better, Duration::days(7));

    assert!(matches!(
        recorder.verify_and_record(&token, None).await,
        Err(RecordError::Store(CheckinError::Timeout { .. }))
    ));
    assert!(env.store().get_response("s-1", Day::Day3).await.unwrap().is_none());
    let day7 = env
        .items("s-1")
        .await
        .into_iter()
        .find(|i| i.day == Day::Day7)
        .unwrap();
    assert_eq!(day7.branch, Branch::Same);
}
