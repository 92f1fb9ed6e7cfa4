// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic runner lifecycle.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use checkin_core::QueueStatus;
use checkin_engine::{DispatchMode, DispatchRunner};

use common::EnvBuilder;

#[tokio::test]
async fn runner_dispatches_until_cancelled() {
    // Window checks use the wall clock here, so disable the window.
    let env = EnvBuilder::new()
        .config(|c| c.campaign.send_window = None)
        .build()
        .await;
    env.enrolled("s-1").await;

    let dispatcher = Arc::new(env.dispatcher_with(Default::default()));
    let runner = DispatchRunner::new(
        dispatcher,
        Duration::from_millis(20),
        50,
        DispatchMode::Live,
    );
    let cancel = CancellationToken::new();
    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { runner.run(cancel).await })
    };

    // Subject was created in January 2026, so all three touchpoints are due.
    let mut sent = 0;
    for _ in 0..250 {
        sent = env
            .items("s-1")
            .await
            .iter()
            .filter(|i| i.status == QueueStatus::Sent)
            .count();
        if sent == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(sent, 3);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("runner stops after cancellation")
        .unwrap();
    assert_eq!(env.harness.transport.sent_count().await, 3);
}

#[tokio::test]
async fn runner_exits_immediately_when_already_cancelled() {
    let env = EnvBuilder::new().build().await;
    let runner = DispatchRunner::new(
        Arc::new(env.dispatcher_with(Default::default())),
        Duration::from_secs(3600),
        50,
        DispatchMode::Live,
    );
    let cancel = CancellationToken::new();
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), runner.run(cancel))
        .await
        .unwrap();
}
