// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use checkin_config::model::CheckinConfig;
use checkin_core::{
    DiagnosisClassifier, QueueItem, StorageAdapter, StoredLabelClassifier, Subject,
    TransportAdapter,
};
use checkin_engine::{Campaign, DispatchSettings, Dispatcher, ResponseRecorder, Scheduler};
use checkin_test_utils::{MockTransport, StallingStorage, TestHarness};

/// 10:00 New York time on the day-3 touchpoint of [`TestHarness::subject`].
pub fn day3_due() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 8, 15, 0, 0).unwrap()
}

pub fn day7_due() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 12, 15, 0, 0).unwrap()
}

pub struct Env {
    pub harness: TestHarness,
    pub campaign: Campaign,
    pub scheduler: Scheduler,
    pub dispatcher: Dispatcher,
    pub recorder: ResponseRecorder,
}

impl Env {
    pub fn store(&self) -> Arc<dyn StorageAdapter> {
        self.harness.store()
    }

    /// Add a harness subject and enqueue it.
    pub async fn enrolled(&self, id: &str) -> Subject {
        let subject = TestHarness::subject(id);
        self.harness.add_subject(&subject).await.unwrap();
        let outcome = self.scheduler.enqueue(id).await.unwrap();
        assert_eq!(outcome.skipped_reason, None);
        subject
    }

    pub async fn items(&self, subject_id: &str) -> Vec<QueueItem> {
        self.store().queue_items_for_subject(subject_id).await.unwrap()
    }

    pub fn dispatcher_with(&self, settings: DispatchSettings) -> Dispatcher {
        build_dispatcher(
            self.store(),
            &self.harness,
            self.campaign.clone(),
            Arc::new(StoredLabelClassifier),
            settings,
        )
    }

    /// The harness store, hanging for ten seconds on each named method.
    pub fn stalling_store(&self, methods: &[&'static str]) -> Arc<dyn StorageAdapter> {
        let stalling = StallingStorage::new(self.store(), Duration::from_secs(10));
        Arc::new(methods.iter().fold(stalling, |s, &m| s.stall_on(m)))
    }

    /// A dispatcher over `store` whose store calls give up after `timeout`.
    pub fn dispatcher_over(
        &self,
        store: Arc<dyn StorageAdapter>,
        timeout: Duration,
    ) -> Dispatcher {
        let settings = DispatchSettings {
            store_timeout: timeout,
            ..DispatchSettings::default()
        };
        build_dispatcher(
            store,
            &self.harness,
            self.campaign.clone(),
            Arc::new(StoredLabelClassifier),
            settings,
        )
    }
}

pub struct EnvBuilder {
    config: CheckinConfig,
    transport: MockTransport,
    classifier: Arc<dyn DiagnosisClassifier>,
    settings: DispatchSettings,
    seed_content: bool,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self {
            config: CheckinConfig::default(),
            transport: MockTransport::new(),
            classifier: Arc::new(StoredLabelClassifier),
            settings: DispatchSettings::default(),
            seed_content: true,
        }
    }

    pub fn config(mut self, f: impl FnOnce(&mut CheckinConfig)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn transport(mut self, transport: MockTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn classifier(mut self, classifier: impl DiagnosisClassifier) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.settings.send_timeout = timeout;
        self
    }

    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.settings.store_timeout = timeout;
        self
    }

    pub fn batch_deadline(mut self, deadline: Duration) -> Self {
        self.settings.batch_deadline = deadline;
        self
    }

    pub fn without_content(mut self) -> Self {
        self.seed_content = false;
        self
    }

    pub async fn build(self) -> Env {
        let mut builder = TestHarness::builder()
            .with_config(self.config)
            .with_transport(self.transport);
        if !self.seed_content {
            builder = builder.without_content();
        }
        let harness = builder.build().await.unwrap();
        let campaign = Campaign::from_config(&harness.config.campaign).unwrap();
        let scheduler = Scheduler::new(harness.store(), campaign.clone());
        let dispatcher = build_dispatcher(
            harness.store(),
            &harness,
            campaign.clone(),
            self.classifier,
            self.settings,
        );
        let recorder =
            ResponseRecorder::new(harness.store(), harness.codec.clone(), campaign.clone());
        Env {
            harness,
            campaign,
            scheduler,
            dispatcher,
            recorder,
        }
    }
}

fn build_dispatcher(
    store: Arc<dyn StorageAdapter>,
    harness: &TestHarness,
    campaign: Campaign,
    classifier: Arc<dyn DiagnosisClassifier>,
    settings: DispatchSettings,
) -> Dispatcher {
    let transport: Arc<dyn TransportAdapter> = harness.transport.clone();
    Dispatcher::new(
        store,
        transport,
        classifier,
        harness.codec.clone(),
        campaign,
        settings,
    )
}

/// The token embedded in the first action link of a message body.
pub fn first_token(body: &str) -> String {
    let start = body.find("t=").expect("body has an action link") + 2;
    body[start..]
        .split(|c: char| c.is_whitespace())
        .next()
        .unwrap()
        .to_string()
}
