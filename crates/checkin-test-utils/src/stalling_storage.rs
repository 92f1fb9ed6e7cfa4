// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store wrapper that hangs on selected operations.
//!
//! Every call is forwarded to the wrapped store. Calls whose method name was
//! passed to [`StallingStorage::stall_on`] first sleep for the configured
//! stall, which lets tests drive the engine's store timeouts.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use checkin_core::{
    AdapterType, Branch, CheckinError, Day, DiagnosisCode, DiagnosisInsert, HealthStatus,
    NewQueueItem, PluginAdapter, QueueItem, QueueStatus, ResponseRecord, StatusTransition,
    StorageAdapter, Subject, Template,
};

pub struct StallingStorage {
    inner: Arc<dyn StorageAdapter>,
    stalled: HashSet<&'static str>,
    stall: Duration,
}

impl StallingStorage {
    /// Wrap `inner`; nothing stalls until [`stall_on`](Self::stall_on) is called.
    pub fn new(inner: Arc<dyn StorageAdapter>, stall: Duration) -> Self {
        Self {
            inner,
            stalled: HashSet::new(),
            stall,
        }
    }

    /// Hang on the named trait method, e.g. `"get_subject"`.
    pub fn stall_on(mut self, method: &'static str) -> Self {
        self.stalled.insert(method);
        self
    }

    async fn gate(&self, method: &'static str) {
        if self.stalled.contains(method) {
            tokio::time::sleep(self.stall).await;
        }
    }
}

#[async_trait]
impl PluginAdapter for StallingStorage {
    fn name(&self) -> &str {
        "stalling-storage"
    }

    fn version(&self) -> semver::Version {
        self.inner.version()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CheckinError> {
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), CheckinError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl StorageAdapter for StallingStorage {
    async fn initialize(&self) -> Result<(), CheckinError> {
        self.inner.initialize().await
    }

    async fn close(&self) -> Result<(), CheckinError> {
        self.inner.close().await
    }

    async fn get_subject(&self, id: &str) -> Result<Option<Subject>, CheckinError> {
        self.gate("get_subject").await;
        self.inner.get_subject(id).await
    }

    async fn upsert_subject(&self, subject: &Subject) -> Result<(), CheckinError> {
        self.gate("upsert_subject").await;
        self.inner.upsert_subject(subject).await
    }

    async fn count_successful_payments(&self, subject_id: &str) -> Result<u32, CheckinError> {
        self.gate("count_successful_payments").await;
        self.inner.count_successful_payments(subject_id).await
    }

    async fn record_payment(&self, subject_id: &str, status: &str) -> Result<(), CheckinError> {
        self.gate("record_payment").await;
        self.inner.record_payment(subject_id, status).await
    }

    async fn upsert_queue_item(&self, item: &NewQueueItem) -> Result<(), CheckinError> {
        self.gate("upsert_queue_item").await;
        self.inner.upsert_queue_item(item).await
    }

    async fn get_queue_item(&self, id: i64) -> Result<Option<QueueItem>, CheckinError> {
        self.gate("get_queue_item").await;
        self.inner.get_queue_item(id).await
    }

    async fn queue_items_for_subject(
        &self,
        subject_id: &str,
    ) -> Result<Vec<QueueItem>, CheckinError> {
        self.gate("queue_items_for_subject").await;
        self.inner.queue_items_for_subject(subject_id).await
    }

    async fn due_items(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<QueueItem>, CheckinError> {
        self.gate("due_items").await;
        self.inner.due_items(now, limit).await
    }

    async fn claim_item(
        &self,
        id: i64,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<bool, CheckinError> {
        self.gate("claim_item").await;
        self.inner.claim_item(id, now, lease_until).await
    }

    async fn release_claim(&self, id: i64) -> Result<(), CheckinError> {
        self.gate("release_claim").await;
        self.inner.release_claim(id).await
    }

    async fn transition_status(
        &self,
        id: i64,
        expected: QueueStatus,
        next: &StatusTransition,
    ) -> Result<bool, CheckinError> {
        self.gate("transition_status").await;
        self.inner.transition_status(id, expected, next).await
    }

    async fn update_branch(
        &self,
        id: i64,
        branch: Branch,
        template_key: &str,
    ) -> Result<bool, CheckinError> {
        self.gate("update_branch").await;
        self.inner.update_branch(id, branch, template_key).await
    }

    async fn count_by_status(&self) -> Result<Vec<(QueueStatus, u64)>, CheckinError> {
        self.gate("count_by_status").await;
        self.inner.count_by_status().await
    }

    async fn get_template(&self, key: &str) -> Result<Option<Template>, CheckinError> {
        self.gate("get_template").await;
        self.inner.get_template(key).await
    }

    async fn upsert_template(&self, template: &Template) -> Result<(), CheckinError> {
        self.gate("upsert_template").await;
        self.inner.upsert_template(template).await
    }

    async fn get_insert(
        &self,
        code: DiagnosisCode,
        day: Day,
        branch: Branch,
    ) -> Result<Option<DiagnosisInsert>, CheckinError> {
        self.gate("get_insert").await;
        self.inner.get_insert(code, day, branch).await
    }

    async fn upsert_insert(&self, insert: &DiagnosisInsert) -> Result<(), CheckinError> {
        self.gate("upsert_insert").await;
        self.inner.upsert_insert(insert).await
    }

    async fn list_encouragements(&self) -> Result<Vec<String>, CheckinError> {
        self.gate("list_encouragements").await;
        self.inner.list_encouragements().await
    }

    async fn add_encouragement(&self, text: &str) -> Result<(), CheckinError> {
        self.gate("add_encouragement").await;
        self.inner.add_encouragement(text).await
    }

    async fn record_response(&self, response: &ResponseRecord) -> Result<(), CheckinError> {
        self.gate("record_response").await;
        self.inner.record_response(response).await
    }

    async fn get_response(
        &self,
        subject_id: &str,
        day: Day,
    ) -> Result<Option<ResponseRecord>, CheckinError> {
        self.gate("get_response").await;
        self.inner.get_response(subject_id, day).await
    }
}
