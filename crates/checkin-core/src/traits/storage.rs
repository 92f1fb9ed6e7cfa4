// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CheckinError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Branch, Day, DiagnosisCode, DiagnosisInsert, NewQueueItem, QueueItem, QueueStatus,
    ResponseRecord, StatusTransition, Subject, Template,
};

/// Adapter for the persistent store boundary.
///
/// The engine needs only point lookups, a due-range query, and conditional
/// updates keyed by the current status. Everything else exists for seeding
/// content and for operator tooling.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), CheckinError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), CheckinError>;

    // --- Subjects and payments ---

    async fn get_subject(&self, id: &str) -> Result<Option<Subject>, CheckinError>;

    async fn upsert_subject(&self, subject: &Subject) -> Result<(), CheckinError>;

    /// Number of payments for the subject whose status is `succeeded`.
    async fn count_successful_payments(&self, subject_id: &str) -> Result<u32, CheckinError>;

    async fn record_payment(&self, subject_id: &str, status: &str) -> Result<(), CheckinError>;

    // --- Queue ---

    /// Insert a queue row, or update `due_at` if `(subject_id, day)` already exists.
    async fn upsert_queue_item(&self, item: &NewQueueItem) -> Result<(), CheckinError>;

    async fn get_queue_item(&self, id: i64) -> Result<Option<QueueItem>, CheckinError>;

    async fn queue_items_for_subject(
        &self,
        subject_id: &str,
    ) -> Result<Vec<QueueItem>, CheckinError>;

    /// Queued items with `due_at <= now` and no live claim, oldest first.
    async fn due_items(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<QueueItem>, CheckinError>;

    /// Take a processing lease on a queued item.
    ///
    /// Returns `false` when the item is no longer queued or another run holds
    /// a live lease.
    async fn claim_item(
        &self,
        id: i64,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<bool, CheckinError>;

    /// Drop a lease without changing status (deferral).
    async fn release_claim(&self, id: i64) -> Result<(), CheckinError>;

    /// Compare-and-swap on status: applies `next` only if the item is still
    /// `expected`. Returns whether the row was updated.
    async fn transition_status(
        &self,
        id: i64,
        expected: QueueStatus,
        next: &StatusTransition,
    ) -> Result<bool, CheckinError>;

    /// Re-point a still-queued item at another branch. Returns whether the
    /// row was updated.
    async fn update_branch(
        &self,
        id: i64,
        branch: Branch,
        template_key: &str,
    ) -> Result<bool, CheckinError>;

    /// Number of queue items per status, for operator reporting.
    async fn count_by_status(&self) -> Result<Vec<(QueueStatus, u64)>, CheckinError>;

    // --- Content ---

    async fn get_template(&self, key: &str) -> Result<Option<Template>, CheckinError>;

    async fn upsert_template(&self, template: &Template) -> Result<(), CheckinError>;

    /// Exact `(code, day, branch)` lookup. Never falls back.
    async fn get_insert(
        &self,
        code: DiagnosisCode,
        day: Day,
        branch: Branch,
    ) -> Result<Option<DiagnosisInsert>, CheckinError>;

    async fn upsert_insert(&self, insert: &DiagnosisInsert) -> Result<(), CheckinError>;

    async fn list_encouragements(&self) -> Result<Vec<String>, CheckinError>;

    async fn add_encouragement(&self, text: &str) -> Result<(), CheckinError>;

    // --- Responses ---

    /// Store a one-tap response, replacing any earlier response for the same day.
    async fn record_response(&self, response: &ResponseRecord) -> Result<(), CheckinError>;

    async fn get_response(
        &self,
        subject_id: &str,
        day: Day,
    ) -> Result<Option<ResponseRecord>, CheckinError>;
}
