// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use checkin_config::model::StorageConfig;
use checkin_core::{
    AdapterType, Branch, CheckinError, Day, DiagnosisCode, DiagnosisInsert, HealthStatus,
    NewQueueItem, PluginAdapter, QueueItem, QueueStatus, ResponseRecord, StatusTransition,
    StorageAdapter, Subject, Template,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already-open database (used for in-memory stores in tests).
    pub fn from_database(db: Database) -> Self {
        Self {
            config: StorageConfig {
                database_path: ":memory:".to_string(),
                wal_mode: false,
            },
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, CheckinError> {
        self.db.get().ok_or_else(|| CheckinError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CheckinError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CheckinError> {
        if self.db.get().is_some() {
            self.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), CheckinError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| CheckinError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CheckinError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Subjects and payments ---

    async fn get_subject(&self, id: &str) -> Result<Option<Subject>, CheckinError> {
        queries::subjects::get_subject(self.db()?, id).await
    }

    async fn upsert_subject(&self, subject: &Subject) -> Result<(), CheckinError> {
        queries::subjects::upsert_subject(self.db()?, subject).await
    }

    async fn count_successful_payments(&self, subject_id: &str) -> Result<u32, CheckinError> {
        queries::subjects::count_successful_payments(self.db()?, subject_id).await
    }

    async fn record_payment(&self, subject_id: &str, status: &str) -> Result<(), CheckinError> {
        queries::subjects::record_payment(self.db()?, subject_id, status).await
    }

    // --- Queue ---

    async fn upsert_queue_item(&self, item: &NewQueueItem) -> Result<(), CheckinError> {
        queries::queue::upsert(self.db()?, item).await
    }

    async fn get_queue_item(&self, id: i64) -> Result<Option<QueueItem>, CheckinError> {
        queries::queue::get(self.db()?, id).await
    }

    async fn queue_items_for_subject(
        &self,
        subject_id: &str,
    ) -> Result<Vec<QueueItem>, CheckinError> {
        queries::queue::for_subject(self.db()?, subject_id).await
    }

    async fn due_items(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<QueueItem>, CheckinError> {
        queries::queue::due(self.db()?, now, limit).await
    }

    async fn claim_item(
        &self,
        id: i64,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<bool, CheckinError> {
        queries::queue::claim(self.db()?, id, now, lease_until).await
    }

    async fn release_claim(&self, id: i64) -> Result<(), CheckinError> {
        queries::queue::release(self.db()?, id).await
    }

    async fn transition_status(
        &self,
        id: i64,
        expected: QueueStatus,
        next: &StatusTransition,
    ) -> Result<bool, CheckinError> {
        queries::queue::transition(self.db()?, id, expected, next).await
    }

    async fn update_branch(
        &self,
        id: i64,
        branch: Branch,
        template_key: &str,
    ) -> Result<bool, CheckinError> {
        queries::queue::update_branch(self.db()?, id, branch, template_key).await
    }

    async fn count_by_status(&self) -> Result<Vec<(QueueStatus, u64)>, CheckinError> {
        queries::queue::count_by_status(self.db()?).await
    }

    // --- Content ---

    async fn get_template(&self, key: &str) -> Result<Option<Template>, CheckinError> {
        queries::content::get_template(self.db()?, key).await
    }

    async fn upsert_template(&self, template: &Template) -> Result<(), CheckinError> {
        queries::content::upsert_template(self.db()?, template).await
    }

    async fn get_insert(
        &self,
        code: DiagnosisCode,
        day: Day,
        branch: Branch,
    ) -> Result<Option<DiagnosisInsert>, CheckinError> {
        queries::content::get_insert(self.db()?, code, day, branch).await
    }

    async fn upsert_insert(&self, insert: &DiagnosisInsert) -> Result<(), CheckinError> {
        queries::content::upsert_insert(self.db()?, insert).await
    }

    async fn list_encouragements(&self) -> Result<Vec<String>, CheckinError> {
        queries::content::list_encouragements(self.db()?).await
    }

    async fn add_encouragement(&self, text: &str) -> Result<(), CheckinError> {
        queries::content::add_encouragement(self.db()?, text).await
    }

    // --- Responses ---

    async fn record_response(&self, response: &ResponseRecord) -> Result<(), CheckinError> {
        queries::responses::record(self.db()?, response).await
    }

    async fn get_response(
        &self,
        subject_id: &str,
        day: Day,
    ) -> Result<Option<ResponseRecord>, CheckinError> {
        queries::responses::get(self.db()?, subject_id, day).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_core::Channel;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("init_test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_reflects_initialization() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(storage.health_check().await.is_err());
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn queue_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        let now = Utc.with_ymd_and_hms(2026, 1, 8, 15, 0, 0).unwrap();
        storage
            .upsert_queue_item(&NewQueueItem {
                subject_id: "s-1".to_string(),
                day: Day::Day3,
                due_at: now,
                template_key: "day3.same".to_string(),
                branch: Branch::Same,
                channel: Channel::Email,
            })
            .await
            .unwrap();

        let due = storage.due_items(now, 10).await.unwrap();
        assert_eq!(due.len(), 1);
        let id = due[0].id;

        assert!(
            storage
                .claim_item(id, now, now + chrono::Duration::minutes(2))
                .await
                .unwrap()
        );
        assert!(
            storage
                .transition_status(id, QueueStatus::Queued, &StatusTransition::sent(now))
                .await
                .unwrap()
        );
        let item = storage.get_queue_item(id).await.unwrap().unwrap();
        assert_eq!(item.status, QueueStatus::Sent);
        assert_eq!(item.sent_at, Some(now));

        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_runs_checkpoint() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shutdown.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        storage.add_encouragement("You are doing well.").await.unwrap();

        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_before_initialize_is_noop() {
        let storage = SqliteStorage::new(make_config("/nonexistent/never.db"));
        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn in_memory_storage_is_ready_without_initialize() {
        let storage = SqliteStorage::from_database(Database::open_in_memory().await.unwrap());
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        assert!(storage.get_subject("nobody").await.unwrap().is_none());
    }
}
