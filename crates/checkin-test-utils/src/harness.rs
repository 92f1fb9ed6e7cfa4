// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` opens a temp SQLite database, seeds it with templates,
//! sciatica inserts, and encouragement lines, and hands out the pieces the
//! engine and gateway need.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use checkin_config::model::{CheckinConfig, StorageConfig};
use checkin_core::{
    Branch, Channel, CheckinError, Day, DiagnosisCode, DiagnosisInsert, StorageAdapter, Subject,
    Template,
};
use checkin_storage::SqliteStorage;
use checkin_token::TokenCodec;

use crate::mock_transport::MockTransport;

/// Signing secret used by harness codecs.
pub const TEST_SECRET: &str = "test-signing-secret-0123456789abcdef";

const SEEDED_BRANCHES: [Branch; 3] = [Branch::Same, Branch::Better, Branch::Worse];

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: CheckinConfig,
    transport: Option<MockTransport>,
    seed_content: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = CheckinConfig::default();
        config.token.secret = Some(TEST_SECRET.to_string());
        Self {
            config,
            transport: None,
            seed_content: true,
        }
    }

    /// Replace the configuration. The token secret is kept if `config` has none.
    pub fn with_config(mut self, mut config: CheckinConfig) -> Self {
        if config.token.secret.is_none() {
            config.token.secret = Some(TEST_SECRET.to_string());
        }
        self.config = config;
        self
    }

    /// Use a preconfigured mock transport.
    pub fn with_transport(mut self, transport: MockTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Start from an empty content library.
    pub fn without_content(mut self) -> Self {
        self.seed_content = false;
        self
    }

    /// Build the test harness, creating the temp database.
    pub async fn build(self) -> Result<TestHarness, CheckinError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| CheckinError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage = Arc::new(storage);

        if self.seed_content {
            seed_content(storage.as_ref()).await?;
        }

        let codec = TokenCodec::from_config(&config.token)?;

        Ok(TestHarness {
            storage,
            transport: Arc::new(self.transport.unwrap_or_default()),
            codec,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A temp store with seeded content plus a mock transport and codec.
pub struct TestHarness {
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    pub transport: Arc<MockTransport>,
    pub codec: TokenCodec,
    pub config: CheckinConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with default configuration and seeded content.
    pub async fn new() -> Result<Self, CheckinError> {
        Self::builder().build().await
    }

    pub fn store(&self) -> Arc<dyn StorageAdapter> {
        self.storage.clone()
    }

    /// A sciatica subject with an email address, created 2026-01-05 10:00 New York time.
    pub fn subject(id: &str) -> Subject {
        Subject {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            phone: None,
            diagnosis_label: Some("Sciatica".to_string()),
            outcome: Some("routine".to_string()),
            created_at: Self::created_at(),
        }
    }

    /// Creation instant used by [`TestHarness::subject`].
    pub fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 15, 0, 0)
            .single()
            .unwrap_or_default()
    }

    pub async fn add_subject(&self, subject: &Subject) -> Result<(), CheckinError> {
        self.storage.upsert_subject(subject).await
    }
}

async fn seed_content(store: &SqliteStorage) -> Result<(), CheckinError> {
    for day in Day::ALL {
        for branch in SEEDED_BRANCHES {
            store
                .upsert_template(&Template {
                    key: format!("day{day}.{branch}"),
                    subject: format!("Day {day} check-in"),
                    body: "Hi there,\n\n{{diagnosis_insert}}\n\n{{encouragement}}".to_string(),
                    disclaimer: "This message is not medical advice.".to_string(),
                    channel: Channel::Email,
                })
                .await?;
            store
                .upsert_insert(&DiagnosisInsert {
                    code: DiagnosisCode::Sciatica,
                    day,
                    branch,
                    body: format!("Sciatica day {day} {branch} guidance."),
                })
                .await?;
        }
    }
    for line in ["Small steps add up.", "Keep moving gently."] {
        store.add_encouragement(line).await?;
    }
    Ok(())
}
