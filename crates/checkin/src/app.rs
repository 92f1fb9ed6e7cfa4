// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of storage, codec, transports, and engine components from config.

use std::sync::Arc;

use checkin_config::CheckinConfig;
use checkin_core::{
    CheckinError, PluginAdapter, StorageAdapter, StoredLabelClassifier, TransportAdapter,
};
use checkin_engine::{Campaign, DispatchSettings, Dispatcher, ResponseRecorder, Scheduler};
use checkin_storage::SqliteStorage;
use checkin_token::TokenCodec;
use tracing::{debug, warn};

/// Fully wired engine components sharing one store.
pub struct App {
    pub config: CheckinConfig,
    pub store: Arc<dyn StorageAdapter>,
    pub scheduler: Scheduler,
    pub dispatcher: Arc<Dispatcher>,
    pub recorder: Arc<ResponseRecorder>,
}

impl App {
    /// Open the store and build every component.
    ///
    /// With `log_only`, channels without a configured transport log
    /// deliveries instead of failing them.
    pub async fn open(config: CheckinConfig, log_only: bool) -> Result<Self, CheckinError> {
        let codec = TokenCodec::from_config(&config.token)?;
        let campaign = Campaign::from_config(&config.campaign)?;

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let store: Arc<dyn StorageAdapter> = Arc::new(storage);

        let router = checkin_transport::build_router(&config, log_only)?;
        let transport: Arc<dyn TransportAdapter> = Arc::new(router);

        if campaign.sandbox {
            warn!("campaign sandbox is on; queued items will not be sent");
        }

        let settings = DispatchSettings::from_config(&config.dispatch);
        let store_timeout = settings.store_timeout;
        let dispatcher = Dispatcher::new(
            store.clone(),
            transport,
            Arc::new(StoredLabelClassifier),
            codec.clone(),
            campaign.clone(),
            settings,
        );
        let recorder = ResponseRecorder::new(store.clone(), codec, campaign.clone())
            .with_store_timeout(store_timeout);
        let scheduler = Scheduler::new(store.clone(), campaign).with_store_timeout(store_timeout);

        debug!(path = %config.storage.database_path, "engine components ready");
        Ok(Self {
            config,
            store,
            scheduler,
            dispatcher: Arc::new(dispatcher),
            recorder: Arc::new(recorder),
        })
    }

    /// Checkpoint and close the store.
    pub async fn shutdown(&self) -> Result<(), CheckinError> {
        self.store.shutdown().await
    }
}
