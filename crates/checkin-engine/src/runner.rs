// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic dispatch loop for long-running deployments.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::dispatcher::Dispatcher;
use crate::mode::DispatchMode;

/// Runs a dispatch batch every `interval` until cancelled.
pub struct DispatchRunner {
    dispatcher: Arc<Dispatcher>,
    interval: Duration,
    batch_limit: u32,
    mode: DispatchMode,
}

impl DispatchRunner {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        interval: Duration,
        batch_limit: u32,
        mode: DispatchMode,
    ) -> Self {
        Self {
            dispatcher,
            interval,
            batch_limit,
            mode,
        }
    }

    /// Runs the loop until `cancel` fires. A batch already in progress is
    /// allowed to finish.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            batch_limit = self.batch_limit,
            mode = %self.mode,
            "dispatch runner started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let batch = self.dispatcher.dispatch_due(self.batch_limit, self.mode);
                    if let Err(e) = batch.await {
                        error!(error = %e, "dispatch batch failed");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping dispatch runner");
                    break;
                }
            }
        }
    }
}
