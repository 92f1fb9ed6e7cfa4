// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `checkin serve` command implementation.
//!
//! Runs the periodic dispatch runner and, when enabled, the HTTP gateway
//! until SIGINT or SIGTERM.

use std::time::Duration;

use checkin_core::CheckinError;
use checkin_engine::DispatchRunner;
use checkin_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig};
use tracing::{error, info, warn};

use crate::app::App;
use crate::shutdown;

/// Runs the `checkin serve` command.
pub async fn run_serve(app: App) -> Result<(), CheckinError> {
    info!(name = %app.config.service.name, "starting checkin serve");

    let cancel = shutdown::install_signal_handler();

    let dispatch = &app.config.dispatch;
    let runner = DispatchRunner::new(
        app.dispatcher.clone(),
        Duration::from_secs(dispatch.interval_secs),
        dispatch.batch_limit,
        app.dispatcher.mode_for(false),
    );
    let runner_cancel = cancel.clone();
    let runner_task = tokio::spawn(async move { runner.run(runner_cancel).await });

    let gateway = &app.config.gateway;
    let gateway_result = if gateway.enabled {
        if gateway.admin_token.is_none() {
            warn!("gateway.admin_token is not set; admin dispatch endpoint rejects all requests");
        }
        let state = GatewayState {
            dispatcher: app.dispatcher.clone(),
            recorder: app.recorder.clone(),
            store: app.store.clone(),
            batch_limit: dispatch.batch_limit,
            auth: AuthConfig {
                bearer_token: gateway.admin_token.clone(),
            },
            health: HealthState::default(),
        };
        let server_config = ServerConfig {
            host: gateway.host.clone(),
            port: gateway.port,
        };
        let result = checkin_gateway::start_server(&server_config, state, cancel.clone()).await;
        if result.is_err() {
            cancel.cancel();
        }
        result
    } else {
        info!("gateway disabled");
        cancel.cancelled().await;
        Ok(())
    };

    if let Err(e) = runner_task.await {
        error!(error = %e, "dispatch runner task failed");
    }

    if let Err(e) = app.shutdown().await {
        warn!(error = %e, "storage shutdown failed");
    }

    gateway_result?;
    info!("checkin serve shutdown complete");
    Ok(())
}
