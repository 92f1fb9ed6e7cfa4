// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time bound for store and classifier calls.

use std::future::Future;
use std::time::Duration;

use checkin_config::model::DispatchConfig;
use checkin_core::CheckinError;

/// The configured default for `dispatch.store_timeout_secs`.
pub fn default_store_timeout() -> Duration {
    Duration::from_secs(DispatchConfig::default().store_timeout_secs)
}

/// Await `fut` for at most `duration`; running out becomes
/// [`CheckinError::Timeout`].
pub async fn within<T>(
    duration: Duration,
    fut: impl Future<Output = Result<T, CheckinError>>,
) -> Result<T, CheckinError> {
    tokio::time::timeout(duration, fut)
        .await
        .map_err(|_| CheckinError::Timeout { duration })?
}
