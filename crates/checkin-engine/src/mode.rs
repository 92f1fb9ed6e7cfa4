// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch mode and the delivery decision derived from it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a dispatch run treats items that are ready to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Deliver through the transport.
    Live,
    /// Compose everything, call no transport, mark items skipped.
    DryRun,
    /// Compose everything, call no transport, leave items queued.
    Sandbox,
}

impl DispatchMode {
    /// Combine the per-call dry-run request with the global sandbox flag.
    ///
    /// A dry run wins over sandbox.
    pub fn effective(dry_run: bool, sandbox: bool) -> Self {
        match (dry_run, sandbox) {
            (true, _) => DispatchMode::DryRun,
            (false, true) => DispatchMode::Sandbox,
            (false, false) => DispatchMode::Live,
        }
    }
}

/// What happens to a fully composed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryDecision {
    Deliver,
    MarkSkipped,
    LeaveQueued,
}

pub fn delivery_decision(mode: DispatchMode) -> DeliveryDecision {
    match mode {
        DispatchMode::Live => DeliveryDecision::Deliver,
        DispatchMode::DryRun => DeliveryDecision::MarkSkipped,
        DispatchMode::Sandbox => DeliveryDecision::LeaveQueued,
    }
}
