// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport adapter trait for outbound delivery (SMTP, SMS gateways).

use async_trait::async_trait;

use crate::error::CheckinError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Delivery, MessageId};

/// Adapter for the outbound mail/SMS boundary.
///
/// A failed send returns [`CheckinError::Transport`] whose message is
/// recorded verbatim on the queue item.
#[async_trait]
pub trait TransportAdapter: PluginAdapter {
    /// Sends a rendered message to its address.
    async fn send(&self, delivery: &Delivery) -> Result<MessageId, CheckinError>;
}
