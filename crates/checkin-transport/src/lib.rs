// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery transports for composed check-in messages.
//!
//! Each transport implements [`TransportAdapter`]. [`ChannelRouter`] picks the
//! transport matching a delivery's channel; [`build_router`] assembles it from
//! configuration, using [`LogTransport`] when a channel is not configured and
//! log-only delivery was requested.

pub mod log;
pub mod router;
pub mod smtp;
pub mod twilio;

use std::sync::Arc;

use tracing::info;

use checkin_config::CheckinConfig;
use checkin_core::{CheckinError, TransportAdapter};

pub use log::LogTransport;
pub use router::ChannelRouter;
pub use smtp::SmtpTransport;
pub use twilio::TwilioTransport;

/// Build the channel router from configuration.
///
/// With `log_only`, every channel without a configured transport falls back
/// to [`LogTransport`]. Otherwise unconfigured channels are left empty and
/// deliveries on them fail.
pub fn build_router(config: &CheckinConfig, log_only: bool) -> Result<ChannelRouter, CheckinError> {
    let fallback = || -> Option<Arc<dyn TransportAdapter>> {
        log_only.then(|| Arc::new(LogTransport) as Arc<dyn TransportAdapter>)
    };

    let email = match SmtpTransport::from_config(&config.email)? {
        Some(smtp) => Some(Arc::new(smtp) as Arc<dyn TransportAdapter>),
        None => fallback(),
    };
    let sms = match TwilioTransport::from_config(&config.sms)? {
        Some(twilio) => Some(Arc::new(twilio) as Arc<dyn TransportAdapter>),
        None => fallback(),
    };

    let router = ChannelRouter::new(email, sms);
    info!(
        email = router.email_name().unwrap_or("none"),
        sms = router.sms_name().unwrap_or("none"),
        "delivery transports configured"
    );
    Ok(router)
}
