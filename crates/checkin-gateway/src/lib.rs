// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the check-in engine.
//!
//! Serves the one-tap response links embedded in outbound messages, an
//! authenticated "dispatch now" admin endpoint, and an unauthenticated
//! health check.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{router, start_server, GatewayState, HealthState, ServerConfig};
