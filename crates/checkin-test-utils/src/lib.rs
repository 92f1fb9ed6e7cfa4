// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for check-in integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockTransport`] - Captures deliveries, optionally failing or stalling
//! - [`StaticClassifier`] - Returns a fixed diagnosis label
//! - [`StallingStorage`] - Wraps a store and hangs on chosen operations
//! - [`TestHarness`] - Temp SQLite store seeded with templates and inserts

pub mod harness;
pub mod mock_classifier;
pub mod mock_transport;
pub mod stalling_storage;

pub use harness::{TestHarness, TestHarnessBuilder, TEST_SECRET};
pub use mock_classifier::StaticClassifier;
pub use mock_transport::MockTransport;
pub use stalling_storage::StallingStorage;
