// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduling and dispatch for check-in touchpoints.
//!
//! The [`Scheduler`] turns a completed questionnaire into three queued
//! touchpoints. The [`Dispatcher`] gates, resolves, composes, and delivers
//! them. [`ResponseRecorder`] handles the one-tap links embedded in each
//! message, and [`DispatchRunner`] drives the dispatcher on an interval.

pub mod campaign;
pub mod dispatcher;
pub mod mode;
pub mod response;
pub mod runner;
pub mod scheduler;
pub mod timeout;
pub mod window;

pub use campaign::Campaign;
pub use dispatcher::{DispatchSettings, DispatchSummary, Dispatcher, ItemError};
pub use mode::{delivery_decision, DeliveryDecision, DispatchMode};
pub use response::{RecordError, ResponseAck, ResponseRecorder};
pub use runner::DispatchRunner;
pub use scheduler::{due_at, EnqueueOutcome, Scheduler, SkipReason};
pub use window::{is_before_start, is_within_window, WindowCheck, WindowReason};
