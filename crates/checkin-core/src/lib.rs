// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the check-in outreach engine.
//!
//! This crate provides the error type, the domain types (queue items,
//! templates, diagnosis inserts, subjects), and the adapter traits for the
//! engine's external boundaries: the store, the delivery transport, and the
//! diagnosis classifier.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CheckinError;
pub use types::{
    AdapterType, Branch, Channel, Day, Delivery, DiagnosisCode, DiagnosisInsert, FailureTag,
    HealthStatus, MessageId, NewQueueItem, QueueItem, QueueStatus, ResponseRecord,
    ResponseValue, StatusTransition, Subject, Template,
};

pub use traits::{
    DiagnosisClassifier, PluginAdapter, StorageAdapter, StoredLabelClassifier, TransportAdapter,
};
