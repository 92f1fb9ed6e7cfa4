// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the engine's external boundaries.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod classifier;
pub mod storage;
pub mod transport;

pub use adapter::PluginAdapter;
pub use classifier::{DiagnosisClassifier, StoredLabelClassifier};
pub use storage::StorageAdapter;
pub use transport::TransportAdapter;
