// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the check-in outreach engine.

use thiserror::Error;

use crate::types::FailureTag;

/// The primary error type used across all adapter traits and core operations.
#[derive(Debug, Error)]
pub enum CheckinError {
    /// Configuration errors (missing signing secret, invalid timezone, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Delivery transport errors (SMTP rejection, SMS API failure).
    ///
    /// `message` is recorded verbatim in a failed item's `last_error`.
    #[error("{message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Content could not be resolved for a queue item.
    #[error("content resolution failed: {0}")]
    Content(FailureTag),

    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CheckinError {
    /// Build a transport error from a plain message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }
}
