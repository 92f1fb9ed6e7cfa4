// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-answer diagnosis classifier.

use std::time::Duration;

use async_trait::async_trait;

use checkin_core::{DiagnosisClassifier, Subject};

/// Returns the same label for every subject, ignoring stored data.
#[derive(Debug, Clone, Default)]
pub struct StaticClassifier {
    label: Option<String>,
    delay: Option<Duration>,
}

impl StaticClassifier {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            delay: None,
        }
    }

    /// A classifier that never produces a label.
    pub fn none() -> Self {
        Self::default()
    }

    /// Sleep for `delay` before answering each lookup.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl DiagnosisClassifier for StaticClassifier {
    async fn classify(&self, _subject: &Subject) -> Option<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.label.clone()
    }
}
