// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifier boundary: questionnaire to raw diagnosis label.

use async_trait::async_trait;

use crate::types::Subject;

/// Produces the opaque diagnosis label for a subject's questionnaire.
///
/// The label is interpreted only by the content resolver's mapping table.
#[async_trait]
pub trait DiagnosisClassifier: Send + Sync + 'static {
    async fn classify(&self, subject: &Subject) -> Option<String>;
}

/// Classifier that returns the label recorded on the subject at completion time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredLabelClassifier;

#[async_trait]
impl DiagnosisClassifier for StoredLabelClassifier {
    async fn classify(&self, subject: &Subject) -> Option<String> {
        subject.diagnosis_label.clone()
    }
}
