// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifier label to diagnosis code mapping.
//!
//! This table is the only place raw classifier output is interpreted. Labels
//! not listed here have no code, and callers must treat that as a failure.

use checkin_core::DiagnosisCode;

/// Normalized label -> code. Keys are lowercase, single-spaced, with `-` and
/// `_` folded to spaces.
const LABEL_TABLE: &[(&str, DiagnosisCode)] = &[
    ("sciatica", DiagnosisCode::Sciatica),
    ("lumbar radiculopathy", DiagnosisCode::Sciatica),
    ("lumbar strain", DiagnosisCode::LumbarStrain),
    ("lumbar sprain", DiagnosisCode::LumbarStrain),
    ("lumbar muscle strain", DiagnosisCode::LumbarStrain),
    ("disc herniation", DiagnosisCode::DiscHerniation),
    ("herniated disc", DiagnosisCode::DiscHerniation),
    ("lumbar disc herniation", DiagnosisCode::DiscHerniation),
    ("facet joint syndrome", DiagnosisCode::FacetJointSyndrome),
    ("facet syndrome", DiagnosisCode::FacetJointSyndrome),
    ("sacroiliac dysfunction", DiagnosisCode::SacroiliacDysfunction),
    ("sacroiliac joint dysfunction", DiagnosisCode::SacroiliacDysfunction),
    ("si joint dysfunction", DiagnosisCode::SacroiliacDysfunction),
    ("spinal stenosis", DiagnosisCode::SpinalStenosis),
    ("lumbar spinal stenosis", DiagnosisCode::SpinalStenosis),
    ("nonspecific low back pain", DiagnosisCode::NonspecificLowBackPain),
    ("non specific low back pain", DiagnosisCode::NonspecificLowBackPain),
];

fn normalize(label: &str) -> String {
    label
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map a raw classifier label to a diagnosis code.
pub fn resolve_diagnosis_code(label: &str) -> Option<DiagnosisCode> {
    let key = normalize(label);
    if key.is_empty() {
        return None;
    }
    LABEL_TABLE
        .iter()
        .find(|(known, _)| *known == key)
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn known_labels_resolve_regardless_of_case_and_spacing() {
        assert_eq!(resolve_diagnosis_code("Sciatica"), Some(DiagnosisCode::Sciatica));
        assert_eq!(
            resolve_diagnosis_code("  Herniated   Disc "),
            Some(DiagnosisCode::DiscHerniation)
        );
        assert_eq!(
            resolve_diagnosis_code("SI-joint dysfunction"),
            Some(DiagnosisCode::SacroiliacDysfunction)
        );
    }

    #[test]
    fn every_code_is_reachable_from_its_own_name() {
        for (_, code) in LABEL_TABLE {
            let label: &'static str = (*code).into();
            assert_eq!(resolve_diagnosis_code(label), Some(*code), "{label}");
        }
    }

    #[test]
    fn unknown_or_empty_labels_have_no_code() {
        for label in ["", "   ", "back pain", "migraine", "sciatica?", "urgent"] {
            assert_eq!(resolve_diagnosis_code(label), None, "{label:?}");
        }
    }

    #[test]
    fn table_keys_are_normalized() {
        for (key, code) in LABEL_TABLE {
            assert_eq!(normalize(key), *key);
            assert!(DiagnosisCode::from_str(&code.to_string()).is_ok());
        }
    }
}
