// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store-backed insert lookup and content resolution.

use checkin_core::{Branch, CheckinError, Day, DiagnosisCode, DiagnosisInsert, StorageAdapter};
use tracing::debug;

use crate::encouragement::pick_encouragement;
use crate::fallback::branch_fallback_chain;

/// Insert text and encouragement line for one message.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContent {
    pub insert: DiagnosisInsert,
    pub encouragement: String,
}

/// Strict `(code, day, branch)` lookup. No fallback of any kind.
pub async fn lookup_insert(
    store: &dyn StorageAdapter,
    code: DiagnosisCode,
    day: Day,
    branch: Branch,
) -> Result<Option<DiagnosisInsert>, CheckinError> {
    store.get_insert(code, day, branch).await
}

/// Walk the branch fallback chain with the strict lookup.
pub async fn resolve_insert(
    store: &dyn StorageAdapter,
    code: DiagnosisCode,
    day: Day,
    branch: Branch,
) -> Result<Option<DiagnosisInsert>, CheckinError> {
    for candidate in branch_fallback_chain(branch) {
        if let Some(insert) = lookup_insert(store, code, day, *candidate).await? {
            if *candidate != branch {
                debug!(
                    %code,
                    %day,
                    from = %branch,
                    to = %candidate,
                    "insert resolved via branch fallback"
                );
            }
            return Ok(Some(insert));
        }
    }
    Ok(None)
}

/// Resolve the insert and draw an encouragement line.
///
/// Returns `Ok(None)` when no insert exists for the code, day, and branch chain.
pub async fn resolve_content(
    store: &dyn StorageAdapter,
    code: DiagnosisCode,
    day: Day,
    branch: Branch,
) -> Result<Option<ResolvedContent>, CheckinError> {
    let Some(insert) = resolve_insert(store, code, day, branch).await? else {
        return Ok(None);
    };
    let pool = store.list_encouragements().await?;
    let encouragement = pick_encouragement(&pool, &mut rand::thread_rng());
    Ok(Some(ResolvedContent {
        insert,
        encouragement,
    }))
}
