// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Branch fallback table.

use checkin_core::Branch;

/// Branches to try, in order, when looking up content for `branch`.
///
/// Only the legacy `initial` label falls back (to `same`). Diagnosis never
/// falls back; see [`crate::resolver::lookup_insert`].
pub fn branch_fallback_chain(branch: Branch) -> &'static [Branch] {
    match branch {
        Branch::Initial => &[Branch::Initial, Branch::Same],
        Branch::Same => &[Branch::Same],
        Branch::Better => &[Branch::Better],
        Branch::Worse => &[Branch::Worse],
    }
}
