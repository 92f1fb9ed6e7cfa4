// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content resolution for check-in messages.
//!
//! Two independent axes select copy: the diagnosis code (strict, never falls
//! back) and the response branch (falls back through a fixed table). The
//! encouragement line is drawn at random and is the only non-deterministic
//! piece. Composition is plain marker substitution.

pub mod compose;
pub mod diagnosis;
pub mod encouragement;
pub mod fallback;
pub mod resolver;

pub use compose::{
    compose_message, ActionLink, ComposedMessage, ENCOURAGEMENT_MARKER, INSERT_MARKER,
};
pub use diagnosis::resolve_diagnosis_code;
pub use encouragement::{pick_encouragement, BUILTIN_ENCOURAGEMENTS};
pub use fallback::branch_fallback_chain;
pub use resolver::{lookup_insert, resolve_content, resolve_insert, ResolvedContent};
