// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the check-in tables.

pub mod content;
pub mod queue;
pub mod responses;
pub mod subjects;
