// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed, expiring one-tap response tokens.
//!
//! A token is `base64url(payload) "." base64url(HMAC-SHA256(payload segment))`
//! with no padding. The payload is the JSON object
//! `{"s": subject_id, "d": day, "v": value, "e": expiry_unix_secs}`.
//! Tokens are not persisted; anyone holding the secret can verify them.

pub mod codec;

pub use codec::{ActionClaims, InvalidToken, TokenCodec};
