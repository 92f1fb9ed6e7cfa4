// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token authentication for admin routes.
//!
//! When no admin token is configured, all admin requests are rejected
//! (fail-closed).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

/// Authentication configuration for admin routes.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Expected bearer token. `None` rejects every admin request.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

impl AuthConfig {
    /// Whether `header` is `Bearer <expected token>`.
    pub fn accepts(&self, header: Option<&str>) -> bool {
        let Some(expected) = self.bearer_token.as_deref().filter(|t| !t.is_empty()) else {
            return false;
        };
        header
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| bool::from(token.as_bytes().ct_eq(expected.as_bytes())))
    }
}

/// Middleware that validates the admin bearer token.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth.bearer_token.is_none() {
        tracing::warn!("admin token not configured -- rejecting admin request");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());
    if auth.accepts(header) {
        Ok(next.run(request).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> AuthConfig {
        AuthConfig {
            bearer_token: token.map(String::from),
        }
    }

    #[test]
    fn missing_token_rejects_everything() {
        let auth = config(None);
        assert!(!auth.accepts(Some("Bearer anything")));
        assert!(!auth.accepts(None));
        assert!(!config(Some("")).accepts(Some("Bearer ")));
    }

    #[test]
    fn token_must_match_exactly() {
        let auth = config(Some("secret-token"));
        assert!(auth.accepts(Some("Bearer secret-token")));
        assert!(!auth.accepts(Some("Bearer secret-token2")));
        assert!(!auth.accepts(Some("bearer secret-token")));
        assert!(!auth.accepts(Some("secret-token")));
        assert!(!auth.accepts(None));
    }

    #[test]
    fn auth_config_debug_redacts_token() {
        let debug_output = format!("{:?}", config(Some("secret-token")));
        assert!(!debug_output.contains("secret-token"));
        assert!(debug_output.contains("[redacted]"));
    }
}
