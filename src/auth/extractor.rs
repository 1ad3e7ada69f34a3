// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors forming the access gate.
//!
//! Use the `Auth` extractor in handlers to require authentication, or one of
//! the role gates to require both authentication and an allowed role:
//!
//! ```rust,ignore
//! async fn list_pending(StaffOnly(user): StaffOnly) -> impl IntoResponse {
//!     // user is a faculty member or an admin
//! }
//! ```
//!
//! Extraction runs before the handler body, so a rejected request never
//! touches the store.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser, Role};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Validates the bearer token from the Authorization header: signature,
/// structure and expiry.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved earlier in this request
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = state.sessions.verify(token).map_err(|e| {
            tracing::debug!(error_code = e.error_code(), "Rejected session token");
            e
        })?;

        parts.extensions.insert(user.clone());
        Ok(Auth(user))
    }
}

/// Declares an extractor that admits only the listed roles.
macro_rules! role_gate {
    ($(#[$meta:meta])* $name:ident => [$($role:expr),+ $(,)?]) => {
        $(#[$meta])*
        pub struct $name(pub AuthenticatedUser);

        impl $name {
            /// Roles admitted by this gate.
            pub const ALLOWED: &'static [Role] = &[$($role),+];
        }

        impl FromRequestParts<AppState> for $name {
            type Rejection = AuthError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let Auth(user) = Auth::from_request_parts(parts, state).await?;

                if let Err(e) = user.require_any(Self::ALLOWED) {
                    tracing::warn!(
                        user_id = user.user_id,
                        role = %user.role,
                        path = %parts.uri.path(),
                        "Role not permitted for operation"
                    );
                    return Err(e);
                }

                Ok($name(user))
            }
        }
    };
}

role_gate!(
    /// Extractor that requires the student role.
    StudentOnly => [Role::Student]
);

role_gate!(
    /// Extractor for the verification workflow (faculty or admin).
    StaffOnly => [Role::Faculty, Role::Admin]
);

role_gate!(
    /// Extractor that requires admin role.
    AdminOnly => [Role::Admin]
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::http::Request;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = test_state();
        let mut parts = parts_with_header(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_requires_bearer_scheme() {
        let (state, _temp_dir) = test_state();
        let token = state.sessions.issue(1, Role::Student).unwrap().token;
        let mut parts = parts_with_header(Some(&format!("Token {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));

        let mut parts = parts_with_header(Some("Bearer "));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_issued_token() {
        let (state, _temp_dir) = test_state();
        let token = state.sessions.issue(12, Role::Student).unwrap().token;
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state)
            .await
            .expect("token accepted");
        assert_eq!(user.user_id, 12);
        assert_eq!(user.role, Role::Student);
        assert!(parts.extensions.get::<AuthenticatedUser>().is_some());
    }

    #[tokio::test]
    async fn auth_extractor_rejects_garbage_token() {
        let (state, _temp_dir) = test_state();
        let mut parts = parts_with_header(Some("Bearer abc.def.ghi"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[tokio::test]
    async fn admin_only_rejects_faculty() {
        let (state, _temp_dir) = test_state();
        let token = state.sessions.issue(2, Role::Faculty).unwrap().token;
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn staff_only_admits_faculty_and_admin() {
        let (state, _temp_dir) = test_state();
        for role in [Role::Faculty, Role::Admin] {
            let token = state.sessions.issue(5, role).unwrap().token;
            let mut parts = parts_with_header(Some(&format!("Bearer {token}")));
            let StaffOnly(user) = StaffOnly::from_request_parts(&mut parts, &state)
                .await
                .expect("staff admitted");
            assert_eq!(user.role, role);
        }

        let token = state.sessions.issue(6, Role::Student).unwrap().token;
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));
        let result = StaffOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn student_only_rejects_admin() {
        let (state, _temp_dir) = test_state();
        let token = state.sessions.issue(1, Role::Admin).unwrap().token;
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let result = StudentOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[test]
    fn gate_allow_lists() {
        assert_eq!(StudentOnly::ALLOWED, &[Role::Student]);
        assert_eq!(StaffOnly::ALLOWED, &[Role::Faculty, Role::Admin]);
        assert_eq!(AdminOnly::ALLOWED, &[Role::Admin]);
    }
}
