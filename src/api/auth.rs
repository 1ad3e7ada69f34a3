// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signup and login (session issuer endpoints).

use axum::{extract::State, http::StatusCode, Json};

use super::extract::{required, ApiJson};
use crate::{
    auth::{AuthError, Role},
    error::ApiError,
    models::{LoginRequest, LoginResponse, PublicUser, SignupRequest},
    state::AppState,
    storage::{NewUser, UserRepository},
};

/// Shortest password accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Create an account.
///
/// The password is stored as a salted PBKDF2 hash. No session is issued;
/// the client logs in afterwards.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = PublicUser),
        (status = 400, description = "Missing or invalid field"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let name = required(request.name, "name")?;
    let email = required(request.email, "email")?;
    let password = request
        .password
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing required field: password"))?;
    let role = required(request.role, "role")?;

    let role = Role::parse(&role).ok_or_else(|| ApiError::bad_request("Invalid role"))?;
    if !email.contains('@') {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let hasher = state.passwords;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await?
        .map_err(ApiError::internal)?;

    let user = UserRepository::new(&state.db).create(NewUser {
        name,
        email,
        password_hash,
        role,
    })?;

    tracing::info!(user_id = user.id, role = %user.role, "User signed up");

    Ok((StatusCode::CREATED, Json(user.public())))
}

/// Log in and receive a bearer token valid for 24 hours.
///
/// Unknown email and wrong password are indistinguishable to the caller.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing field"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = required(request.email, "email")?;
    let password = request
        .password
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing required field: password"))?;

    let user = UserRepository::new(&state.db).find_by_email(&email)?;

    let hasher = state.passwords;
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => hasher.verify(&password, &hash),
        None => hasher.verify_nothing(&password),
    })
    .await?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::debug!("Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let issued = state.sessions.issue(user.id, user.role)?;
    tracing::info!(user_id = user.id, role = %user.role, session_id = %issued.session_id, "User logged in");

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: user.public(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_user, test_state};

    fn signup_request(email: &str, password: &str, role: &str) -> SignupRequest {
        SignupRequest {
            name: Some("Ada Lovelace".into()),
            email: Some(email.into()),
            password: Some(password.into()),
            role: Some(role.into()),
        }
    }

    #[tokio::test]
    async fn signup_stores_hash_not_plaintext() {
        let (state, _dir) = test_state();

        let (status, Json(user)) = signup(
            State(state.clone()),
            ApiJson(signup_request("Ada@University.edu", "analytical", "student")),
        )
        .await
        .expect("signup succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user.email, "ada@university.edu");
        assert_eq!(user.role, Role::Student);

        let stored = UserRepository::new(&state.db).get(user.id).unwrap();
        assert_ne!(stored.password_hash, "analytical");
        assert!(!stored.password_hash.contains("analytical"));
        assert!(state.passwords.verify("analytical", &stored.password_hash));
    }

    #[tokio::test]
    async fn signup_rejects_missing_and_invalid_fields() {
        let (state, _dir) = test_state();

        let mut request = signup_request("ada@university.edu", "analytical", "student");
        request.name = None;
        let err = signup(State(state.clone()), ApiJson(request)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = signup(
            State(state.clone()),
            ApiJson(signup_request("ada@university.edu", "analytical", "dean")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Invalid role");

        let err = signup(
            State(state.clone()),
            ApiJson(signup_request("ada@university.edu", "short", "student")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = signup(
            State(state),
            ApiJson(signup_request("ada.university.edu", "analytical", "student")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_password_is_rejected() {
        let (state, _dir) = test_state();

        let err = signup(
            State(state.clone()),
            ApiJson(signup_request("ada@university.edu", "      ", "student")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing required field: password");
        assert!(UserRepository::new(&state.db)
            .find_by_email("ada@university.edu")
            .unwrap()
            .is_none());

        let err = login(
            State(state),
            ApiJson(LoginRequest {
                email: Some("ada@university.edu".into()),
                password: Some(" \t ".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn password_keeps_surrounding_whitespace() {
        let (state, _dir) = test_state();

        let (_, Json(user)) = signup(
            State(state.clone()),
            ApiJson(signup_request("ada@university.edu", " padded secret ", "student")),
        )
        .await
        .expect("signup succeeds");

        let stored = UserRepository::new(&state.db).get(user.id).unwrap();
        assert!(state.passwords.verify(" padded secret ", &stored.password_hash));
        assert!(!state.passwords.verify("padded secret", &stored.password_hash));
    }

    #[tokio::test]
    async fn signup_duplicate_email_conflicts() {
        let (state, _dir) = test_state();
        create_user(&state, "ada@university.edu", "analytical", Role::Student);

        let err = signup(
            State(state),
            ApiJson(signup_request(" ADA@university.edu", "different", "faculty")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn login_with_correct_password_issues_token() {
        let (state, _dir) = test_state();
        let id = create_user(&state, "grace@university.edu", "compiler", Role::Faculty);

        let Json(response) = login(
            State(state.clone()),
            ApiJson(LoginRequest {
                email: Some("Grace@University.edu".into()),
                password: Some("compiler".into()),
            }),
        )
        .await
        .expect("login succeeds");

        assert_eq!(response.user.id, id);
        assert_eq!(response.user.role, Role::Faculty);

        let session = state.sessions.verify(&response.token).unwrap();
        assert_eq!(session.user_id, id);
        assert_eq!(session.role, Role::Faculty);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_identically() {
        let (state, _dir) = test_state();
        create_user(&state, "grace@university.edu", "compiler", Role::Faculty);

        let wrong = login(
            State(state.clone()),
            ApiJson(LoginRequest {
                email: Some("grace@university.edu".into()),
                password: Some("Compiler".into()),
            }),
        )
        .await
        .unwrap_err();
        let unknown = login(
            State(state),
            ApiJson(LoginRequest {
                email: Some("nobody@university.edu".into()),
                password: Some("compiler".into()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong.status, unknown.status);
        assert_eq!(wrong.message, unknown.message);
        assert_eq!(wrong.code, Some("invalid_credentials"));
        assert_eq!(wrong.code, unknown.code);
    }
}
