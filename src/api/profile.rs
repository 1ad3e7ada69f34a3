// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Profile of the authenticated caller.

use axum::{extract::State, Json};

use super::extract::ApiJson;
use crate::{
    auth::Auth,
    error::ApiError,
    models::{Profile, ProfileDetails, UpdateProfileRequest},
    state::AppState,
    storage::{ProfileChanges, UserRepository},
};

/// Get the caller's profile.
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller profile", body = Profile),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn get_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Profile>, ApiError> {
    let stored = UserRepository::new(&state.db).get(user.user_id)?;
    Ok(Json(stored.profile()))
}

/// Update the caller's name, email and role-specific fields.
///
/// Fields that do not apply to the caller's role are ignored. Role and
/// password cannot be changed here.
#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = Profile),
        (status = 400, description = "Invalid field"),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let changes = ProfileChanges {
        name: request.name,
        email: request.email,
        details: ProfileDetails {
            register_no: request.register_no,
            department: request.department,
            year: request.year,
            staff_id: request.staff_id,
        },
    };

    let updated = UserRepository::new(&state.db).update_profile(user.user_id, changes)?;
    tracing::info!(user_id = updated.id, "Profile updated");

    Ok(Json(updated.profile()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::test_support::{create_user, test_state};
    use axum::http::StatusCode;

    fn caller(user_id: u64, role: Role) -> Auth {
        Auth(AuthenticatedUser {
            user_id,
            role,
            session_id: "test-session".into(),
            expires_at: 0,
        })
    }

    #[tokio::test]
    async fn get_profile_returns_public_fields() {
        let (state, _dir) = test_state();
        let id = create_user(&state, "ada@university.edu", "analytical", Role::Student);

        let Json(profile) = get_profile(caller(id, Role::Student), State(state))
            .await
            .expect("profile loads");
        assert_eq!(profile.user.id, id);
        assert_eq!(profile.user.email, "ada@university.edu");
        assert_eq!(profile.details, ProfileDetails::default());
    }

    #[tokio::test]
    async fn student_updates_only_student_fields() {
        let (state, _dir) = test_state();
        let id = create_user(&state, "ada@university.edu", "analytical", Role::Student);

        let Json(profile) = update_profile(
            caller(id, Role::Student),
            State(state.clone()),
            ApiJson(UpdateProfileRequest {
                name: Some("Ada King".into()),
                register_no: Some("R-1815".into()),
                year: Some("3".into()),
                staff_id: Some("S-1".into()),
                ..Default::default()
            }),
        )
        .await
        .expect("update succeeds");

        assert_eq!(profile.user.name, "Ada King");
        assert_eq!(profile.user.role, Role::Student);
        assert_eq!(profile.details.register_no.as_deref(), Some("R-1815"));
        assert_eq!(profile.details.year.as_deref(), Some("3"));
        assert_eq!(profile.details.staff_id, None);

        // Blank clears
        let Json(profile) = update_profile(
            caller(id, Role::Student),
            State(state),
            ApiJson(UpdateProfileRequest {
                year: Some("  ".into()),
                ..Default::default()
            }),
        )
        .await
        .expect("update succeeds");
        assert_eq!(profile.details.year, None);
        assert_eq!(profile.details.register_no.as_deref(), Some("R-1815"));
    }

    #[tokio::test]
    async fn changing_to_taken_email_conflicts() {
        let (state, _dir) = test_state();
        let id = create_user(&state, "ada@university.edu", "analytical", Role::Student);
        create_user(&state, "grace@university.edu", "compiler", Role::Faculty);

        let err = update_profile(
            caller(id, Role::Student),
            State(state),
            ApiJson(UpdateProfileRequest {
                email: Some("Grace@University.edu".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
