// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};

use super::extract::{required, ApiJson};
use crate::{
    auth::AdminOnly,
    error::ApiError,
    models::{CreateSubjectRequest, Subject},
    state::AppState,
    storage::{NewSubject, SubjectRepository},
};

/// List all subjects.
#[utoipa::path(
    get,
    path = "/api/subjects",
    tag = "Catalog",
    responses((status = 200, description = "All subjects", body = [Subject]))
)]
pub async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<Subject>>, ApiError> {
    Ok(Json(SubjectRepository::new(&state.db).list()?))
}

/// Create a subject (admin only).
#[utoipa::path(
    post,
    path = "/api/subjects",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 400, description = "Missing or invalid field"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "Owning faculty not found"),
        (status = 409, description = "Duplicate subject code")
    )
)]
pub async fn create_subject(
    AdminOnly(user): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateSubjectRequest>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
    let code = required(request.code, "code")?;
    let name = required(request.name, "name")?;
    let credits = request
        .credits
        .ok_or_else(|| ApiError::bad_request("Missing required field: credits"))?;

    let subject = SubjectRepository::new(&state.db).create(NewSubject {
        code,
        name,
        credits,
        faculty_id: request.faculty_id,
    })?;

    tracing::info!(
        subject_id = subject.id,
        code = %subject.code,
        admin_id = user.user_id,
        "Subject created"
    );

    Ok((StatusCode::CREATED, Json(subject)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::test_support::test_state;

    fn admin() -> AdminOnly {
        AdminOnly(AuthenticatedUser {
            user_id: 1,
            role: Role::Admin,
            session_id: "test-session".into(),
            expires_at: 0,
        })
    }

    fn request(code: &str) -> CreateSubjectRequest {
        CreateSubjectRequest {
            code: Some(code.into()),
            name: Some("Computer Networks".into()),
            credits: Some(3),
            faculty_id: None,
        }
    }

    #[tokio::test]
    async fn create_then_list() {
        let (state, _dir) = test_state();

        let (status, Json(subject)) =
            create_subject(admin(), State(state.clone()), ApiJson(request("cs403")))
                .await
                .expect("create succeeds");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(subject.code, "CS403");

        let Json(subjects) = list_subjects(State(state)).await.expect("list succeeds");
        assert_eq!(subjects, vec![subject]);
    }

    #[tokio::test]
    async fn duplicate_code_conflicts() {
        let (state, _dir) = test_state();
        create_subject(admin(), State(state.clone()), ApiJson(request("CS403")))
            .await
            .expect("create succeeds");

        let err = create_subject(admin(), State(state), ApiJson(request("CS403")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn missing_credits_is_bad_request() {
        let (state, _dir) = test_state();
        let err = create_subject(
            admin(),
            State(state),
            ApiJson(CreateSubjectRequest {
                credits: None,
                ..request("CS403")
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing required field: credits");
    }
}
