// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration endpoints.
//!
//! - Students register for exams and list their own registrations
//! - Faculty and admins list the pending queue and verify registrations

use axum::{extract::State, http::StatusCode, Json};

use super::extract::{ApiJson, ApiPath};
use crate::{
    auth::{Auth, StaffOnly, StudentOnly},
    error::ApiError,
    models::{
        PendingRegistration, RegisterRequest, Registration, RegistrationId, StudentRegistration,
        VerifyRequest, VerifyResponse,
    },
    registration::Decision,
    state::AppState,
    storage::RegistrationRepository,
};

/// Register the calling student for an exam.
///
/// The new registration starts `Pending`. A student holds at most one
/// registration per exam, including rejected ones.
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Registrations",
    security(("bearer_auth" = [])),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = Registration),
        (status = 400, description = "Exam ID missing"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Only students can register"),
        (status = 404, description = "Exam not found"),
        (status = 409, description = "Already registered for this exam")
    )
)]
pub async fn register(
    StudentOnly(user): StudentOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let exam_id = request
        .exam_id
        .ok_or_else(|| ApiError::bad_request("Exam ID is required"))?;

    let registration = RegistrationRepository::new(&state.db).register(user.user_id, exam_id)?;

    tracing::info!(
        registration_id = registration.id,
        student_id = user.user_id,
        exam_id,
        "Registration created"
    );

    Ok((StatusCode::CREATED, Json(registration)))
}

/// List the caller's registrations, by exam date.
#[utoipa::path(
    get,
    path = "/api/registrations/my",
    tag = "Registrations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's registrations", body = [StudentRegistration]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_registrations(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentRegistration>>, ApiError> {
    Ok(Json(
        RegistrationRepository::new(&state.db).list_for_student(user.user_id)?,
    ))
}

/// List all pending registrations (faculty or admin).
#[utoipa::path(
    get,
    path = "/api/registrations/pending",
    tag = "Registrations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending registrations", body = [PendingRegistration]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (faculty or admin required)")
    )
)]
pub async fn list_pending_registrations(
    StaffOnly(_user): StaffOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingRegistration>>, ApiError> {
    Ok(Json(RegistrationRepository::new(&state.db).list_pending()?))
}

/// Approve or reject a registration (faculty or admin).
///
/// `status` must be exactly `Approved` or `Rejected`. Whether an already
/// decided registration may be changed depends on `VERIFY_POLICY`.
#[utoipa::path(
    post,
    path = "/api/registrations/{id}/verify",
    tag = "Registrations",
    security(("bearer_auth" = [])),
    params(("id" = u64, Path, description = "Registration ID")),
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Decision recorded", body = VerifyResponse),
        (status = 400, description = "Invalid status"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (faculty or admin required)"),
        (status = 404, description = "Registration not found"),
        (status = 409, description = "Registration already decided")
    )
)]
pub async fn verify_registration(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RegistrationId>,
    ApiJson(request): ApiJson<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let decision = request
        .status
        .as_deref()
        .and_then(Decision::parse)
        .ok_or_else(|| ApiError::bad_request("Invalid status"))?;

    let registration = RegistrationRepository::new(&state.db).verify(
        id,
        decision,
        user.user_id,
        state.verify_policy,
    )?;

    tracing::info!(
        registration_id = id,
        status = %registration.status,
        verifier_id = user.user_id,
        verifier_role = %user.role,
        "Registration verified"
    );

    Ok(Json(VerifyResponse {
        message: format!(
            "Registration {}",
            registration.status.as_str().to_lowercase()
        ),
        registration,
    }))
}
