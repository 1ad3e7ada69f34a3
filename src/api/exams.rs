// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;

use super::extract::{required, ApiJson};
use crate::{
    auth::AdminOnly,
    error::ApiError,
    models::{CreateExamRequest, Exam, ExamListing, Slot},
    state::AppState,
    storage::{ExamRepository, NewExam},
};

/// List scheduled exams with their subjects, by date.
#[utoipa::path(
    get,
    path = "/api/exams",
    tag = "Catalog",
    responses((status = 200, description = "Scheduled exams", body = [ExamListing]))
)]
pub async fn list_exams(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamListing>>, ApiError> {
    Ok(Json(ExamRepository::new(&state.db).list_with_subjects()?))
}

/// Schedule an exam (admin only).
///
/// All fields are required. Halls are not checked for double booking.
#[utoipa::path(
    post,
    path = "/api/exams",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    request_body = CreateExamRequest,
    responses(
        (status = 201, description = "Exam scheduled", body = Exam),
        (status = 400, description = "Missing or invalid field"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "Subject not found")
    )
)]
pub async fn create_exam(
    AdminOnly(user): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateExamRequest>,
) -> Result<(StatusCode, Json<Exam>), ApiError> {
    let subject_id = request
        .subject_id
        .ok_or_else(|| ApiError::bad_request("Missing required field: subject_id"))?;
    let date = required(request.date, "date")?;
    let hall = required(request.hall, "hall")?;
    let slot = required(request.slot, "slot")?;

    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Invalid date (expected YYYY-MM-DD)"))?;
    let slot =
        Slot::parse(&slot).ok_or_else(|| ApiError::bad_request("Invalid slot (Morning or Afternoon)"))?;

    let exam = ExamRepository::new(&state.db).create(NewExam {
        subject_id,
        date,
        hall,
        slot,
    })?;

    tracing::info!(
        exam_id = exam.id,
        subject_id = exam.subject_id,
        date = %exam.date,
        admin_id = user.user_id,
        "Exam scheduled"
    );

    Ok((StatusCode::CREATED, Json(exam)))
}
