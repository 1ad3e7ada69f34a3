// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin dashboard counters.

use axum::{extract::State, Json};

use crate::{
    auth::{AdminOnly, Role},
    error::ApiError,
    models::StatsResponse,
    state::AppState,
    storage::{ExamRepository, RegistrationRepository, UserRepository},
};

/// Get system statistics (admin only).
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "System statistics", body = StatsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn get_stats(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    Ok(Json(StatsResponse {
        total_students: UserRepository::new(&state.db).count_by_role(Role::Student)?,
        total_exams: ExamRepository::new(&state.db).count()?,
        pending_registrations: RegistrationRepository::new(&state.db).count_pending()?,
    }))
}
