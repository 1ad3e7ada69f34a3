// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::Request,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Role,
    models::{
        CreateExamRequest, CreateSubjectRequest, Exam, ExamListing, LoginRequest, LoginResponse,
        PaymentStatus, PendingRegistration, Profile, ProfileDetails, PublicUser, RegisterRequest,
        Registration, SignupRequest, Slot, StatsResponse, StudentRegistration, Subject,
        UpdateProfileRequest, VerifyRequest, VerifyResponse,
    },
    registration::RegistrationStatus,
    state::AppState,
};

pub mod auth;
pub mod exams;
pub mod extract;
pub mod health;
pub mod profile;
pub mod registrations;
pub mod stats;
pub mod subjects;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/subjects",
            get(subjects::list_subjects).post(subjects::create_subject),
        )
        .route("/exams", get(exams::list_exams).post(exams::create_exam))
        .route("/register", post(registrations::register))
        .route(
            "/registrations/my",
            get(registrations::list_my_registrations),
        )
        .route(
            "/registrations/pending",
            get(registrations::list_pending_registrations),
        )
        .route(
            "/registrations/{id}/verify",
            post(registrations::verify_registration),
        )
        .route("/stats", get(stats::get_stats));

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup,
        auth::login,
        profile::get_profile,
        profile::update_profile,
        subjects::list_subjects,
        subjects::create_subject,
        exams::list_exams,
        exams::create_exam,
        registrations::register,
        registrations::list_my_registrations,
        registrations::list_pending_registrations,
        registrations::verify_registration,
        stats::get_stats,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Role,
            SignupRequest,
            LoginRequest,
            LoginResponse,
            PublicUser,
            Profile,
            ProfileDetails,
            UpdateProfileRequest,
            Subject,
            CreateSubjectRequest,
            Slot,
            Exam,
            ExamListing,
            CreateExamRequest,
            RegistrationStatus,
            PaymentStatus,
            Registration,
            RegisterRequest,
            StudentRegistration,
            PendingRegistration,
            VerifyRequest,
            VerifyResponse,
            StatsResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Signup and login"),
        (name = "Profile", description = "Caller profile"),
        (name = "Catalog", description = "Subjects and exam schedule"),
        (name = "Registrations", description = "Exam registration and verification"),
        (name = "Admin", description = "Admin dashboard"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
