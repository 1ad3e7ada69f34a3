// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize` and/or `Deserialize` plus
//! `ToSchema` for automatic JSON handling and OpenAPI documentation.
//!
//! Request bodies use `Option` fields so that a missing field surfaces as a
//! `400` validation error with a readable message rather than a
//! deserialization failure.
//!
//! ## Model Categories
//!
//! - **Users**: signup, login, public profile
//! - **Catalog**: subjects and scheduled exams
//! - **Registrations**: a student's request to sit an exam
//! - **Stats**: admin dashboard counters

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::registration::RegistrationStatus;

pub type UserId = u64;
pub type SubjectId = u64;
pub type ExamId = u64;
pub type RegistrationId = u64;

// =============================================================================
// Users
// =============================================================================

/// Request to create an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `student`, `faculty` or `admin`
    pub role: Option<String>,
}

/// Request to log in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public projection of a user. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
    pub user: PublicUser,
}

/// Role-specific profile fields. Which ones apply depends on the role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ProfileDetails {
    /// University register number (students)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_no: Option<String>,
    /// Department (students, faculty)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Year of study (students)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Staff identifier (faculty, admins)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
}

/// Full profile of the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Profile {
    #[serde(flatten)]
    pub user: PublicUser,
    #[serde(flatten)]
    pub details: ProfileDetails,
}

/// Profile update. Absent fields are left unchanged; blank optional fields
/// are cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub register_no: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub staff_id: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A subject offered by the university.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Subject {
    pub id: SubjectId,
    /// Unique course code, e.g. `CS401`
    pub code: String,
    pub name: String,
    pub credits: u32,
    /// Owning faculty member, if assigned
    pub faculty_id: Option<UserId>,
}

/// Request to create a subject (admin).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateSubjectRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub credits: Option<u32>,
    pub faculty_id: Option<UserId>,
}

/// Named time window for an exam sitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Slot {
    Morning,
    Afternoon,
}

impl Slot {
    /// Parse a slot name (case-insensitive).
    pub fn parse(s: &str) -> Option<Slot> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Some(Slot::Morning),
            "afternoon" => Some(Slot::Afternoon),
            _ => None,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::Morning => write!(f, "Morning"),
            Slot::Afternoon => write!(f, "Afternoon"),
        }
    }
}

/// A scheduled exam sitting for one subject.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Exam {
    pub id: ExamId,
    pub subject_id: SubjectId,
    pub date: NaiveDate,
    pub hall: String,
    pub slot: Slot,
}

/// Exam joined with its subject, as listed to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ExamListing {
    pub id: ExamId,
    pub subject_id: SubjectId,
    pub code: String,
    pub subject_name: String,
    pub date: NaiveDate,
    pub hall: String,
    pub slot: Slot,
}

/// Request to schedule an exam (admin).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateExamRequest {
    pub subject_id: Option<SubjectId>,
    /// ISO date, `YYYY-MM-DD`
    pub date: Option<String>,
    pub hall: Option<String>,
    /// `Morning` or `Afternoon`
    pub slot: Option<String>,
}

// =============================================================================
// Registrations
// =============================================================================

/// Informational payment flag carried on each registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum PaymentStatus {
    #[default]
    Paid,
}

/// A student's request to sit one exam.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Registration {
    pub id: RegistrationId,
    pub student_id: UserId,
    pub exam_id: ExamId,
    pub status: RegistrationStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    /// Faculty or admin who made the latest decision
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Request to register for an exam (student).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub exam_id: Option<ExamId>,
}

/// A student's own registration joined with exam and subject.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StudentRegistration {
    pub id: RegistrationId,
    pub exam_id: ExamId,
    pub code: String,
    /// Subject name
    pub name: String,
    pub date: NaiveDate,
    pub hall: String,
    pub slot: Slot,
    pub status: RegistrationStatus,
    pub payment_status: PaymentStatus,
}

/// A pending registration as shown in the verification queue.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PendingRegistration {
    pub id: RegistrationId,
    pub student_id: UserId,
    pub student_name: String,
    pub email: String,
    pub exam_id: ExamId,
    pub code: String,
    pub subject_name: String,
    pub date: NaiveDate,
    pub slot: Slot,
    pub status: RegistrationStatus,
}

/// Request to approve or reject a registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VerifyRequest {
    /// `Approved` or `Rejected`
    pub status: Option<String>,
}

/// Result of a verify.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub message: String,
    pub registration: Registration,
}

// =============================================================================
// Stats
// =============================================================================

/// Admin dashboard counters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_students: usize,
    pub total_exams: usize,
    pub pending_registrations: usize,
}
