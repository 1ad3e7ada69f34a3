// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Demo data for a fresh portal.
//!
//! Enabled with `SEED_DEMO_DATA=true`. Accounts are only created when no
//! user exists, and the catalog only when no subject exists, so seeding is
//! safe to leave on across restarts.

use chrono::NaiveDate;

use super::database::{PortalDatabase, StoreError};
use super::repository::{
    ExamRepository, NewExam, NewSubject, NewUser, SubjectRepository, UserRepository,
};
use crate::auth::password::PasswordError;
use crate::auth::{PasswordHasher, Role};
use crate::models::Slot;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("invalid seed date {0}")]
    Date(&'static str),
}

const DEMO_ACCOUNTS: &[(&str, &str, &str, Role)] = &[
    ("Demo Student", "student@university.edu", "student123", Role::Student),
    ("Demo Faculty", "faculty@university.edu", "faculty123", Role::Faculty),
    ("Demo Admin", "admin@university.edu", "admin123", Role::Admin),
];

const DEMO_SUBJECTS: &[(&str, &str, u32)] = &[
    ("CS401", "Software Engineering", 4),
    ("CS402", "Database Management", 4),
    ("CS403", "Computer Networks", 3),
];

/// (subject code, date, hall, slot)
const DEMO_EXAMS: &[(&str, &str, &str, Slot)] = &[
    ("CS401", "2026-05-15", "Hall A", Slot::Morning),
    ("CS402", "2026-05-18", "Hall B", Slot::Afternoon),
];

/// Summary of what a seeding run created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub subjects: usize,
    pub exams: usize,
}

/// Seed demo accounts and catalog into an empty store.
///
/// Password hashing is CPU-bound; call this from a blocking context.
pub fn seed_demo_data(
    db: &PortalDatabase,
    hasher: &PasswordHasher,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    let users = UserRepository::new(db);
    if users.is_empty()? {
        for (name, email, password, role) in DEMO_ACCOUNTS {
            users.create(NewUser {
                name: (*name).to_string(),
                email: (*email).to_string(),
                password_hash: hasher.hash(password)?,
                role: *role,
            })?;
            report.users += 1;
        }
    }

    let subjects = SubjectRepository::new(db);
    if subjects.is_empty()? {
        let mut created = Vec::with_capacity(DEMO_SUBJECTS.len());
        for (code, name, credits) in DEMO_SUBJECTS {
            created.push(subjects.create(NewSubject {
                code: (*code).to_string(),
                name: (*name).to_string(),
                credits: *credits,
                faculty_id: None,
            })?);
        }
        report.subjects = created.len();

        let exams = ExamRepository::new(db);
        for (code, date, hall, slot) in DEMO_EXAMS {
            let Some(subject) = created.iter().find(|s| s.code == *code) else {
                continue;
            };
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| SeedError::Date(*date))?;
            exams.create(NewExam {
                subject_id: subject.id,
                date,
                hall: (*hall).to_string(),
                slot: *slot,
            })?;
            report.exams += 1;
        }
    }

    if report != SeedReport::default() {
        tracing::info!(
            users = report.users,
            subjects = report.subjects,
            exams = report.exams,
            "Seeded demo data"
        );
    }

    Ok(report)
}
