// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use tempfile::TempDir;

use crate::auth::{PasswordHasher, Role, SessionIssuer};
use crate::models::{ExamId, Slot, SubjectId, UserId};
use crate::state::AppState;
use crate::storage::{
    ExamRepository, NewExam, NewSubject, NewUser, PortalDatabase, SubjectRepository,
    UserRepository,
};

pub const TEST_SECRET: &[u8] = b"test-secret-for-unit-tests-only!";

/// State over a fresh on-disk database. Keep the `TempDir` alive for the
/// duration of the test.
pub fn test_state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = PortalDatabase::open(&dir.path().join("portal.redb")).expect("open database");
    let state = AppState::new(db, SessionIssuer::new(TEST_SECRET))
        .with_password_hasher(PasswordHasher::new(1).expect("hasher"));
    (state, dir)
}

/// Insert a user with the given password and return its id.
pub fn create_user(state: &AppState, email: &str, password: &str, role: Role) -> UserId {
    let password_hash = state.passwords.hash(password).expect("hash");
    UserRepository::new(&state.db)
        .create(NewUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash,
            role,
        })
        .expect("create user")
        .id
}

/// Insert a subject and one exam for it.
pub fn create_exam(state: &AppState, code: &str, date: &str) -> (SubjectId, ExamId) {
    let subject = SubjectRepository::new(&state.db)
        .create(NewSubject {
            code: code.to_string(),
            name: format!("{code} Subject"),
            credits: 4,
            faculty_id: None,
        })
        .expect("create subject");
    let exam = ExamRepository::new(&state.db)
        .create(NewExam {
            subject_id: subject.id,
            date: date.parse().expect("date"),
            hall: "Hall A".to_string(),
            slot: Slot::Morning,
        })
        .expect("create exam");
    (subject.id, exam.id)
}

/// Bearer header value for a freshly issued token.
pub fn bearer(state: &AppState, user_id: UserId, role: Role) -> String {
    let token = state.sessions.issue(user_id, role).expect("issue").token;
    format!("Bearer {token}")
}
