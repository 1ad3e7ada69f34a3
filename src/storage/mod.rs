// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state of the portal lives in a single redb file under
//! `DATA_DIR` (`portal.redb`).
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   portal.redb     # users, subjects, exams, registrations + indexes
//! ```
//!
//! ## Important Notes
//!
//! - Password hashes are stored, never plaintext passwords
//! - Uniqueness (email, subject code, student/exam pair) is checked and
//!   written in the same write transaction
//! - Nothing is ever deleted

pub mod database;
pub mod repository;
pub mod seed;

pub use database::{PortalDatabase, StoreError, StoreResult};
pub use repository::{
    ExamRepository, NewExam, NewSubject, NewUser, ProfileChanges, RegistrationRepository,
    StoredUser, SubjectRepository, UserRepository,
};
pub use seed::seed_demo_data;

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "portal.redb";
