// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the portal database.
//!
//! Each repository borrows the [`PortalDatabase`](super::PortalDatabase) and
//! runs every operation in its own redb transaction.

pub mod exams;
pub mod registrations;
pub mod subjects;
pub mod users;

pub use exams::{ExamRepository, NewExam};
pub use registrations::RegistrationRepository;
pub use subjects::{normalize_code, NewSubject, SubjectRepository};
pub use users::{normalize_email, NewUser, ProfileChanges, StoredUser, UserRepository};
