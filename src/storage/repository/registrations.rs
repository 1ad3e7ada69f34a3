// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration repository: persistence side of the registration engine.
//!
//! ## Invariants
//!
//! - At most one registration per (student, exam). The existence check and
//!   the insert share one write transaction, and the pair is recorded in
//!   `registration_pair_index`, so concurrent requests for the same pair
//!   produce exactly one row.
//! - Registrations are created `Pending` and only change through
//!   [`RegistrationRepository::verify`]. They are never deleted.

use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};

use super::super::database::{
    encode_row, next_id, read_all, read_row, PortalDatabase, StoreError, StoreResult, EXAMS,
    REGISTRATIONS, REGISTRATION_PAIR_INDEX, STUDENT_REGISTRATIONS, SUBJECTS, USERS,
};
use super::users::StoredUser;
use crate::models::{
    Exam, ExamId, PaymentStatus, PendingRegistration, Registration, RegistrationId,
    StudentRegistration, Subject, UserId,
};
use crate::registration::{apply_decision, Decision, RegistrationStatus, VerifyPolicy};

/// Repository for registration operations.
pub struct RegistrationRepository<'a> {
    db: &'a PortalDatabase,
}

impl<'a> RegistrationRepository<'a> {
    pub fn new(db: &'a PortalDatabase) -> Self {
        Self { db }
    }

    /// Register a student for an exam.
    ///
    /// Fails with `NotFound` for an unknown exam or student and with
    /// `Conflict` when the student already holds a registration for this
    /// exam, whatever its status.
    pub fn register(&self, student_id: UserId, exam_id: ExamId) -> StoreResult<Registration> {
        let write_txn = self.db.inner().begin_write()?;
        let registration = {
            let exams = write_txn.open_table(EXAMS)?;
            if read_row::<Exam, _>(&exams, exam_id)?.is_none() {
                return Err(StoreError::NotFound(format!("Exam {exam_id}")));
            }

            let users = write_txn.open_table(USERS)?;
            if read_row::<StoredUser, _>(&users, student_id)?.is_none() {
                return Err(StoreError::NotFound(format!("User {student_id}")));
            }

            let mut pair_index = write_txn.open_table(REGISTRATION_PAIR_INDEX)?;
            if pair_index.get((student_id, exam_id))?.is_some() {
                return Err(StoreError::Conflict(
                    "Already registered for this exam".into(),
                ));
            }

            let id = next_id(&write_txn, "registrations")?;
            let registration = Registration {
                id,
                student_id,
                exam_id,
                status: RegistrationStatus::Pending,
                payment_status: PaymentStatus::default(),
                created_at: Utc::now(),
                decided_by: None,
                decided_at: None,
            };

            let mut registrations = write_txn.open_table(REGISTRATIONS)?;
            registrations.insert(id, encode_row(&registration)?.as_slice())?;
            pair_index.insert((student_id, exam_id), id)?;

            let mut by_student = write_txn.open_table(STUDENT_REGISTRATIONS)?;
            by_student.insert((student_id, id), ())?;
            registration
        };
        write_txn.commit()?;

        Ok(registration)
    }

    /// Get a registration by id.
    pub fn get(&self, id: RegistrationId) -> StoreResult<Registration> {
        let read_txn = self.db.inner().begin_read()?;
        let registrations = read_txn.open_table(REGISTRATIONS)?;
        read_row(&registrations, id)?
            .ok_or_else(|| StoreError::NotFound(format!("Registration {id}")))
    }

    /// All registrations of one student, joined with exam and subject,
    /// ordered by exam date ascending.
    pub fn list_for_student(&self, student_id: UserId) -> StoreResult<Vec<StudentRegistration>> {
        let read_txn = self.db.inner().begin_read()?;
        let by_student = read_txn.open_table(STUDENT_REGISTRATIONS)?;
        let registrations = read_txn.open_table(REGISTRATIONS)?;
        let exams = read_txn.open_table(EXAMS)?;
        let subjects = read_txn.open_table(SUBJECTS)?;

        let mut rows = Vec::new();
        for entry in by_student.range((student_id, 0)..=(student_id, u64::MAX))? {
            let (key, _) = entry?;
            let (_, registration_id) = key.value();

            let Some(registration) = read_row::<Registration, _>(&registrations, registration_id)?
            else {
                continue;
            };
            let Some((exam, subject)) = join_exam(&exams, &subjects, registration.exam_id)? else {
                continue;
            };

            rows.push(StudentRegistration {
                id: registration.id,
                exam_id: exam.id,
                code: subject.code,
                name: subject.name,
                date: exam.date,
                hall: exam.hall,
                slot: exam.slot,
                status: registration.status,
                payment_status: registration.payment_status,
            });
        }

        rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    /// Every pending registration across all students, joined with the
    /// student, exam and subject, ordered by exam date ascending.
    ///
    /// Full scan of the registrations table, sized for one institution's
    /// exam cycle.
    pub fn list_pending(&self) -> StoreResult<Vec<PendingRegistration>> {
        let read_txn = self.db.inner().begin_read()?;
        let registrations = read_txn.open_table(REGISTRATIONS)?;
        let users = read_txn.open_table(USERS)?;
        let exams = read_txn.open_table(EXAMS)?;
        let subjects = read_txn.open_table(SUBJECTS)?;

        let mut rows = Vec::new();
        for registration in read_all::<Registration, _>(&registrations)? {
            if registration.status != RegistrationStatus::Pending {
                continue;
            }
            let Some(student) = read_row::<StoredUser, _>(&users, registration.student_id)? else {
                continue;
            };
            let Some((exam, subject)) = join_exam(&exams, &subjects, registration.exam_id)? else {
                continue;
            };

            rows.push(PendingRegistration {
                id: registration.id,
                student_id: student.id,
                student_name: student.name,
                email: student.email,
                exam_id: exam.id,
                code: subject.code,
                subject_name: subject.name,
                date: exam.date,
                slot: exam.slot,
                status: registration.status,
            });
        }

        rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    /// Record a decision on a registration.
    ///
    /// The read, the policy check and the write happen in one write
    /// transaction. Under [`VerifyPolicy::AllowOverride`] concurrent
    /// verifiers resolve by last write wins; under
    /// [`VerifyPolicy::RejectDecided`] the second one gets `Conflict`.
    pub fn verify(
        &self,
        id: RegistrationId,
        decision: Decision,
        decided_by: UserId,
        policy: VerifyPolicy,
    ) -> StoreResult<Registration> {
        let write_txn = self.db.inner().begin_write()?;
        let registration = {
            let mut registrations = write_txn.open_table(REGISTRATIONS)?;
            let mut registration: Registration = read_row(&registrations, id)?
                .ok_or_else(|| StoreError::NotFound(format!("Registration {id}")))?;

            registration.status = apply_decision(registration.status, decision, policy)
                .map_err(|e| StoreError::Conflict(e.to_string()))?;
            registration.decided_by = Some(decided_by);
            registration.decided_at = Some(Utc::now());

            registrations.insert(id, encode_row(&registration)?.as_slice())?;
            registration
        };
        write_txn.commit()?;

        Ok(registration)
    }

    pub fn count_pending(&self) -> StoreResult<usize> {
        let read_txn = self.db.inner().begin_read()?;
        let registrations = read_txn.open_table(REGISTRATIONS)?;
        let all: Vec<Registration> = read_all(&registrations)?;
        Ok(all
            .iter()
            .filter(|r| r.status == RegistrationStatus::Pending)
            .count())
    }
}

fn join_exam<E, S>(exams: &E, subjects: &S, exam_id: ExamId) -> StoreResult<Option<(Exam, Subject)>>
where
    E: ReadableTable<u64, &'static [u8]>,
    S: ReadableTable<u64, &'static [u8]>,
{
    let Some(exam) = read_row::<Exam, _>(exams, exam_id)? else {
        tracing::warn!(exam_id, "Registration references missing exam");
        return Ok(None);
    };
    let Some(subject) = read_row::<Subject, _>(subjects, exam.subject_id)? else {
        tracing::warn!(exam_id, subject_id = exam.subject_id, "Exam references missing subject");
        return Ok(None);
    };
    Ok(Some((exam, subject)))
}
