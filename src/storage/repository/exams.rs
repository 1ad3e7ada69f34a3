// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Exam repository (catalog store).
//!
//! No hall/slot/date overlap check is made: two exams may share a hall in
//! the same slot on the same day.

use chrono::NaiveDate;
use redb::{ReadableDatabase, ReadableTableMetadata};

use super::super::database::{
    encode_row, next_id, read_all, read_row, PortalDatabase, StoreError, StoreResult, EXAMS,
    SUBJECTS,
};
use crate::models::{Exam, ExamListing, Slot, Subject, SubjectId};

/// Input for [`ExamRepository::create`].
#[derive(Debug, Clone)]
pub struct NewExam {
    pub subject_id: SubjectId,
    pub date: NaiveDate,
    pub hall: String,
    pub slot: Slot,
}

/// Repository for exam operations.
pub struct ExamRepository<'a> {
    db: &'a PortalDatabase,
}

impl<'a> ExamRepository<'a> {
    pub fn new(db: &'a PortalDatabase) -> Self {
        Self { db }
    }

    /// Schedule an exam. Fails with `NotFound` if the subject is unknown.
    pub fn create(&self, new_exam: NewExam) -> StoreResult<Exam> {
        let write_txn = self.db.inner().begin_write()?;
        let exam = {
            let subjects = write_txn.open_table(SUBJECTS)?;
            let subject: Option<Subject> = read_row(&subjects, new_exam.subject_id)?;
            if subject.is_none() {
                return Err(StoreError::NotFound(format!(
                    "Subject {}",
                    new_exam.subject_id
                )));
            }

            let id = next_id(&write_txn, "exams")?;
            let exam = Exam {
                id,
                subject_id: new_exam.subject_id,
                date: new_exam.date,
                hall: new_exam.hall.trim().to_string(),
                slot: new_exam.slot,
            };

            let mut exams = write_txn.open_table(EXAMS)?;
            exams.insert(id, encode_row(&exam)?.as_slice())?;
            exam
        };
        write_txn.commit()?;

        Ok(exam)
    }

    /// List exams joined with their subjects, by date then id.
    pub fn list_with_subjects(&self) -> StoreResult<Vec<ExamListing>> {
        let read_txn = self.db.inner().begin_read()?;
        let exams = read_txn.open_table(EXAMS)?;
        let subjects = read_txn.open_table(SUBJECTS)?;

        let mut listings = Vec::new();
        for exam in read_all::<Exam, _>(&exams)? {
            let Some(subject) = read_row::<Subject, _>(&subjects, exam.subject_id)? else {
                tracing::warn!(exam_id = exam.id, subject_id = exam.subject_id, "Exam references missing subject");
                continue;
            };
            listings.push(ExamListing {
                id: exam.id,
                subject_id: subject.id,
                code: subject.code,
                subject_name: subject.name,
                date: exam.date,
                hall: exam.hall,
                slot: exam.slot,
            });
        }

        listings.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(listings)
    }

    pub fn count(&self) -> StoreResult<usize> {
        let read_txn = self.db.inner().begin_read()?;
        let exams = read_txn.open_table(EXAMS)?;
        Ok(exams.len()? as usize)
    }
}
