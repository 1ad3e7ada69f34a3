// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Subject repository (catalog store).

use redb::{ReadableDatabase, ReadableTable};

use super::super::database::{
    encode_row, next_id, read_all, read_row, PortalDatabase, StoreError, StoreResult,
    SUBJECTS, SUBJECT_CODE_INDEX, USERS,
};
use super::users::StoredUser;
use crate::auth::Role;
use crate::models::{Subject, UserId};

/// Canonical subject code: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Input for [`SubjectRepository::create`].
#[derive(Debug, Clone)]
pub struct NewSubject {
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub faculty_id: Option<UserId>,
}

/// Repository for subject operations.
pub struct SubjectRepository<'a> {
    db: &'a PortalDatabase,
}

impl<'a> SubjectRepository<'a> {
    pub fn new(db: &'a PortalDatabase) -> Self {
        Self { db }
    }

    /// Create a subject.
    ///
    /// Fails with `Conflict` on a duplicate code, `NotFound` when the owning
    /// faculty does not exist and `Invalid` when that user is not faculty.
    pub fn create(&self, new_subject: NewSubject) -> StoreResult<Subject> {
        let code = normalize_code(&new_subject.code);

        let write_txn = self.db.inner().begin_write()?;
        let subject = {
            let mut code_index = write_txn.open_table(SUBJECT_CODE_INDEX)?;
            if code_index.get(code.as_str())?.is_some() {
                return Err(StoreError::Conflict(format!("Subject code {code} already exists")));
            }

            if let Some(faculty_id) = new_subject.faculty_id {
                let users = write_txn.open_table(USERS)?;
                let owner: StoredUser = read_row(&users, faculty_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("User {faculty_id}")))?;
                if owner.role != Role::Faculty {
                    return Err(StoreError::Invalid(format!(
                        "User {faculty_id} is not a faculty member"
                    )));
                }
            }

            let id = next_id(&write_txn, "subjects")?;
            let subject = Subject {
                id,
                code,
                name: new_subject.name.trim().to_string(),
                credits: new_subject.credits,
                faculty_id: new_subject.faculty_id,
            };

            let mut subjects = write_txn.open_table(SUBJECTS)?;
            subjects.insert(id, encode_row(&subject)?.as_slice())?;
            code_index.insert(subject.code.as_str(), id)?;
            subject
        };
        write_txn.commit()?;

        Ok(subject)
    }

    /// List all subjects in creation order.
    pub fn list(&self) -> StoreResult<Vec<Subject>> {
        let read_txn = self.db.inner().begin_read()?;
        let subjects = read_txn.open_table(SUBJECTS)?;
        read_all(&subjects)
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        let read_txn = self.db.inner().begin_read()?;
        let subjects = read_txn.open_table(SUBJECTS)?;
        let empty = subjects.first()?.is_none();
        Ok(empty)
    }
}
