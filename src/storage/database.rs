// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded portal database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user id → serialized StoredUser (JSON bytes)
//! - `user_email_index`: normalized email → user id
//! - `subjects`: subject id → serialized Subject
//! - `subject_code_index`: normalized code → subject id
//! - `exams`: exam id → serialized Exam
//! - `registrations`: registration id → serialized Registration
//! - `registration_pair_index`: (student id, exam id) → registration id
//! - `student_registrations`: (student id, registration id) → ()
//! - `sequences`: relation name → last allocated id
//!
//! redb admits one write transaction at a time, so every uniqueness check
//! performed inside a write transaction is race-free with respect to the
//! insert that follows it.

use std::path::Path;

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::{de::DeserializeOwned, Serialize};

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

pub(crate) const USER_EMAIL_INDEX: TableDefinition<&str, u64> =
    TableDefinition::new("user_email_index");

pub(crate) const SUBJECTS: TableDefinition<u64, &[u8]> = TableDefinition::new("subjects");

pub(crate) const SUBJECT_CODE_INDEX: TableDefinition<&str, u64> =
    TableDefinition::new("subject_code_index");

pub(crate) const EXAMS: TableDefinition<u64, &[u8]> = TableDefinition::new("exams");

pub(crate) const REGISTRATIONS: TableDefinition<u64, &[u8]> =
    TableDefinition::new("registrations");

/// Uniqueness constraint: one registration per (student, exam).
pub(crate) const REGISTRATION_PAIR_INDEX: TableDefinition<(u64, u64), u64> =
    TableDefinition::new("registration_pair_index");

/// Key format `(student_id, registration_id)` so a student's rows form one range.
pub(crate) const STUDENT_REGISTRATIONS: TableDefinition<(u64, u64), ()> =
    TableDefinition::new("student_registrations");

const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid: {0}")]
    Invalid(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Row Helpers
// =============================================================================

pub(crate) fn encode_row<T: Serialize>(row: &T) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(row)?)
}

/// Fetch and decode one JSON row by id.
pub(crate) fn read_row<T, Tbl>(table: &Tbl, id: u64) -> StoreResult<Option<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<u64, &'static [u8]>,
{
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

/// Decode every row of a JSON table, in id order.
pub(crate) fn read_all<T, Tbl>(table: &Tbl) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<u64, &'static [u8]>,
{
    let mut rows = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        rows.push(serde_json::from_slice(value.value())?);
    }
    Ok(rows)
}

/// Allocate the next id of a relation inside the caller's write transaction.
///
/// Ids start at 1 and are never reused.
pub(crate) fn next_id(txn: &WriteTransaction, relation: &str) -> StoreResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let next = table.get(relation)?.map(|v| v.value()).unwrap_or(0) + 1;
    table.insert(relation, next)?;
    Ok(next)
}

// =============================================================================
// PortalDatabase
// =============================================================================

/// Embedded ACID store holding users, catalog and registrations.
pub struct PortalDatabase {
    db: Database,
}

impl PortalDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(USERS)?;
            write_txn.open_table(USER_EMAIL_INDEX)?;
            write_txn.open_table(SUBJECTS)?;
            write_txn.open_table(SUBJECT_CODE_INDEX)?;
            write_txn.open_table(EXAMS)?;
            write_txn.open_table(REGISTRATIONS)?;
            write_txn.open_table(REGISTRATION_PAIR_INDEX)?;
            write_txn.open_table(STUDENT_REGISTRATIONS)?;
            write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(crate) fn inner(&self) -> &Database {
        &self.db
    }

    /// Cheap liveness probe: open a read transaction and touch one table.
    pub fn check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        table.len()?;
        Ok(())
    }
}

impl std::fmt::Debug for PortalDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalDatabase").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
