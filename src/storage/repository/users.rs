// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository (credential store).
//!
//! Users are created at signup, never deleted, and only their profile
//! fields change afterwards. Email uniqueness is enforced through the
//! `user_email_index` table inside the same write transaction as the row.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::super::database::{
    encode_row, next_id, read_all, read_row, PortalDatabase, StoreError, StoreResult,
    USERS, USER_EMAIL_INDEX,
};
use crate::auth::Role;
use crate::models::{Profile, ProfileDetails, PublicUser, UserId};

/// Canonical form used for storage and uniqueness: trimmed, NFKC, lower-case.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

/// User record as persisted. Holds the password hash, so it never crosses
/// the API boundary; use [`StoredUser::public`] or [`StoredUser::profile`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    #[serde(default)]
    pub details: ProfileDetails,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn profile(&self) -> Profile {
        Profile {
            user: self.public(),
            details: self.details.clone(),
        }
    }
}

/// Input for [`UserRepository::create`]. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Changes applied by [`UserRepository::update_profile`].
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub details: ProfileDetails,
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    db: &'a PortalDatabase,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a PortalDatabase) -> Self {
        Self { db }
    }

    /// Create a user. Fails with `Conflict` when the email is taken.
    pub fn create(&self, new_user: NewUser) -> StoreResult<StoredUser> {
        let email = normalize_email(&new_user.email);

        let write_txn = self.db.inner().begin_write()?;
        let user = {
            let mut email_index = write_txn.open_table(USER_EMAIL_INDEX)?;
            if email_index.get(email.as_str())?.is_some() {
                return Err(StoreError::Conflict("Email already registered".into()));
            }

            let id = next_id(&write_txn, "users")?;
            let user = StoredUser {
                id,
                name: new_user.name.trim().to_string(),
                email,
                password_hash: new_user.password_hash,
                role: new_user.role,
                details: ProfileDetails::default(),
                created_at: Utc::now(),
            };

            let mut users = write_txn.open_table(USERS)?;
            users.insert(id, encode_row(&user)?.as_slice())?;
            email_index.insert(user.email.as_str(), id)?;
            user
        };
        write_txn.commit()?;

        Ok(user)
    }

    /// Get a user by id.
    pub fn get(&self, id: UserId) -> StoreResult<StoredUser> {
        let read_txn = self.db.inner().begin_read()?;
        let users = read_txn.open_table(USERS)?;
        read_row(&users, id)?.ok_or_else(|| StoreError::NotFound(format!("User {id}")))
    }

    /// Look up a user by email (normalized before lookup).
    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        let email = normalize_email(email);
        let read_txn = self.db.inner().begin_read()?;
        let email_index = read_txn.open_table(USER_EMAIL_INDEX)?;
        let Some(id) = email_index.get(email.as_str())?.map(|v| v.value()) else {
            return Ok(None);
        };
        let users = read_txn.open_table(USERS)?;
        read_row(&users, id)
    }

    /// Apply profile changes. Role and password hash are never touched.
    ///
    /// Only the details applicable to the user's role are kept; an empty
    /// string clears a detail.
    pub fn update_profile(&self, id: UserId, changes: ProfileChanges) -> StoreResult<StoredUser> {
        let write_txn = self.db.inner().begin_write()?;
        let user = {
            let mut users = write_txn.open_table(USERS)?;
            let mut user: StoredUser = read_row(&users, id)?
                .ok_or_else(|| StoreError::NotFound(format!("User {id}")))?;

            if let Some(name) = changes.name {
                let name = name.trim();
                if name.is_empty() {
                    return Err(StoreError::Invalid("Name cannot be empty".into()));
                }
                user.name = name.to_string();
            }

            if let Some(email) = changes.email {
                let email = normalize_email(&email);
                if !email.contains('@') {
                    return Err(StoreError::Invalid("Email is invalid".into()));
                }
                if email != user.email {
                    let mut email_index = write_txn.open_table(USER_EMAIL_INDEX)?;
                    if email_index.get(email.as_str())?.is_some() {
                        return Err(StoreError::Conflict("Email already registered".into()));
                    }
                    email_index.remove(user.email.as_str())?;
                    email_index.insert(email.as_str(), id)?;
                    user.email = email;
                }
            }

            merge_details(&mut user.details, changes.details, user.role);
            users.insert(id, encode_row(&user)?.as_slice())?;
            user
        };
        write_txn.commit()?;

        Ok(user)
    }

    /// Count users holding a role.
    pub fn count_by_role(&self, role: Role) -> StoreResult<usize> {
        let read_txn = self.db.inner().begin_read()?;
        let users = read_txn.open_table(USERS)?;
        let all: Vec<StoredUser> = read_all(&users)?;
        Ok(all.iter().filter(|u| u.role == role).count())
    }

    /// Whether any user exists (used by seeding).
    pub fn is_empty(&self) -> StoreResult<bool> {
        let read_txn = self.db.inner().begin_read()?;
        let users = read_txn.open_table(USERS)?;
        let empty = users.first()?.is_none();
        Ok(empty)
    }
}

fn merge_details(current: &mut ProfileDetails, incoming: ProfileDetails, role: Role) {
    fn apply(slot: &mut Option<String>, value: Option<String>) {
        if let Some(value) = value {
            let value = value.trim();
            *slot = (!value.is_empty()).then(|| value.to_string());
        }
    }

    match role {
        Role::Student => {
            apply(&mut current.register_no, incoming.register_no);
            apply(&mut current.department, incoming.department);
            apply(&mut current.year, incoming.year);
        }
        Role::Faculty => {
            apply(&mut current.department, incoming.department);
            apply(&mut current.staff_id, incoming.staff_id);
        }
        Role::Admin => {
            apply(&mut current.staff_id, incoming.staff_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (PortalDatabase, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = PortalDatabase::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "$pbkdf2-sha256$1$AAAA$AAAA".to_string(),
            role,
        }
    }

    #[test]
    fn create_and_get_user() {
        let (db, _dir) = temp_db();
        let repo = UserRepository::new(&db);

        let created = repo.create(new_user("ada@university.edu", Role::Student)).unwrap();
        assert_eq!(created.id, 1);

        let loaded = repo.get(created.id).unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.public().email, "ada@university.edu");
    }

    #[test]
    fn duplicate_email_rejected_case_insensitively() {
        let (db, _dir) = temp_db();
        let repo = UserRepository::new(&db);

        repo.create(new_user("ada@university.edu", Role::Student)).unwrap();
        let result = repo.create(new_user("  ADA@University.edu ", Role::Faculty));
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn find_by_email_normalizes() {
        let (db, _dir) = temp_db();
        let repo = UserRepository::new(&db);

        let created = repo.create(new_user("grace@university.edu", Role::Faculty)).unwrap();
        let found = repo.find_by_email("Grace@University.EDU").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.find_by_email("nobody@university.edu").unwrap().is_none());
    }

    #[test]
    fn get_missing_user_is_not_found() {
        let (db, _dir) = temp_db();
        let repo = UserRepository::new(&db);
        assert!(matches!(repo.get(99), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn update_profile_keeps_role_applicable_fields() {
        let (db, _dir) = temp_db();
        let repo = UserRepository::new(&db);
        let student = repo.create(new_user("s@university.edu", Role::Student)).unwrap();

        let updated = repo
            .update_profile(
                student.id,
                ProfileChanges {
                    name: Some("Renamed".into()),
                    email: None,
                    details: ProfileDetails {
                        register_no: Some("R-1".into()),
                        department: Some("CSE".into()),
                        year: Some("3".into()),
                        staff_id: Some("should be ignored".into()),
                    },
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.details.register_no.as_deref(), Some("R-1"));
        assert_eq!(updated.details.year.as_deref(), Some("3"));
        assert!(updated.details.staff_id.is_none());
        assert_eq!(updated.role, Role::Student);
        assert_eq!(updated.password_hash, student.password_hash);

        // Blank clears
        let cleared = repo
            .update_profile(
                student.id,
                ProfileChanges {
                    details: ProfileDetails {
                        year: Some("  ".into()),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(cleared.details.year.is_none());
        assert_eq!(cleared.details.register_no.as_deref(), Some("R-1"));
    }

    #[test]
    fn update_profile_email_moves_index() {
        let (db, _dir) = temp_db();
        let repo = UserRepository::new(&db);
        let a = repo.create(new_user("a@university.edu", Role::Faculty)).unwrap();
        repo.create(new_user("b@university.edu", Role::Faculty)).unwrap();

        let clash = repo.update_profile(
            a.id,
            ProfileChanges {
                email: Some("B@university.edu".into()),
                ..Default::default()
            },
        );
        assert!(matches!(clash, Err(StoreError::Conflict(_))));

        repo.update_profile(
            a.id,
            ProfileChanges {
                email: Some("c@university.edu".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(repo.find_by_email("a@university.edu").unwrap().is_none());
        assert_eq!(
            repo.find_by_email("c@university.edu").unwrap().unwrap().id,
            a.id
        );
        // The old address is free again
        repo.create(new_user("a@university.edu", Role::Student)).unwrap();
    }

    #[test]
    fn count_by_role_and_emptiness() {
        let (db, _dir) = temp_db();
        let repo = UserRepository::new(&db);
        assert!(repo.is_empty().unwrap());

        repo.create(new_user("s1@university.edu", Role::Student)).unwrap();
        repo.create(new_user("s2@university.edu", Role::Student)).unwrap();
        repo.create(new_user("f@university.edu", Role::Faculty)).unwrap();

        assert!(!repo.is_empty().unwrap());
        assert_eq!(repo.count_by_role(Role::Student).unwrap(), 2);
        assert_eq!(repo.count_by_role(Role::Admin).unwrap(), 0);
    }

    #[test]
    fn normalize_email_folds_compatibility_forms() {
        // Fullwidth letters fold to ASCII under NFKC
        assert_eq!(normalize_email(" ＡＤＡ@uni.edu "), "ada@uni.edu");
    }
}
