// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Permissions
///
/// - `Student` - Registers for exams and sees their own registrations
/// - `Faculty` - Reviews pending registrations (approve / reject)
/// - `Admin` - Everything faculty can do, plus catalog management and stats
///
/// Roles are not hierarchical: every protected operation declares the exact
/// set of roles it admits (see [`crate::auth::extractor`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Enrolled student
    Student,
    /// Teaching staff, verifies registrations
    Faculty,
    /// Portal administrator
    Admin,
}

impl Role {
    /// Check whether this role appears in an allow-list.
    pub fn is_one_of(&self, allowed: &[Role]) -> bool {
        allowed.contains(self)
    }

    /// Parse role from string (case-insensitive, surrounding whitespace ignored).
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "student" => Some(Role::Student),
            "faculty" => Some(Role::Faculty),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_membership() {
        let staff = [Role::Faculty, Role::Admin];
        assert!(Role::Faculty.is_one_of(&staff));
        assert!(Role::Admin.is_one_of(&staff));
        assert!(!Role::Student.is_one_of(&staff));
        assert!(!Role::Admin.is_one_of(&[Role::Student]));
    }

    #[test]
    fn parse_accepts_known_roles_only() {
        assert_eq!(Role::parse("student"), Some(Role::Student));
        assert_eq!(Role::parse(" FACULTY "), Some(Role::Faculty));
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Role::Faculty).unwrap();
        assert_eq!(json, r#""faculty""#);
        let parsed: Role = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(parsed, Role::Admin);
    }
}
