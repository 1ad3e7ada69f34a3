// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Credentials, session tokens and the access gate for the portal API.
//!
//! ## Auth Flow
//!
//! 1. `POST /api/auth/signup` stores a salted PBKDF2 hash of the password
//! 2. `POST /api/auth/login` verifies the password and issues an HS256 token
//!    binding `{user id, role}`, valid for 24 hours
//! 3. Clients send `Authorization: Bearer <token>` on protected routes
//! 4. The extractors in [`extractor`] verify the token and check the
//!    operation's role allow-list before the handler runs
//!
//! ## Security
//!
//! - Plaintext passwords are never stored, logged or returned
//! - Unknown email and wrong password produce the same error
//! - No clock-skew leeway on token expiry

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod roles;
pub mod session;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, StaffOnly, StudentOnly};
pub use password::PasswordHasher;
pub use roles::Role;
pub use session::SessionIssuer;
