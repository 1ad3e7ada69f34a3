// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthError, Role};
use crate::models::UserId;

/// Claims carried by a portal session token.
///
/// The token binds a user id to the role the user held at login time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject: the user id, as a decimal string
    pub sub: String,

    /// Role at issuance
    pub role: Role,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expiration (Unix seconds); the token is valid while `now < exp`
    pub exp: i64,

    /// Session id (random UUID)
    pub jti: String,
}

/// Authenticated user information extracted from a session token.
///
/// This is the primary type used throughout the application to represent
/// the caller of a protected operation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User id
    pub user_id: UserId,

    /// User's role
    pub role: Role,

    /// Session id (`jti` claim)
    pub session_id: String,

    /// Token expiration (Unix timestamp)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Build from verified claims.
    pub fn from_claims(claims: SessionClaims) -> Result<Self, AuthError> {
        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::MalformedToken)?;

        Ok(Self {
            user_id,
            role: claims.role,
            session_id: claims.jti,
            expires_at: claims.exp,
        })
    }

    /// Fail with `InsufficientPermissions` unless the role is allowed.
    pub fn require_any(&self, allowed: &[Role]) -> Result<(), AuthError> {
        if self.role.is_one_of(allowed) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }
}
