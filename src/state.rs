// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{PasswordHasher, SessionIssuer};
use crate::registration::VerifyPolicy;
use crate::storage::PortalDatabase;

/// Shared handles injected into every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Arc<PortalDatabase>,
    pub sessions: Arc<SessionIssuer>,
    pub passwords: PasswordHasher,
    pub verify_policy: VerifyPolicy,
}

impl AppState {
    pub fn new(db: PortalDatabase, sessions: SessionIssuer) -> Self {
        Self {
            db: Arc::new(db),
            sessions: Arc::new(sessions),
            passwords: PasswordHasher::default(),
            verify_policy: VerifyPolicy::default(),
        }
    }

    pub fn with_password_hasher(mut self, passwords: PasswordHasher) -> Self {
        self.passwords = passwords;
        self
    }

    pub fn with_verify_policy(mut self, verify_policy: VerifyPolicy) -> Self {
        self.verify_policy = verify_policy;
        self
    }
}
