// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Registration State Machine
//!
//! ```text
//!            verify(Approved)
//!   Pending ─────────────────▶ Approved
//!      │
//!      │     verify(Rejected)
//!      └─────────────────────▶ Rejected
//! ```
//!
//! `Approved` and `Rejected` are terminal. Whether a second verify on a
//! decided registration overwrites it or is refused depends on the
//! configured [`VerifyPolicy`].
//!
//! Persistence (the atomic "one registration per student and exam" insert
//! and the read-check-write of a verify) lives in
//! [`crate::storage::repository::registrations`]; this module only decides
//! which transitions are legal.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Approval status of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub fn is_decided(&self) -> bool {
        !matches!(self, RegistrationStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "Pending",
            RegistrationStatus::Approved => "Approved",
            RegistrationStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome chosen by a verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Parse a decision. Only the exact values `Approved` and `Rejected`
    /// are accepted; `Pending` in particular is not a decision.
    pub fn parse(value: &str) -> Option<Decision> {
        match value {
            "Approved" => Some(Decision::Approved),
            "Rejected" => Some(Decision::Rejected),
            _ => None,
        }
    }

    pub fn target(&self) -> RegistrationStatus {
        match self {
            Decision::Approved => RegistrationStatus::Approved,
            Decision::Rejected => RegistrationStatus::Rejected,
        }
    }
}

/// How to treat a verify on a registration that already has a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyPolicy {
    /// Unconditional overwrite, last write wins.
    #[default]
    AllowOverride,
    /// Decided registrations are frozen.
    RejectDecided,
}

impl FromStr for VerifyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow_override" | "allow-override" | "override" => Ok(VerifyPolicy::AllowOverride),
            "reject_decided" | "reject-decided" | "reject" => Ok(VerifyPolicy::RejectDecided),
            other => Err(format!("unknown verify policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("registration is already {current}")]
    AlreadyDecided { current: RegistrationStatus },
}

/// Compute the status after applying `decision` under `policy`.
pub fn apply_decision(
    current: RegistrationStatus,
    decision: Decision,
    policy: VerifyPolicy,
) -> Result<RegistrationStatus, TransitionError> {
    match (policy, current.is_decided()) {
        (VerifyPolicy::RejectDecided, true) => Err(TransitionError::AlreadyDecided { current }),
        _ => Ok(decision.target()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_parse_is_exact() {
        assert_eq!(Decision::parse("Approved"), Some(Decision::Approved));
        assert_eq!(Decision::parse("Rejected"), Some(Decision::Rejected));
        assert_eq!(Decision::parse("Pending"), None);
        assert_eq!(Decision::parse("approved"), None);
        assert_eq!(Decision::parse(""), None);
        assert_eq!(Decision::parse("Cancelled"), None);
    }

    #[test]
    fn pending_moves_to_either_terminal_state() {
        for policy in [VerifyPolicy::AllowOverride, VerifyPolicy::RejectDecided] {
            assert_eq!(
                apply_decision(RegistrationStatus::Pending, Decision::Approved, policy),
                Ok(RegistrationStatus::Approved)
            );
            assert_eq!(
                apply_decision(RegistrationStatus::Pending, Decision::Rejected, policy),
                Ok(RegistrationStatus::Rejected)
            );
        }
    }

    #[test]
    fn override_policy_rewrites_decided_registrations() {
        let policy = VerifyPolicy::AllowOverride;
        assert_eq!(
            apply_decision(RegistrationStatus::Approved, Decision::Approved, policy),
            Ok(RegistrationStatus::Approved)
        );
        assert_eq!(
            apply_decision(RegistrationStatus::Approved, Decision::Rejected, policy),
            Ok(RegistrationStatus::Rejected)
        );
    }

    #[test]
    fn reject_policy_freezes_decided_registrations() {
        let policy = VerifyPolicy::RejectDecided;
        assert_eq!(
            apply_decision(RegistrationStatus::Rejected, Decision::Approved, policy),
            Err(TransitionError::AlreadyDecided {
                current: RegistrationStatus::Rejected
            })
        );
        assert!(apply_decision(RegistrationStatus::Approved, Decision::Approved, policy).is_err());
    }

    #[test]
    fn verify_policy_from_str() {
        assert_eq!(
            "allow_override".parse::<VerifyPolicy>(),
            Ok(VerifyPolicy::AllowOverride)
        );
        assert_eq!(
            "REJECT_DECIDED".parse::<VerifyPolicy>(),
            Ok(VerifyPolicy::RejectDecided)
        );
        assert!("sometimes".parse::<VerifyPolicy>().is_err());
        assert_eq!(VerifyPolicy::default(), VerifyPolicy::AllowOverride);
    }

    #[test]
    fn status_defaults_to_pending() {
        assert_eq!(RegistrationStatus::default(), RegistrationStatus::Pending);
        assert!(!RegistrationStatus::Pending.is_decided());
        assert!(RegistrationStatus::Rejected.is_decided());
    }
}
