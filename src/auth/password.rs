// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Salted one-way password hashing (PBKDF2-HMAC-SHA256).
//!
//! Encoded format:
//!
//! ```text
//! $pbkdf2-sha256$<iterations>$<salt, base64>$<derived key, base64>
//! ```
//!
//! The iteration count travels with the hash, so raising
//! `PASSWORD_HASH_ITERATIONS` does not invalidate existing accounts.

use std::num::NonZeroU32;

use base64ct::{Base64, Encoding};
use ring::{
    pbkdf2,
    rand::{SecureRandom, SystemRandom},
};

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Default work factor.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Fixed salt used to burn one derivation when the account does not exist.
const DUMMY_SALT: [u8; SALT_LEN] = [0x5a; SALT_LEN];

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("iteration count must be non-zero")]
    ZeroIterations,

    #[error("system random number generator failed")]
    Random,
}

/// Password hasher with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: NonZeroU32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            iterations: NonZeroU32::MIN.saturating_add(DEFAULT_ITERATIONS - 1),
        }
    }
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Result<Self, PasswordError> {
        let iterations = NonZeroU32::new(iterations).ok_or(PasswordError::ZeroIterations)?;
        Ok(Self { iterations })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations.get()
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut salt = [0u8; SALT_LEN];
        SystemRandom::new()
            .fill(&mut salt)
            .map_err(|_| PasswordError::Random)?;

        let mut key = [0u8; KEY_LEN];
        pbkdf2::derive(ALGORITHM, self.iterations, &salt, password.as_bytes(), &mut key);

        Ok(format!(
            "${SCHEME}${}${}${}",
            self.iterations,
            Base64::encode_string(&salt),
            Base64::encode_string(&key)
        ))
    }

    /// Verify a password against an encoded hash.
    ///
    /// Malformed hashes never verify.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        let Some(parsed) = ParsedHash::parse(encoded) else {
            return false;
        };
        pbkdf2::verify(
            ALGORITHM,
            parsed.iterations,
            &parsed.salt,
            password.as_bytes(),
            &parsed.key,
        )
        .is_ok()
    }

    /// Spend the same work as a real verification and report failure.
    ///
    /// Used when the email is unknown so response time does not reveal
    /// which accounts exist.
    pub fn verify_nothing(&self, password: &str) -> bool {
        let mut key = [0u8; KEY_LEN];
        pbkdf2::derive(ALGORITHM, self.iterations, &DUMMY_SALT, password.as_bytes(), &mut key);
        false
    }
}

struct ParsedHash {
    iterations: NonZeroU32,
    salt: Vec<u8>,
    key: Vec<u8>,
}

impl ParsedHash {
    fn parse(encoded: &str) -> Option<Self> {
        let mut parts = encoded.strip_prefix('$')?.split('$');
        if parts.next()? != SCHEME {
            return None;
        }
        let iterations = NonZeroU32::new(parts.next()?.parse().ok()?)?;
        let salt = Base64::decode_vec(parts.next()?).ok()?;
        let key = Base64::decode_vec(parts.next()?).ok()?;
        if parts.next().is_some() || key.len() != KEY_LEN {
            return None;
        }
        Some(Self {
            iterations,
            salt,
            key,
        })
    }
}
