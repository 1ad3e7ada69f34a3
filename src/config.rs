// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into [`ServerConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5000` |
//! | `DATA_DIR` | Directory holding `portal.redb` | `./data` |
//! | `JWT_SECRET` | HMAC secret for session tokens | random per process |
//! | `SESSION_TTL_HOURS` | Session token lifetime | `24` |
//! | `PASSWORD_HASH_ITERATIONS` | PBKDF2 iteration count | `100000` |
//! | `VERIFY_POLICY` | `allow_override` or `reject_decided` | `allow_override` |
//! | `SEED_DEMO_DATA` | Seed demo accounts and catalog when empty | `false` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS) | unset |
//! | `TLS_KEY_PATH` | PEM private key (enables HTTPS) | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::password::DEFAULT_ITERATIONS;
use crate::auth::session::{DEFAULT_SESSION_TTL_HOURS, MAX_SESSION_TTL_HOURS};
use crate::registration::VerifyPolicy;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
///
/// The portal database file is created inside it on first start.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Secret used to sign session tokens. Without it every restart
/// invalidates all issued sessions.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const SESSION_TTL_HOURS_ENV: &str = "SESSION_TTL_HOURS";
pub const PASSWORD_HASH_ITERATIONS_ENV: &str = "PASSWORD_HASH_ITERATIONS";
pub const VERIFY_POLICY_ENV: &str = "VERIFY_POLICY";
pub const SEED_DEMO_DATA_ENV: &str = "SEED_DEMO_DATA";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

/// Certificate and key for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub data_dir: PathBuf,
    /// `None` means a random secret is generated at startup.
    pub jwt_secret: Option<String>,
    pub session_ttl_hours: i64,
    pub password_hash_iterations: u32,
    pub verify_policy: VerifyPolicy,
    pub seed_demo_data: bool,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            jwt_secret: None,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            password_hash_iterations: DEFAULT_ITERATIONS,
            verify_policy: VerifyPolicy::default(),
            seed_demo_data: false,
            tls: None,
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source. Unset and blank variables
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let host = match get(HOST_ENV) {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(HOST_ENV, &v, e))?,
            None => defaults.host,
        };

        let port = parse_or(&get, PORT_ENV, defaults.port)?;

        let data_dir = get(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let session_ttl_hours: i64 =
            parse_or(&get, SESSION_TTL_HOURS_ENV, defaults.session_ttl_hours)?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
            return Err(ConfigError::invalid(
                SESSION_TTL_HOURS_ENV,
                &session_ttl_hours.to_string(),
                "must be between 1 and 8760 hours",
            ));
        }

        let password_hash_iterations: u32 = parse_or(
            &get,
            PASSWORD_HASH_ITERATIONS_ENV,
            defaults.password_hash_iterations,
        )?;
        if password_hash_iterations == 0 {
            return Err(ConfigError::invalid(
                PASSWORD_HASH_ITERATIONS_ENV,
                "0",
                "must be positive",
            ));
        }

        let verify_policy = parse_or(&get, VERIFY_POLICY_ENV, defaults.verify_policy)?;
        let log_format = parse_or(&get, LOG_FORMAT_ENV, defaults.log_format)?;

        let seed_demo_data = match get(SEED_DEMO_DATA_ENV) {
            Some(v) => parse_bool(&v).ok_or_else(|| {
                ConfigError::invalid(SEED_DEMO_DATA_ENV, &v, "expected true or false")
            })?,
            None => defaults.seed_demo_data,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        Ok(Self {
            host,
            port,
            data_dir,
            jwt_secret: get(JWT_SECRET_ENV),
            session_ttl_hours,
            password_hash_iterations,
            verify_policy,
            seed_demo_data,
            tls,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(crate::storage::DATABASE_FILE)
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(var, &v, e)),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
