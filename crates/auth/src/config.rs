//! Token configuration, loaded once at startup.
//!
//! The resulting [`TokenConfig`] is immutable and is handed to
//! [`crate::TokenService::new`]; nothing reads the environment after that.

use chrono::Duration;
use jsonwebtoken::Algorithm;
use thiserror::Error;

pub const SECRET_KEY: &str = "SECRET_KEY";
pub const ALGORITHM: &str = "ALGORITHM";
pub const ACCESS_TOKEN_EXPIRE_MINUTES: &str = "ACCESS_TOKEN_EXPIRE_MINUTES";
pub const REFRESH_TOKEN_EXPIRE_DAYS: &str = "REFRESH_TOKEN_EXPIRE_DAYS";

const DEFAULT_ACCESS_MINUTES: i64 = 30;
const DEFAULT_REFRESH_DAYS: i64 = 7;

/// Upper bounds on token lifetimes: one year for ACCESS, ten for REFRESH.
const MAX_ACCESS_MINUTES: i64 = 60 * 24 * 365;
const MAX_REFRESH_DAYS: i64 = 365 * 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{SECRET_KEY} must be set to a non-empty value")]
    MissingSecret,

    #[error("{key} must be an integer (got '{value}')")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{0} must be positive")]
    NonPositive(&'static str),

    #[error("{0} is out of range")]
    OutOfRange(&'static str),

    #[error("unsupported signing algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),
}

/// HMAC signing secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self(secret))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    secret: SigningSecret,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenConfig {
    pub fn new(
        secret: SigningSecret,
        algorithm: Algorithm,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, ConfigError> {
        if !is_hmac(algorithm) {
            return Err(ConfigError::UnsupportedAlgorithm(format!("{algorithm:?}")));
        }
        if access_ttl <= Duration::zero() {
            return Err(ConfigError::NonPositive(ACCESS_TOKEN_EXPIRE_MINUTES));
        }
        if refresh_ttl <= Duration::zero() {
            return Err(ConfigError::NonPositive(REFRESH_TOKEN_EXPIRE_DAYS));
        }
        if access_ttl > Duration::minutes(MAX_ACCESS_MINUTES) {
            return Err(ConfigError::OutOfRange(ACCESS_TOKEN_EXPIRE_MINUTES));
        }
        if refresh_ttl > Duration::days(MAX_REFRESH_DAYS) {
            return Err(ConfigError::OutOfRange(REFRESH_TOKEN_EXPIRE_DAYS));
        }
        Ok(Self {
            secret,
            algorithm,
            access_ttl,
            refresh_ttl,
        })
    }

    /// HS256 with the default 30 minute / 7 day lifetimes.
    pub fn with_secret(secret: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(
            SigningSecret::new(secret)?,
            Algorithm::HS256,
            Duration::minutes(DEFAULT_ACCESS_MINUTES),
            Duration::days(DEFAULT_REFRESH_DAYS),
        )
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(SECRET_KEY).ok_or(ConfigError::MissingSecret)?;
        let secret = SigningSecret::new(secret)?;

        let algorithm = match lookup(ALGORITHM) {
            Some(name) => parse_algorithm(&name)?,
            None => Algorithm::HS256,
        };

        let access_minutes = read_i64(&lookup, ACCESS_TOKEN_EXPIRE_MINUTES, DEFAULT_ACCESS_MINUTES)?;
        let refresh_days = read_i64(&lookup, REFRESH_TOKEN_EXPIRE_DAYS, DEFAULT_REFRESH_DAYS)?;

        if access_minutes <= 0 {
            return Err(ConfigError::NonPositive(ACCESS_TOKEN_EXPIRE_MINUTES));
        }
        if refresh_days <= 0 {
            return Err(ConfigError::NonPositive(REFRESH_TOKEN_EXPIRE_DAYS));
        }
        if access_minutes > MAX_ACCESS_MINUTES {
            return Err(ConfigError::OutOfRange(ACCESS_TOKEN_EXPIRE_MINUTES));
        }
        if refresh_days > MAX_REFRESH_DAYS {
            return Err(ConfigError::OutOfRange(REFRESH_TOKEN_EXPIRE_DAYS));
        }

        let access_ttl = Duration::try_minutes(access_minutes)
            .ok_or(ConfigError::OutOfRange(ACCESS_TOKEN_EXPIRE_MINUTES))?;
        let refresh_ttl = Duration::try_days(refresh_days)
            .ok_or(ConfigError::OutOfRange(REFRESH_TOKEN_EXPIRE_DAYS))?;

        Self::new(secret, algorithm, access_ttl, refresh_ttl)
    }

    pub fn secret(&self) -> &SigningSecret {
        &self.secret
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::UnsupportedAlgorithm(name.to_string())),
    }
}

fn read_i64<F>(lookup: &F, key: &'static str, default: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| ConfigError::InvalidNumber {
            key,
            value: raw,
        }),
    }
}
