//! Stateless token issuance and verification.
//!
//! Tokens are HMAC-signed JWTs. Nothing is stored server side, so a token
//! stays valid until it expires; ACCESS lifetimes are kept short and the
//! REFRESH flow mints new ACCESS tokens.

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use altrium_core::UserId;

use crate::claims::{TokenClaims, TokenKind, validate_claims};
use crate::config::TokenConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed, forged or expired. Callers get no finer detail.
    #[error("invalid token")]
    Invalid,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// What a successfully verified token asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: UserId,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

pub struct TokenService {
    config: TokenConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let secret = config.secret().expose().as_bytes();
        let encoding = EncodingKey::from_secret(secret);
        let decoding = DecodingKey::from_secret(secret);

        // Only the configured algorithm is accepted. The time window is
        // checked by `validate_claims` against the caller's clock.
        let mut validation = Validation::new(config.algorithm());
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            config,
            encoding,
            decoding,
            validation,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn issue(&self, subject: UserId, kind: TokenKind) -> Result<String, TokenError> {
        self.issue_at(subject, kind, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: UserId,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.config.access_ttl(),
            TokenKind::Refresh => self.config.refresh_ttl(),
        };

        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Signing("token expiry is out of range".into()))?;

        let claims = TokenClaims {
            sub: subject,
            kind,
            issued_at: now,
            expires_at,
            jti: Uuid::now_v7(),
        };

        encode(&Header::new(self.config.algorithm()), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature, algorithm and time window.
    ///
    /// Every failure collapses to [`TokenError::Invalid`]; the reason is only
    /// logged.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedToken, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(reason = ?e.kind(), "token rejected");
            TokenError::Invalid
        })?;

        let claims = data.claims;
        validate_claims(&claims, now).map_err(|e| {
            tracing::debug!(reason = %e, subject = %claims.sub, "token rejected");
            TokenError::Invalid
        })?;

        Ok(VerifiedToken {
            subject: claims.sub,
            kind: claims.kind,
            expires_at: claims.expires_at,
        })
    }

    pub fn issue_pair(&self, subject: UserId) -> Result<TokenPair, TokenError> {
        self.issue_pair_at(subject, Utc::now())
    }

    pub fn issue_pair_at(&self, subject: UserId, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_at(subject, TokenKind::Access, now)?,
            refresh_token: self.issue_at(subject, TokenKind::Refresh, now)?,
            token_type: "bearer",
        })
    }

    pub fn refresh_pair(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        self.refresh_pair_at(refresh_token, Utc::now())
    }

    /// Exchange a REFRESH token for a new ACCESS token and a rotated REFRESH
    /// token. No revocation store is consulted.
    pub fn refresh_pair_at(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let verified = self.verify_at(refresh_token, now)?;
        if verified.kind != TokenKind::Refresh {
            tracing::debug!(subject = %verified.subject, kind = %verified.kind, "refresh with non-refresh token");
            return Err(TokenError::Invalid);
        }
        self.issue_pair_at(verified.subject, now)
    }
}
