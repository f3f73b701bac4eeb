use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use altrium_core::StoreError;

use crate::claims::TokenKind;
use crate::identity::{Identity, IdentityLookup};
use crate::token::TokenService;
use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// Bad, expired or wrong-kind token, unknown subject, or inactive user.
    /// Deliberately a single outcome.
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden: requires one of [{0}]")]
    Forbidden(String),

    /// The identity lookup failed; no decision was made.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Role requirement contract for operations behind the gate.
///
/// An empty slice means "any authenticated, active identity".
pub trait RoleRequirement {
    fn required_roles(&self) -> &[Role];
}

/// Pure role check.
///
/// - No IO
/// - No panics
pub fn check_role(identity: &Identity, required: &[Role]) -> Result<(), AuthzError> {
    if required.is_empty() || required.contains(&identity.role) {
        return Ok(());
    }

    let names: Vec<&str> = required.iter().map(Role::as_str).collect();
    Err(AuthzError::Forbidden(names.join(", ")))
}

/// Mediates every protected operation: token → identity → role.
#[derive(Debug)]
pub struct AuthorizationGate<L> {
    tokens: Arc<TokenService>,
    identities: L,
}

impl<L> AuthorizationGate<L>
where
    L: IdentityLookup,
{
    pub fn new(tokens: Arc<TokenService>, identities: L) -> Self {
        Self { tokens, identities }
    }

    pub async fn authorize(&self, token: &str, required: &[Role]) -> Result<Identity, AuthzError> {
        self.authorize_at(token, required, Utc::now()).await
    }

    pub async fn authorize_for<R>(&self, token: &str, requirement: &R) -> Result<Identity, AuthzError>
    where
        R: RoleRequirement + ?Sized,
    {
        self.authorize(token, requirement.required_roles()).await
    }

    /// Authentication failures are always checked (and reported) before the
    /// role requirement.
    pub async fn authorize_at(
        &self,
        token: &str,
        required: &[Role],
        now: DateTime<Utc>,
    ) -> Result<Identity, AuthzError> {
        let verified = self
            .tokens
            .verify_at(token, now)
            .map_err(|_| AuthzError::Unauthenticated)?;

        if verified.kind != TokenKind::Access {
            tracing::debug!(subject = %verified.subject, kind = %verified.kind, "non-access token presented to gate");
            return Err(AuthzError::Unauthenticated);
        }

        let Some(identity) = self.identities.find_by_id(verified.subject).await? else {
            tracing::debug!(subject = %verified.subject, "token subject not found");
            return Err(AuthzError::Unauthenticated);
        };

        if !identity.active {
            tracing::warn!(subject = %identity.id, "inactive user presented a valid token");
            return Err(AuthzError::Unauthenticated);
        }

        check_role(&identity, required).inspect_err(|_| {
            tracing::debug!(subject = %identity.id, role = %identity.role, "role not permitted");
        })?;

        Ok(identity)
    }
}
