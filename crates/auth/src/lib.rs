//! `altrium-auth`: token, password and role-authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: users and
//! identities are reached only through the [`IdentityLookup`] and
//! [`UserDirectory`] traits.

pub mod accounts;
pub mod authorize;
pub mod claims;
pub mod config;
pub mod identity;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use accounts::{AccountError, AccountService, NewAccount};
pub use authorize::{AuthorizationGate, AuthzError, RoleRequirement, check_role};
pub use claims::{TokenClaims, TokenKind, TokenValidationError, validate_claims};
pub use config::{ConfigError, SigningSecret, TokenConfig};
pub use identity::{Identity, IdentityLookup, UserDirectory};
pub use password::{PasswordError, PasswordHasher};
pub use roles::{Role, UnknownRole};
pub use token::{TokenError, TokenPair, TokenService, VerifiedToken};
pub use user::{User, UserProfile, UserStatus};
