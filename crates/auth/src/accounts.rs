//! Registration, login and user reads on top of a [`UserDirectory`].

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use altrium_core::StoreError;

use crate::authorize::check_role;
use crate::identity::{Identity, UserDirectory};
use crate::password::{PasswordError, PasswordHasher};
use crate::token::{TokenError, TokenPair, TokenService};
use crate::user::{User, UserProfile, normalize_email};
use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// Unknown email, wrong password or suspended account.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailTaken,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Duplicate(_) => AccountError::EmailTaken,
            other => AccountError::Store(other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub full_name: Option<String>,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Student
}

pub struct AccountService<D> {
    directory: D,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
}

impl<D> AccountService<D>
where
    D: UserDirectory,
{
    pub fn new(directory: D, hasher: PasswordHasher, tokens: Arc<TokenService>) -> Self {
        Self {
            directory,
            hasher,
            tokens,
        }
    }

    pub async fn register(&self, account: NewAccount) -> Result<UserProfile, AccountError> {
        let email = normalize_email(&account.email);
        if email.is_empty() || !email.contains('@') {
            return Err(AccountError::Validation("invalid email format".into()));
        }
        if account.password.is_empty() {
            return Err(AccountError::Validation("password cannot be empty".into()));
        }

        if self.directory.get_user_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = self.hasher.hash(&account.password)?;
        let full_name = account
            .full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let user = User::new(&email, full_name, password_hash, account.role, Utc::now());

        // The directory re-checks uniqueness; a concurrent winner surfaces as EmailTaken.
        let user = self.directory.insert_user(user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "account registered");
        Ok(user.profile())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AccountError> {
        let email = normalize_email(email);
        let Some(user) = self.directory.get_user_by_email(&email).await? else {
            self.hasher.verify_absent(password);
            return Err(AccountError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(AccountError::InvalidCredentials);
        }
        if !user.is_active() {
            tracing::debug!(user_id = %user.id, "login attempt on suspended account");
            return Err(AccountError::InvalidCredentials);
        }

        Ok(self.tokens.issue_pair(user.id)?)
    }

    /// The requester's own profile.
    pub async fn profile(&self, requester: &Identity) -> Result<UserProfile, AccountError> {
        self.directory
            .get_user(requester.id)
            .await?
            .map(|u| u.profile())
            .ok_or(AccountError::NotFound)
    }

    pub async fn list_users(&self, requester: &Identity) -> Result<Vec<UserProfile>, AccountError> {
        check_role(requester, &[Role::Admin]).map_err(|_| AccountError::Forbidden)?;
        let users = self.directory.list_users().await?;
        Ok(users.iter().map(User::profile).collect())
    }
}
