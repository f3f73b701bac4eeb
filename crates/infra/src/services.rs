//! Service wiring: one immutable [`TokenConfig`] in, every component out.

use std::sync::Arc;

use anyhow::Context;

use altrium_auth::{AccountService, AuthorizationGate, PasswordHasher, TokenConfig, TokenService};
use altrium_credentials::CredentialLifecycle;

use crate::memory::{InMemoryCredentialStore, InMemoryUserDirectory};

pub type InMemoryGate = AuthorizationGate<Arc<InMemoryUserDirectory>>;
pub type InMemoryLifecycle = CredentialLifecycle<Arc<InMemoryCredentialStore>, Arc<InMemoryUserDirectory>>;
pub type InMemoryAccounts = AccountService<Arc<InMemoryUserDirectory>>;

pub struct Services {
    pub tokens: Arc<TokenService>,
    pub gate: InMemoryGate,
    pub credentials: InMemoryLifecycle,
    pub accounts: InMemoryAccounts,
    pub users: Arc<InMemoryUserDirectory>,
    pub credential_store: Arc<InMemoryCredentialStore>,
}

pub fn build_in_memory_services(config: TokenConfig) -> Services {
    build_in_memory_services_with(config, PasswordHasher::new())
}

pub fn build_in_memory_services_with(config: TokenConfig, hasher: PasswordHasher) -> Services {
    let tokens = Arc::new(TokenService::new(config));
    let users = Arc::new(InMemoryUserDirectory::new());
    let credential_store = Arc::new(InMemoryCredentialStore::new());

    Services {
        gate: AuthorizationGate::new(tokens.clone(), users.clone()),
        credentials: CredentialLifecycle::new(credential_store.clone(), users.clone()),
        accounts: AccountService::new(users.clone(), hasher, tokens.clone()),
        tokens,
        users,
        credential_store,
    }
}

/// Process startup: logging, then configuration from the environment.
///
/// A missing or invalid configuration is the one fatal condition; callers
/// should abort on the returned error.
pub fn bootstrap() -> anyhow::Result<Services> {
    altrium_observability::init();

    let config = TokenConfig::from_env().context("loading token configuration")?;
    tracing::info!(
        algorithm = ?config.algorithm(),
        access_ttl_minutes = config.access_ttl().num_minutes(),
        refresh_ttl_days = config.refresh_ttl().num_days(),
        "token configuration loaded"
    );

    Ok(build_in_memory_services(config))
}
