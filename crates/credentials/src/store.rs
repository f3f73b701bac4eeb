use std::sync::Arc;

use async_trait::async_trait;

use altrium_core::{CredentialId, StoreError, UserId};

use crate::Credential;

/// Durable storage for credential records.
///
/// Only the lifecycle manager writes through this trait.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn insert(&self, credential: Credential) -> Result<Credential, StoreError>;
    async fn find_by_id(&self, id: CredentialId) -> Result<Option<Credential>, StoreError>;
    async fn find_all(&self) -> Result<Vec<Credential>, StoreError>;
    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Credential>, StoreError>;
    /// Replace an existing record; `None` if it no longer exists.
    async fn update(&self, credential: Credential) -> Result<Option<Credential>, StoreError>;
    /// Whether a record was removed.
    async fn delete(&self, id: CredentialId) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn insert(&self, credential: Credential) -> Result<Credential, StoreError> {
        (**self).insert(credential).await
    }

    async fn find_by_id(&self, id: CredentialId) -> Result<Option<Credential>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Credential>, StoreError> {
        (**self).find_all().await
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Credential>, StoreError> {
        (**self).find_by_owner(owner).await
    }

    async fn update(&self, credential: Credential) -> Result<Option<Credential>, StoreError> {
        (**self).update(credential).await
    }

    async fn delete(&self, id: CredentialId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }
}
