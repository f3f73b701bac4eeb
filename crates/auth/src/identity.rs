use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use altrium_core::{StoreError, UserId};

use crate::user::User;
use crate::Role;

/// A resolved identity for authorization decisions.
///
/// Always re-read from the lookup per request; never cached across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub role: Role,
    pub active: bool,
}

/// Resolves token subjects to identities.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;
}

/// Full user records, for registration, login and profile reads.
#[async_trait]
pub trait UserDirectory: IdentityLookup {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Fails with [`StoreError::Duplicate`] if the email is already taken.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
impl<T> IdentityLookup for Arc<T>
where
    T: IdentityLookup + ?Sized,
{
    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        (**self).find_by_email(email).await
    }
}

#[async_trait]
impl<T> UserDirectory for Arc<T>
where
    T: UserDirectory + ?Sized,
{
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).get_user(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        (**self).get_user_by_email(email).await
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        (**self).insert_user(user).await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        (**self).list_users().await
    }
}
