//! In-memory store adapters for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use altrium_auth::{Identity, IdentityLookup, User, UserDirectory};
use altrium_auth::user::normalize_email;
use altrium_core::{CredentialId, Entity, StoreError, UserId};
use altrium_credentials::{Credential, CredentialStore};

/// Entity-keyed map behind a lock.
#[derive(Debug)]
pub struct InMemoryEntityStore<E: Entity> {
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> InMemoryEntityStore<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Entity> Default for InMemoryEntityStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::unavailable("in-memory store lock poisoned")
}

impl<E> InMemoryEntityStore<E>
where
    E: Entity + Clone,
{
    pub fn get(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(id).cloned())
    }

    /// Insert unless `conflicts` matches an existing record (or the id is taken).
    pub fn insert_unique<F>(&self, entity: E, conflicts: F) -> Result<E, StoreError>
    where
        F: Fn(&E, &E) -> bool,
    {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(entity.id()) || map.values().any(|existing| conflicts(existing, &entity)) {
            return Err(StoreError::duplicate(format!("{:?}", entity.id())));
        }
        map.insert(*entity.id(), entity.clone());
        Ok(entity)
    }

    /// Replace an existing record; `None` if there is nothing to replace.
    pub fn replace(&self, entity: E) -> Result<Option<E>, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(entity.id()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    pub fn remove(&self, id: &E::Id) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(id).is_some())
    }

    pub fn filter<F>(&self, pred: F) -> Result<Vec<E>, StoreError>
    where
        F: Fn(&E) -> bool,
    {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().filter(|e| pred(e)).cloned().collect())
    }

    pub fn find<F>(&self, pred: F) -> Result<Option<E>, StoreError>
    where
        F: Fn(&E) -> bool,
    {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|e| pred(e)).cloned())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: InMemoryEntityStore<User>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a stored user (role changes, suspension). `false` if absent.
    pub fn replace_user(&self, user: User) -> Result<bool, StoreError> {
        Ok(self.users.replace(user)?.is_some())
    }
}

#[async_trait]
impl IdentityLookup for InMemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
        Ok(self.users.get(&id)?.map(|u| u.identity()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.get_user_by_email(email).await?.map(|u| u.identity()))
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.users.get(&id)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = normalize_email(email);
        self.users.find(|u| u.email == email)
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        self.users.insert_unique(user, |existing, new| existing.email == new.email)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users = self.users.filter(|_| true)?;
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Credentials
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: InMemoryEntityStore<Credential>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_creation(mut credentials: Vec<Credential>) -> Vec<Credential> {
    credentials.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    credentials
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert(&self, credential: Credential) -> Result<Credential, StoreError> {
        self.credentials.insert_unique(credential, |_, _| false)
    }

    async fn find_by_id(&self, id: CredentialId) -> Result<Option<Credential>, StoreError> {
        self.credentials.get(&id)
    }

    async fn find_all(&self) -> Result<Vec<Credential>, StoreError> {
        Ok(by_creation(self.credentials.filter(|_| true)?))
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Credential>, StoreError> {
        Ok(by_creation(self.credentials.filter(|c| c.issued_to == owner)?))
    }

    async fn update(&self, credential: Credential) -> Result<Option<Credential>, StoreError> {
        self.credentials.replace(credential)
    }

    async fn delete(&self, id: CredentialId) -> Result<bool, StoreError> {
        self.credentials.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use altrium_auth::{Role, UserStatus};

    use super::*;

    fn user(email: &str, role: Role) -> User {
        User::new(email, None, "$argon2id$stub".into(), role, Utc::now())
    }

    #[tokio::test]
    async fn directory_enforces_unique_email() {
        let dir = InMemoryUserDirectory::new();
        dir.insert_user(user("a@uni.edu", Role::Student)).await.unwrap();

        let err = dir.insert_user(user("A@uni.edu", Role::Admin)).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(dir.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lookup_by_email_is_case_insensitive() {
        let dir = InMemoryUserDirectory::new();
        let stored = dir.insert_user(user("kim@uni.edu", Role::Employer)).await.unwrap();

        let identity = dir.find_by_email(" KIM@uni.edu").await.unwrap().unwrap();
        assert_eq!(identity.id, stored.id);
        assert_eq!(identity.role, Role::Employer);
    }

    #[tokio::test]
    async fn replaced_user_changes_identity() {
        let dir = InMemoryUserDirectory::new();
        let mut stored = dir.insert_user(user("lee@uni.edu", Role::Student)).await.unwrap();

        stored.status = UserStatus::Suspended;
        assert!(dir.replace_user(stored.clone()).unwrap());
        assert!(!dir.find_by_id(stored.id).await.unwrap().unwrap().active);

        assert!(!dir.replace_user(user("ghost@uni.edu", Role::Student)).unwrap());
    }

    #[tokio::test]
    async fn update_of_missing_record_is_none() {
        let store = InMemoryCredentialStore::new();
        let now = Utc::now();
        let orphan: Credential = serde_json::from_value(serde_json::json!({
            "id": CredentialId::new(),
            "title": "Orphan",
            "description": null,
            "issued_to": UserId::new(),
            "issued_by": UserId::new(),
            "status": "PENDING",
            "metadata": null,
            "created_at": now,
            "updated_at": now,
        }))
        .unwrap();

        assert_eq!(store.update(orphan.clone()).await.unwrap(), None);
        assert!(!store.delete(orphan.id).await.unwrap());

        store.insert(orphan.clone()).await.unwrap();
        assert!(matches!(store.insert(orphan.clone()).await, Err(StoreError::Duplicate(_))));
        assert_eq!(store.find_by_owner(orphan.issued_to).await.unwrap(), vec![orphan]);
    }
}
