//! The credential lifecycle manager.
//!
//! Status moves PENDING → {APPROVED, REJECTED} by ADMIN request. Transitions
//! are not restricted: any status may be set from any status, and
//! re-approving a rejected credential is allowed.

use chrono::Utc;

use altrium_auth::{Identity, IdentityLookup, Role};
use altrium_core::{CredentialId, DomainError, DomainResult};

use crate::policy::{CredentialAction, Visibility, can_read, visibility};
use crate::{Credential, CredentialStatus, CredentialStore, NewCredential};

pub struct CredentialLifecycle<S, L> {
    store: S,
    identities: L,
}

impl<S, L> CredentialLifecycle<S, L>
where
    S: CredentialStore,
    L: IdentityLookup,
{
    pub fn new(store: S, identities: L) -> Self {
        Self { store, identities }
    }

    /// Issue a new PENDING credential to a student.
    ///
    /// `issued_by` is always the creator; a payload cannot name another issuer.
    pub async fn create(&self, payload: NewCredential, creator: &Identity) -> DomainResult<Credential> {
        CredentialAction::Create.ensure(creator)?;

        if payload.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }

        let Some(recipient) = self.identities.find_by_id(payload.issued_to).await? else {
            return Err(DomainError::NotFound);
        };
        if recipient.role != Role::Student {
            return Err(DomainError::validation(format!(
                "credentials can only be issued to a STUDENT (recipient is {})",
                recipient.role
            )));
        }

        let credential = Credential::issue(payload, creator.id, Utc::now());
        let credential = self.store.insert(credential).await?;

        tracing::info!(
            credential_id = %credential.id,
            issued_to = %credential.issued_to,
            issued_by = %credential.issued_by,
            "credential created"
        );
        Ok(credential)
    }

    pub async fn get(&self, id: CredentialId, requester: &Identity) -> DomainResult<Credential> {
        CredentialAction::Read.ensure(requester)?;

        let credential = self.store.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        if !can_read(requester, &credential) {
            tracing::debug!(credential_id = %id, requester = %requester.id, "read of another student's credential");
            return Err(DomainError::Forbidden);
        }
        Ok(credential)
    }

    pub async fn list(&self, requester: &Identity) -> DomainResult<Vec<Credential>> {
        CredentialAction::List.ensure(requester)?;

        let credentials = match visibility(requester.role) {
            Visibility::All => self.store.find_all().await?,
            Visibility::Own => self.store.find_by_owner(requester.id).await?,
        };
        Ok(credentials)
    }

    /// Set a credential's status. Not atomic with respect to concurrent
    /// transitions on the same id: the last write wins.
    pub async fn transition(
        &self,
        id: CredentialId,
        status: CredentialStatus,
        requester: &Identity,
    ) -> DomainResult<Credential> {
        CredentialAction::Transition.ensure(requester)?;

        let mut credential = self.store.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let from = credential.status();
        credential.set_status(status, Utc::now());

        let credential = self.store.update(credential).await?.ok_or(DomainError::NotFound)?;
        tracing::info!(credential_id = %id, %from, to = %status, by = %requester.id, "credential status changed");
        Ok(credential)
    }

    pub async fn delete(&self, id: CredentialId, requester: &Identity) -> DomainResult<()> {
        CredentialAction::Delete.ensure(requester)?;

        if !self.store.delete(id).await? {
            return Err(DomainError::NotFound);
        }
        tracing::info!(credential_id = %id, by = %requester.id, "credential deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use altrium_core::{StoreError, UserId};

    use super::*;

    #[derive(Default)]
    struct MapStore {
        records: Mutex<HashMap<CredentialId, Credential>>,
    }

    #[async_trait]
    impl CredentialStore for MapStore {
        async fn insert(&self, credential: Credential) -> Result<Credential, StoreError> {
            self.records.lock().unwrap().insert(credential.id, credential.clone());
            Ok(credential)
        }

        async fn find_by_id(&self, id: CredentialId) -> Result<Option<Credential>, StoreError> {
            Ok(self.records.lock().unwrap().get(&id).cloned())
        }

        async fn find_all(&self) -> Result<Vec<Credential>, StoreError> {
            Ok(self.records.lock().unwrap().values().cloned().collect())
        }

        async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Credential>, StoreError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|c| c.issued_to == owner)
                .cloned()
                .collect())
        }

        async fn update(&self, credential: Credential) -> Result<Option<Credential>, StoreError> {
            let mut records = self.records.lock().unwrap();
            match records.get_mut(&credential.id) {
                Some(slot) => {
                    *slot = credential.clone();
                    Ok(Some(credential))
                }
                None => Ok(None),
            }
        }

        async fn delete(&self, id: CredentialId) -> Result<bool, StoreError> {
            Ok(self.records.lock().unwrap().remove(&id).is_some())
        }
    }

    #[derive(Default)]
    struct MapLookup {
        identities: HashMap<UserId, Identity>,
    }

    #[async_trait]
    impl IdentityLookup for MapLookup {
        async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
            Ok(self.identities.get(&id).copied())
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<Identity>, StoreError> {
            Ok(None)
        }
    }

    struct Fixture {
        lifecycle: CredentialLifecycle<MapStore, MapLookup>,
        admin: Identity,
        student: Identity,
        employer: Identity,
    }

    fn identity(role: Role) -> Identity {
        Identity {
            id: UserId::new(),
            role,
            active: true,
        }
    }

    fn fixture() -> Fixture {
        let admin = identity(Role::Admin);
        let student = identity(Role::Student);
        let employer = identity(Role::Employer);
        let lookup = MapLookup {
            identities: [admin, student, employer].into_iter().map(|i| (i.id, i)).collect(),
        };
        Fixture {
            lifecycle: CredentialLifecycle::new(MapStore::default(), lookup),
            admin,
            student,
            employer,
        }
    }

    fn payload(issued_to: UserId) -> NewCredential {
        NewCredential {
            title: "MSc Physics".into(),
            description: Some("Awarded with distinction".into()),
            issued_to,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn create_sets_issuer_and_pending_status() {
        let f = fixture();
        let c = f.lifecycle.create(payload(f.student.id), &f.admin).await.unwrap();

        assert_eq!(c.status(), CredentialStatus::Pending);
        assert_eq!(c.issued_by, f.admin.id);
        assert_eq!(c.issued_to, f.student.id);
    }

    #[tokio::test]
    async fn create_requires_admin_before_anything_else() {
        let f = fixture();
        let err = f.lifecycle.create(payload(UserId::new()), &f.employer).await.unwrap_err();
        assert_eq!(err, DomainError::Forbidden);
    }

    #[tokio::test]
    async fn create_for_unknown_recipient_is_not_found() {
        let f = fixture();
        let err = f.lifecycle.create(payload(UserId::new()), &f.admin).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[tokio::test]
    async fn create_for_non_student_persists_nothing() {
        let f = fixture();
        let err = f.lifecycle.create(payload(f.employer.id), &f.admin).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(f.lifecycle.list(&f.admin).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let f = fixture();
        let mut p = payload(f.student.id);
        p.title = "   ".into();
        assert!(matches!(f.lifecycle.create(p, &f.admin).await, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn transition_is_unrestricted_and_bumps_updated_at() {
        let f = fixture();
        let c = f.lifecycle.create(payload(f.student.id), &f.admin).await.unwrap();

        let approved = f
            .lifecycle
            .transition(c.id, CredentialStatus::Approved, &f.admin)
            .await
            .unwrap();
        assert_eq!(approved.status(), CredentialStatus::Approved);
        assert!(approved.updated_at() > c.updated_at());

        let rejected = f
            .lifecycle
            .transition(c.id, CredentialStatus::Rejected, &f.admin)
            .await
            .unwrap();
        assert_eq!(rejected.status(), CredentialStatus::Rejected);
        assert!(rejected.updated_at() > approved.updated_at());

        let back = f.lifecycle.transition(c.id, CredentialStatus::Pending, &f.admin).await.unwrap();
        assert_eq!(back.status(), CredentialStatus::Pending);
    }

    #[tokio::test]
    async fn non_admin_transition_is_forbidden_even_for_missing_ids() {
        let f = fixture();
        let err = f
            .lifecycle
            .transition(CredentialId::new(), CredentialStatus::Approved, &f.student)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Forbidden);

        let err = f
            .lifecycle
            .transition(CredentialId::new(), CredentialStatus::Approved, &f.admin)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let f = fixture();
        let c = f.lifecycle.create(payload(f.student.id), &f.admin).await.unwrap();

        assert_eq!(f.lifecycle.delete(c.id, &f.employer).await, Err(DomainError::Forbidden));
        f.lifecycle.delete(c.id, &f.admin).await.unwrap();
        assert_eq!(f.lifecycle.get(c.id, &f.admin).await, Err(DomainError::NotFound));
        assert_eq!(f.lifecycle.delete(c.id, &f.admin).await, Err(DomainError::NotFound));
    }

    #[tokio::test]
    async fn visibility_follows_role() {
        let f = fixture();
        let mine = f.lifecycle.create(payload(f.student.id), &f.admin).await.unwrap();

        assert_eq!(f.lifecycle.get(mine.id, &f.student).await.unwrap().id, mine.id);
        assert_eq!(f.lifecycle.get(mine.id, &f.employer).await.unwrap().id, mine.id);
        assert_eq!(f.lifecycle.list(&f.student).await.unwrap().len(), 1);
        assert_eq!(f.lifecycle.list(&f.employer).await.unwrap().len(), 1);
    }
}
