//! Who may do what to a credential.

use altrium_auth::{Identity, Role, RoleRequirement, check_role};
use altrium_core::{DomainError, DomainResult};

use crate::Credential;

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ANY_ROLE: &[Role] = &[Role::Admin, Role::Student, Role::Employer];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialAction {
    Create,
    Read,
    List,
    Transition,
    Delete,
}

impl RoleRequirement for CredentialAction {
    fn required_roles(&self) -> &[Role] {
        match self {
            CredentialAction::Create | CredentialAction::Transition | CredentialAction::Delete => {
                ADMIN_ONLY
            }
            CredentialAction::Read | CredentialAction::List => ANY_ROLE,
        }
    }
}

impl CredentialAction {
    pub(crate) fn ensure(self, requester: &Identity) -> DomainResult<()> {
        check_role(requester, self.required_roles()).map_err(|_| {
            tracing::debug!(requester = %requester.id, role = %requester.role, action = ?self, "credential action denied");
            DomainError::Forbidden
        })
    }
}

/// Which credentials a role can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    All,
    /// Only credentials issued to the requester.
    Own,
}

pub fn visibility(role: Role) -> Visibility {
    match role {
        Role::Admin | Role::Employer => Visibility::All,
        Role::Student => Visibility::Own,
    }
}

pub(crate) fn can_read(requester: &Identity, credential: &Credential) -> bool {
    match visibility(requester.role) {
        Visibility::All => true,
        Visibility::Own => credential.issued_to == requester.id,
    }
}
