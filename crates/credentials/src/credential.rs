use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use altrium_core::{CredentialId, Entity, UserId};

/// Approval status of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl core::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CredentialStatus::Pending => f.write_str("PENDING"),
            CredentialStatus::Approved => f.write_str("APPROVED"),
            CredentialStatus::Rejected => f.write_str("REJECTED"),
        }
    }
}

/// Creation payload. The issuer is never taken from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCredential {
    pub title: String,
    pub description: Option<String>,
    pub issued_to: UserId,
    pub metadata: Option<serde_json::Value>,
}

/// A credential record.
///
/// # Invariants
/// - `issued_by` is the id of the ADMIN that created it.
/// - `status` starts at `Pending` and changes only through
///   [`crate::CredentialLifecycle::transition`].
/// - `updated_at` strictly increases on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: CredentialId,
    pub title: String,
    pub description: Option<String>,
    pub issued_to: UserId,
    pub issued_by: UserId,
    status: CredentialStatus,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Credential {
    pub(crate) fn issue(payload: NewCredential, issued_by: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: CredentialId::new(),
            title: payload.title.trim().to_string(),
            description: payload.description,
            issued_to: payload.issued_to,
            issued_by,
            status: CredentialStatus::Pending,
            metadata: payload.metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> CredentialStatus {
        self.status
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn set_status(&mut self, status: CredentialStatus, now: DateTime<Utc>) {
        self.status = status;
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

impl Entity for Credential {
    type Id = CredentialId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
