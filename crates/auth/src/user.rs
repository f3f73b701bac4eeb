//! User directory records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use altrium_core::{Entity, UserId};

use crate::identity::Identity;
use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// User Status
// ─────────────────────────────────────────────────────────────────────────────

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserStatus {
    /// User is active and can authenticate.
    #[default]
    Active,
    /// User is suspended; valid tokens no longer admit them.
    Suspended,
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "Active"),
            UserStatus::Suspended => write!(f, "Suspended"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A stored account.
///
/// # Invariants
/// - `email` is trimmed and lower-cased, and unique within a directory.
/// - `password_hash` is an Argon2 PHC string, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: &str,
        full_name: Option<String>,
        password_hash: String,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email: normalize_email(email),
            full_name,
            password_hash,
            role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// The slice of this record the authorization gate decides on.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            role: self.role,
            active: self.is_active(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
            active: self.is_active(),
            created_at: self.created_at,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Outward view of a user; carries no password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_is_active_with_normalized_email() {
        let user = User::new("  Alice@Example.COM ", None, "$argon2id$x".into(), Role::Student, Utc::now());
        assert_eq!(user.email, "alice@example.com");
        assert!(user.is_active());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn identity_tracks_status() {
        let mut user = User::new("bob@example.com", None, String::new(), Role::Employer, Utc::now());
        assert_eq!(
            user.identity(),
            Identity {
                id: user.id,
                role: Role::Employer,
                active: true
            }
        );

        user.status = UserStatus::Suspended;
        assert!(!user.identity().active);
    }

    #[test]
    fn profile_omits_password_hash() {
        let user = User::new("carol@example.com", Some("Carol".into()), "$argon2id$secret".into(), Role::Admin, Utc::now());
        let json = serde_json::to_string(&user.profile()).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"ADMIN\""));
    }
}
