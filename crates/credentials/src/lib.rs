//! `altrium-credentials`: academic credential records and their approval
//! lifecycle.
//!
//! Storage is reached only through [`CredentialStore`]; who may read or
//! mutate a record is decided by [`policy`].

pub mod credential;
pub mod lifecycle;
pub mod policy;
pub mod store;

pub use credential::{Credential, CredentialStatus, NewCredential};
pub use lifecycle::CredentialLifecycle;
pub use policy::{CredentialAction, Visibility, visibility};
pub use store::CredentialStore;
