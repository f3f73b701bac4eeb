//! `altrium-core`: shared identifiers, entity trait and error model.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, StoreError};
pub use id::{CredentialId, UserId};
