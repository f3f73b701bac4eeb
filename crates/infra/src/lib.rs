//! Infrastructure layer: in-memory adapters and service wiring.

pub mod memory;
pub mod services;


pub use memory::{InMemoryCredentialStore, InMemoryEntityStore, InMemoryUserDirectory};
pub use services::{Services, bootstrap, build_in_memory_services, build_in_memory_services_with};
