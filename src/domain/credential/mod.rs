//! Credential domain
//!
//! The credential record, its derived lifecycle status, input validation
//! and the store contract the engine consumes.

mod entity;
mod status;
mod store;
mod validation;

pub use entity::{Credential, CredentialId, OwnerId};
pub use status::{resolve_status, CredentialStatus};
pub use store::{CredentialPage, CredentialStore, ListFilter, PageRequest, SortOrder};
pub use validation::{validate_key_name, validate_owner_id, CredentialValidationError};

#[cfg(test)]
pub use store::mock::MockCredentialStore;
