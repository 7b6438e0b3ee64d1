//! Domain layer - Core entities and contracts

pub mod audit;
pub mod context;
pub mod credential;
pub mod error;

pub use audit::{record_best_effort, AuditAction, AuditEvent, AuditOutcome, AuditSink};
pub use context::RequestContext;
pub use credential::{
    resolve_status, validate_key_name, validate_owner_id, Credential, CredentialId,
    CredentialPage, CredentialStatus, CredentialStore, CredentialValidationError, ListFilter,
    OwnerId, PageRequest, SortOrder,
};
pub use error::DomainError;
