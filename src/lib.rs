//! Keymint
//!
//! A credential lifecycle engine for opaque API keys bound to service
//! accounts:
//! - Key generation with store-enforced global uniqueness and bounded
//!   retry under collision pressure
//! - A multi-stage validation pipeline with a precise failure-reason
//!   taxonomy, failing closed on infrastructure errors
//! - Derived lifecycle status reconciling the active flag, expiry and
//!   soft deletion into one authoritative state
//! - Structured audit events for every operation outcome
//!
//! Persistence and the audit sink are external collaborators behind the
//! [`domain::CredentialStore`] and [`domain::AuditSink`] contracts; an
//! in-memory store is provided for tests and embedded setups.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use keymint::config::KeyManagerConfig;
//! use keymint::domain::{OwnerId, RequestContext};
//! use keymint::infrastructure::{
//!     GenerateKeyParams, InMemoryCredentialStore, KeyManager, TracingAuditSink,
//! };
//!
//! # async fn example() -> Result<(), keymint::domain::DomainError> {
//! let manager = KeyManager::new(
//!     Arc::new(InMemoryCredentialStore::new()),
//!     Arc::new(TracingAuditSink::new()),
//!     KeyManagerConfig::default(),
//! );
//!
//! let ctx = RequestContext::new();
//! let owner = OwnerId::new("acct-1").expect("valid owner id");
//! let generated = manager
//!     .generate_key(GenerateKeyParams::new(owner, "Billing key"), &ctx)
//!     .await?;
//!
//! // The raw key is returned exactly once
//! let result = manager.validate_key(&generated.raw_key, None, &ctx).await;
//! assert!(result.is_valid);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use self::config::{AppConfig, KeyManagerConfig};
pub use domain::{
    AuditEvent, AuditSink, Credential, CredentialId, CredentialStatus, CredentialStore,
    DomainError, ListFilter, OwnerId, PageRequest, RequestContext, SortOrder,
};
pub use infrastructure::{
    ExpiryPolicy, GenerateKeyParams, InMemoryCredentialStore, KeyCodec, KeyGenerationResult,
    KeyManager, TracingAuditSink, ValidationReason, ValidationResult,
};
