//! Key manager facade
//!
//! The public operation surface of the engine: generation, validation,
//! revocation, soft deletion and listing, composed over a credential
//! store and an audit sink. The manager holds no validity caches; every
//! validation is a fresh read, so revocation and expiry take effect for
//! the very next call.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::info;

use crate::config::KeyManagerConfig;
use crate::domain::audit::{record_best_effort, AuditAction, AuditEvent, AuditOutcome};
use crate::domain::{
    AuditSink, Credential, CredentialId, CredentialPage, CredentialStore, DomainError, ListFilter,
    PageRequest, RequestContext,
};

use super::bounded;
use super::codec::KeyCodec;
use super::generator::{GenerateKeyParams, KeyGenerationResult, KeyGenerator};
use super::validator::{KeyValidator, ValidationResult};

/// Facade over the credential lifecycle operations
#[derive(Debug)]
pub struct KeyManager<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    audit: Arc<dyn AuditSink>,
    generator: KeyGenerator<S>,
    validator: KeyValidator<S>,
    default_page_size: u32,
    max_page_size: u32,
    store_timeout: Duration,
}

impl<S: CredentialStore> KeyManager<S> {
    pub fn new(store: Arc<S>, audit: Arc<dyn AuditSink>, config: KeyManagerConfig) -> Self {
        let codec = KeyCodec::new(config.key_prefix.as_str(), config.entropy_bytes);

        Self {
            generator: KeyGenerator::new(store.clone(), codec.clone(), audit.clone(), &config),
            validator: KeyValidator::new(store.clone(), codec, audit.clone(), &config),
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
            store_timeout: config.store_timeout(),
            store,
            audit,
        }
    }

    /// Mint a new key. The raw value in the result is shown exactly once.
    pub async fn generate_key(
        &self,
        params: GenerateKeyParams,
        ctx: &RequestContext,
    ) -> Result<KeyGenerationResult, DomainError> {
        self.generator.generate(params, ctx).await
    }

    /// Authenticate a presented raw key
    pub async fn validate_key(
        &self,
        presented: &str,
        owner_hint: Option<&str>,
        ctx: &RequestContext,
    ) -> ValidationResult {
        self.validator.validate(presented, owner_hint, ctx).await
    }

    /// Administratively revoke a key. Revoked keys are never reactivated
    /// by this engine.
    pub async fn revoke_key(
        &self,
        id: &CredentialId,
        actor: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<Credential, DomainError> {
        info!(key_id = %id, "revoking api key");

        let result = bounded(
            self.store_timeout,
            self.store.update_active_flag(id, false, actor, ctx),
        )
        .await;

        self.audit_admin(AuditAction::Revoke, id, actor, &result, ctx)
            .await;
        result
    }

    /// Soft-delete a key. The record is retained for audit and excluded
    /// from default listings.
    pub async fn delete_key(
        &self,
        id: &CredentialId,
        actor: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<Credential, DomainError> {
        info!(key_id = %id, "soft-deleting api key");

        let result = bounded(self.store_timeout, self.store.soft_delete(id, actor, ctx)).await;

        self.audit_admin(AuditAction::Delete, id, actor, &result, ctx)
            .await;
        result
    }

    /// Get a key by id
    pub async fn get_key(
        &self,
        id: &CredentialId,
        ctx: &RequestContext,
    ) -> Result<Option<Credential>, DomainError> {
        bounded(self.store_timeout, self.store.get(id, ctx)).await
    }

    /// List keys matching the filter.
    ///
    /// The page limit is clamped to the configured maximum and defaulted
    /// when absent; page numbering is 1-based.
    pub async fn list_keys(
        &self,
        filter: &ListFilter,
        page: Option<PageRequest>,
        ctx: &RequestContext,
    ) -> Result<CredentialPage, DomainError> {
        let mut page = page.unwrap_or_else(|| PageRequest::new(1, self.default_page_size));

        if page.page == 0 {
            page.page = 1;
        }
        if page.limit == 0 {
            page.limit = self.default_page_size;
        }
        page.limit = page.limit.min(self.max_page_size);

        bounded(self.store_timeout, self.store.list(filter, &page, ctx)).await
    }

    async fn audit_admin(
        &self,
        action: AuditAction,
        id: &CredentialId,
        actor: Option<&str>,
        result: &Result<Credential, DomainError>,
        ctx: &RequestContext,
    ) {
        let event = match result {
            Ok(_) => AuditEvent::new(action, AuditOutcome::Success, id.to_string(), ctx)
                .with_metadata(json!({ "actor": actor })),
            Err(e) => AuditEvent::new(action, AuditOutcome::Failure, id.to_string(), ctx)
                .with_reason(match e {
                    DomainError::NotFound { .. } => "NOT_FOUND",
                    _ => "STORE_ERROR",
                })
                .with_metadata(json!({ "actor": actor })),
        };

        record_best_effort(self.audit.as_ref(), event).await;
    }
}
