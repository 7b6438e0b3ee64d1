//! Key generation
//!
//! Mints new credentials, guaranteeing global uniqueness through the
//! store's own constraint: a reported collision triggers a retry with
//! fresh entropy, up to a hard ceiling.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config::KeyManagerConfig;
use crate::domain::audit::{record_best_effort, AuditAction, AuditEvent, AuditOutcome};
use crate::domain::{
    validate_key_name, AuditSink, Credential, CredentialId, CredentialStatus, CredentialStore,
    DomainError, OwnerId, RequestContext,
};

use super::bounded;
use super::codec::KeyCodec;

/// Expiration choice for a new key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// Expire after the configured default lifetime
    #[default]
    DefaultTtl,
    /// Never expire
    Never,
    /// Expire at an explicit instant (must be in the future)
    At(DateTime<Utc>),
}

/// Parameters for minting a new key
#[derive(Debug, Clone)]
pub struct GenerateKeyParams {
    owner_id: OwnerId,
    name: String,
    description: Option<String>,
    is_active: bool,
    expiry: ExpiryPolicy,
    created_by: Option<String>,
}

impl GenerateKeyParams {
    pub fn new(owner_id: OwnerId, name: impl Into<String>) -> Self {
        Self {
            owner_id,
            name: name.into(),
            description: None,
            is_active: true,
            expiry: ExpiryPolicy::DefaultTtl,
            created_by: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expiry = ExpiryPolicy::At(at);
        self
    }

    pub fn never_expires(mut self) -> Self {
        self.expiry = ExpiryPolicy::Never;
        self
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }
}

/// Result of minting a new key.
///
/// `raw_key` is the only place the raw value ever appears; it is not
/// recoverable from the store afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct KeyGenerationResult {
    pub key_id: CredentialId,
    pub raw_key: String,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub status: CredentialStatus,
}

/// Generator for new credentials
#[derive(Debug)]
pub struct KeyGenerator<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    codec: KeyCodec,
    audit: Arc<dyn AuditSink>,
    max_retries: u32,
    default_expiry: chrono::Duration,
    store_timeout: Duration,
}

impl<S: CredentialStore> KeyGenerator<S> {
    pub fn new(
        store: Arc<S>,
        codec: KeyCodec,
        audit: Arc<dyn AuditSink>,
        config: &KeyManagerConfig,
    ) -> Self {
        Self {
            store,
            codec,
            audit,
            max_retries: config.max_generation_retries,
            default_expiry: config.default_expiry(),
            store_timeout: config.store_timeout(),
        }
    }

    /// Mint a new key for the owner in `params`.
    ///
    /// Collisions reported by the store are retried with fresh entropy up
    /// to the configured ceiling; exhaustion fails with
    /// [`DomainError::CollisionExhausted`]. Repeated collisions indicate
    /// entropy-source failure, so no fallback key is ever produced.
    pub async fn generate(
        &self,
        params: GenerateKeyParams,
        ctx: &RequestContext,
    ) -> Result<KeyGenerationResult, DomainError> {
        if let Err(e) = validate_key_name(&params.name) {
            self.audit_failure(&params, "INVALID_REQUEST", ctx).await;
            return Err(DomainError::validation(e.to_string()));
        }

        if let ExpiryPolicy::At(at) = params.expiry {
            if at <= Utc::now() {
                self.audit_failure(&params, "INVALID_REQUEST", ctx).await;
                return Err(DomainError::validation(
                    "expiration must be strictly in the future",
                ));
            }
        }

        for attempt in 1..=self.max_retries {
            let generated = self.codec.generate();

            let mut credential = Credential::new(
                CredentialId::new(),
                params.owner_id.clone(),
                generated.comparable,
                params.name.clone(),
            );

            // Default expiry anchors on the record's own creation instant
            let expires_at = match params.expiry {
                ExpiryPolicy::DefaultTtl => Some(credential.created_at() + self.default_expiry),
                ExpiryPolicy::Never => None,
                ExpiryPolicy::At(at) => Some(at),
            };

            credential = credential
                .with_expiration(expires_at)
                .with_active(params.is_active);

            if let Some(description) = &params.description {
                credential = credential.with_description(description.clone());
            }
            if let Some(created_by) = &params.created_by {
                credential = credential.with_created_by(created_by.clone());
            }

            match bounded(
                self.store_timeout,
                self.store.insert_unique(credential, ctx),
            )
            .await
            {
                Ok(stored) => {
                    info!(
                        key_id = %stored.id(),
                        owner = %stored.owner_id(),
                        attempt,
                        "api key generated"
                    );

                    let event = AuditEvent::new(
                        AuditAction::Generate,
                        AuditOutcome::Success,
                        stored.id().to_string(),
                        ctx,
                    )
                    .with_metadata(json!({
                        "owner_id": stored.owner_id().as_str(),
                        "name": stored.name(),
                        "attempts": attempt,
                    }));
                    record_best_effort(self.audit.as_ref(), event).await;

                    let status = stored.status_at(Utc::now());
                    return Ok(KeyGenerationResult {
                        key_id: *stored.id(),
                        raw_key: generated.raw,
                        owner_id: stored.owner_id().clone(),
                        created_at: stored.created_at(),
                        expires_at: stored.expires_at(),
                        status,
                    });
                }
                Err(e) if e.is_conflict() => {
                    warn!(
                        owner = %params.owner_id,
                        attempt,
                        "key collision reported by store, retrying with fresh entropy"
                    );
                    continue;
                }
                Err(e) => {
                    self.audit_failure(&params, "STORE_ERROR", ctx).await;
                    return Err(e);
                }
            }
        }

        self.audit_failure(&params, "KEY_COLLISION_EXHAUSTED", ctx)
            .await;
        Err(DomainError::collision_exhausted(self.max_retries))
    }

    async fn audit_failure(&self, params: &GenerateKeyParams, reason: &str, ctx: &RequestContext) {
        let event = AuditEvent::new(AuditAction::Generate, AuditOutcome::Failure, "unknown", ctx)
            .with_reason(reason)
            .with_metadata(json!({
                "owner_id": params.owner_id.as_str(),
                "name": params.name,
            }));
        record_best_effort(self.audit.as_ref(), event).await;
    }
}
