//! Key validation pipeline
//!
//! Authenticates a presented raw key through format, lookup, status and
//! expiry stages. Expected failures are values with a reason code, never
//! errors; infrastructure failures fail closed with a generic message
//! and keep the detail in the operational log.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error};

use crate::config::KeyManagerConfig;
use crate::domain::audit::{record_best_effort, AuditAction, AuditEvent, AuditOutcome};
use crate::domain::{
    resolve_status, AuditSink, Credential, CredentialId, CredentialStatus, CredentialStore,
    OwnerId, RequestContext,
};

use super::bounded;
use super::codec::{mask_key, KeyCodec};

/// Reason a validation attempt did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationReason {
    /// Empty or whitespace-only input
    InvalidFormat,
    /// No record matches the presented key
    KeyNotFound,
    /// Record is revoked or soft-deleted (reported identically)
    KeyInactive,
    /// Record is past its expiration timestamp
    KeyExpired,
    /// Infrastructure failure; validation fails closed
    ValidationError,
}

impl ValidationReason {
    /// Machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::KeyNotFound => "KEY_NOT_FOUND",
            Self::KeyInactive => "KEY_INACTIVE",
            Self::KeyExpired => "KEY_EXPIRED",
            Self::ValidationError => "VALIDATION_ERROR",
        }
    }

    /// HTTP status code equivalent for transport layers
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidFormat => 400,
            Self::KeyNotFound => 404,
            Self::KeyInactive => 403,
            Self::KeyExpired => 401,
            Self::ValidationError => 500,
        }
    }
}

impl std::fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Public fields of the validated credential
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedKeyInfo {
    pub id: CredentialId,
    pub owner_id: OwnerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub status: CredentialStatus,
}

/// Outcome of a validation attempt, fully populated for every path
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ValidationReason>,
    pub message: String,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_info: Option<ValidatedKeyInfo>,
}

impl ValidationResult {
    fn success(key_info: ValidatedKeyInfo) -> Self {
        Self {
            is_valid: true,
            reason: None,
            message: "API key validation successful".to_string(),
            status_code: 200,
            timestamp: Utc::now(),
            key_info: Some(key_info),
        }
    }

    fn failure(reason: ValidationReason, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason),
            message: message.into(),
            status_code: reason.status_code(),
            timestamp: Utc::now(),
            key_info: None,
        }
    }
}

/// Validator for presented raw keys
#[derive(Debug)]
pub struct KeyValidator<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    codec: KeyCodec,
    audit: Arc<dyn AuditSink>,
    store_timeout: Duration,
}

impl<S: CredentialStore> KeyValidator<S> {
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
            store_timeout: config.store_timeout(),
        }
    }

    /// Validate a presented key.
    ///
    /// `owner_hint` is audit context only. The lookup is by the key's
    /// comparable form alone; the hint never widens or narrows the match.
    pub async fn validate(
        &self,
        presented: &str,
        owner_hint: Option<&str>,
        ctx: &RequestContext,
    ) -> ValidationResult {
        let trimmed = presented.trim();

        if trimmed.is_empty() {
            self.audit_outcome(
                "unknown",
                AuditOutcome::Failure,
                Some(ValidationReason::InvalidFormat),
                presented,
                owner_hint,
                None,
                ctx,
            )
            .await;
            return ValidationResult::failure(
                ValidationReason::InvalidFormat,
                "API key cannot be empty",
            );
        }

        // Structurally malformed keys cannot exist; skip the store call.
        // Reported as not-found so the response does not reveal which
        // screen rejected the key.
        if !self.codec.looks_well_formed(trimmed) {
            debug!("presented key failed structural screen");
            self.audit_outcome(
                "unknown",
                AuditOutcome::Failure,
                Some(ValidationReason::KeyNotFound),
                trimmed,
                owner_hint,
                None,
                ctx,
            )
            .await;
            return ValidationResult::failure(ValidationReason::KeyNotFound, "API key not found");
        }

        let comparable = self.codec.comparable_form(trimmed);
        let record = match bounded(
            self.store_timeout,
            self.store.find_by_comparable(&comparable, ctx),
        )
        .await
        {
            Ok(record) => record,
            Err(e) => {
                // Fail closed; the caller only sees a generic message
                error!(
                    error = %e,
                    correlation_id = %ctx.correlation_id(),
                    "credential store failure during key validation"
                );
                self.audit_outcome(
                    "unknown",
                    AuditOutcome::Failure,
                    Some(ValidationReason::ValidationError),
                    trimmed,
                    owner_hint,
                    None,
                    ctx,
                )
                .await;
                return ValidationResult::failure(
                    ValidationReason::ValidationError,
                    "Internal validation error",
                );
            }
        };

        let Some(record) = record else {
            self.audit_outcome(
                "unknown",
                AuditOutcome::Failure,
                Some(ValidationReason::KeyNotFound),
                trimmed,
                owner_hint,
                None,
                ctx,
            )
            .await;
            return ValidationResult::failure(ValidationReason::KeyNotFound, "API key not found");
        };

        let now = Utc::now();

        // Revocation and deletion are reported identically so callers
        // cannot distinguish them; the audit trail keeps the difference.
        if record.is_deleted() || !record.is_active() {
            self.audit_outcome(
                &record.id().to_string(),
                AuditOutcome::Failure,
                Some(ValidationReason::KeyInactive),
                trimmed,
                owner_hint,
                Some(&record),
                ctx,
            )
            .await;
            return ValidationResult::failure(
                ValidationReason::KeyInactive,
                "API key is not active",
            );
        }

        if let Some(expires_at) = record.expires_at() {
            if expires_at <= now {
                self.audit_outcome(
                    &record.id().to_string(),
                    AuditOutcome::Failure,
                    Some(ValidationReason::KeyExpired),
                    trimmed,
                    owner_hint,
                    Some(&record),
                    ctx,
                )
                .await;
                return ValidationResult::failure(
                    ValidationReason::KeyExpired,
                    format!("API key expired on {}", expires_at.to_rfc3339()),
                );
            }
        }

        self.audit_outcome(
            &record.id().to_string(),
            AuditOutcome::Success,
            None,
            trimmed,
            owner_hint,
            Some(&record),
            ctx,
        )
        .await;

        ValidationResult::success(ValidatedKeyInfo {
            id: *record.id(),
            owner_id: record.owner_id().clone(),
            expires_at: record.expires_at(),
            status: resolve_status(&record, now),
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn audit_outcome(
        &self,
        subject_id: &str,
        outcome: AuditOutcome,
        reason: Option<ValidationReason>,
        presented: &str,
        owner_hint: Option<&str>,
        record: Option<&Credential>,
        ctx: &RequestContext,
    ) {
        let mut event =
            AuditEvent::new(AuditAction::Validate, outcome, subject_id, ctx).with_metadata(json!({
                "key": mask_key(presented),
                "owner_hint": owner_hint,
                "internal_status": record.map(|r| resolve_status(r, Utc::now()).to_string()),
            }));

        if let Some(reason) = reason {
            event = event.with_reason(reason.code());
        }

        record_best_effort(self.audit.as_ref(), event).await;
    }
}
