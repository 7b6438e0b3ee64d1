//! Audit sink contract
//!
//! Every engine operation emits exactly one structured audit event. The
//! sink is externally owned; a failing or slow sink must never turn into
//! an operation failure, so callers record best-effort and log the
//! sink error operationally.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;
use tracing::warn;
use uuid::Uuid;

use crate::domain::context::RequestContext;
use crate::domain::DomainError;

/// Action an audit event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Generate,
    Validate,
    Revoke,
    Delete,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generate => write!(f, "generate"),
            Self::Validate => write!(f, "validate"),
            Self::Revoke => write!(f, "revoke"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Outcome of the audited operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
}

impl std::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Structured audit event
///
/// `subject_id` is the resolved credential id, or `"unknown"` when the
/// operation never resolved one. Metadata must never carry a raw key
/// value, only its masked form.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub subject_id: String,
    pub action: AuditAction,
    pub outcome: AuditOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    pub metadata: Value,
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        action: AuditAction,
        outcome: AuditOutcome,
        subject_id: impl Into<String>,
        ctx: &RequestContext,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            action,
            outcome,
            reason_code: None,
            metadata: Value::Null,
            correlation_id: ctx.correlation_id(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_reason(mut self, reason_code: impl Into<String>) -> Self {
        self.reason_code = Some(reason_code.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Sink for audit events
#[async_trait]
pub trait AuditSink: Send + Sync + Debug {
    async fn record(&self, event: AuditEvent) -> Result<(), DomainError>;
}

/// Record an event, swallowing sink failures after logging them.
pub async fn record_best_effort(sink: &dyn AuditSink, event: AuditEvent) {
    let action = event.action;
    if let Err(e) = sink.record(event).await {
        warn!(error = %e, %action, "failed to record audit event");
    }
}
