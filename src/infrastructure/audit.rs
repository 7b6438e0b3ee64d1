//! Tracing-backed audit sink

use async_trait::async_trait;
use tracing::info;

use crate::domain::{AuditEvent, AuditSink, DomainError};

/// Audit sink that writes structured events to the tracing pipeline.
///
/// Injected into the engine at construction; there is no process-wide
/// audit state.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), DomainError> {
        info!(
            target: "keymint::audit",
            subject_id = %event.subject_id,
            action = %event.action,
            outcome = %event.outcome,
            reason = event.reason_code.as_deref().unwrap_or("-"),
            correlation_id = %event.correlation_id,
            metadata = %event.metadata,
            timestamp = %event.timestamp.to_rfc3339(),
            "audit event"
        );
        Ok(())
    }
}
