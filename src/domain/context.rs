//! Request context passed through store and audit calls

use uuid::Uuid;

/// Opaque per-operation context.
///
/// Carries the correlation id that ties store calls, audit events and
/// operational log lines for one engine operation together. Callers that
/// already have a request id should construct the context from it;
/// otherwise a fresh id is drawn.
#[derive(Debug, Clone)]
pub struct RequestContext {
    correlation_id: Uuid,
}

impl RequestContext {
    /// Create a context with a fresh correlation id
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
        }
    }

    /// Create a context from an existing correlation id
    pub fn with_correlation_id(correlation_id: Uuid) -> Self {
        Self { correlation_id }
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_contexts_get_distinct_ids() {
        let a = RequestContext::new();
        let b = RequestContext::new();
        assert_ne!(a.correlation_id(), b.correlation_id());
    }

    #[test]
    fn test_context_keeps_supplied_id() {
        let id = Uuid::new_v4();
        let ctx = RequestContext::with_correlation_id(id);
        assert_eq!(ctx.correlation_id(), id);
    }
}
