use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Key generation exhausted {attempts} attempts without a unique key")]
    CollisionExhausted { attempts: u32 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn collision_exhausted(attempts: u32) -> Self {
        Self::CollisionExhausted { attempts }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is a store-level uniqueness violation.
    ///
    /// The generator treats these as an expected retry trigger rather
    /// than a failure.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Credential 'test-id' not found");
        assert_eq!(
            error.to_string(),
            "Not found: Credential 'test-id' not found"
        );
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid input");
        assert_eq!(error.to_string(), "Validation error: Invalid input");
    }

    #[test]
    fn test_conflict_error() {
        let error = DomainError::conflict("Key already exists");
        assert_eq!(error.to_string(), "Conflict: Key already exists");
        assert!(error.is_conflict());
        assert!(!DomainError::storage("down").is_conflict());
    }

    #[test]
    fn test_collision_exhausted_error() {
        let error = DomainError::collision_exhausted(5);
        assert_eq!(
            error.to_string(),
            "Key generation exhausted 5 attempts without a unique key"
        );
    }
}
