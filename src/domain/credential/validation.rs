//! Credential input validation utilities

use thiserror::Error;

/// Errors that can occur while validating credential inputs
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CredentialValidationError {
    #[error("owner id cannot be empty")]
    EmptyOwnerId,

    #[error("owner id exceeds maximum length of {0} characters")]
    OwnerIdTooLong(usize),

    #[error("owner id contains invalid character: '{0}'")]
    InvalidOwnerIdCharacter(char),

    #[error("key name cannot be empty")]
    EmptyName,

    #[error("key name exceeds maximum length of {0} characters")]
    NameTooLong(usize),
}

const MAX_OWNER_ID_LENGTH: usize = 100;
const MAX_NAME_LENGTH: usize = 200;

/// Validate a service account identifier
///
/// Rules:
/// - Cannot be empty (or whitespace only)
/// - Maximum 100 characters
/// - Printable ASCII, no whitespace
pub fn validate_owner_id(owner_id: &str) -> Result<(), CredentialValidationError> {
    if owner_id.trim().is_empty() {
        return Err(CredentialValidationError::EmptyOwnerId);
    }

    if owner_id.chars().count() > MAX_OWNER_ID_LENGTH {
        return Err(CredentialValidationError::OwnerIdTooLong(
            MAX_OWNER_ID_LENGTH,
        ));
    }

    for c in owner_id.chars() {
        if !c.is_ascii_graphic() {
            return Err(CredentialValidationError::InvalidOwnerIdCharacter(c));
        }
    }

    Ok(())
}

/// Validate a key display name
///
/// Rules:
/// - Cannot be empty (or whitespace only)
/// - Maximum 200 characters
pub fn validate_key_name(name: &str) -> Result<(), CredentialValidationError> {
    if name.trim().is_empty() {
        return Err(CredentialValidationError::EmptyName);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CredentialValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_owner_ids() {
        assert!(validate_owner_id("acct-1").is_ok());
        assert!(validate_owner_id("service.account@internal").is_ok());
        assert!(validate_owner_id("a").is_ok());
        assert!(validate_owner_id("UPPER-lower_123").is_ok());
    }

    #[test]
    fn test_empty_owner_id() {
        assert_eq!(
            validate_owner_id(""),
            Err(CredentialValidationError::EmptyOwnerId)
        );
        assert_eq!(
            validate_owner_id("   "),
            Err(CredentialValidationError::EmptyOwnerId)
        );
    }

    #[test]
    fn test_too_long_owner_id() {
        let long_id = "a".repeat(101);
        assert_eq!(
            validate_owner_id(&long_id),
            Err(CredentialValidationError::OwnerIdTooLong(100))
        );
    }

    #[test]
    fn test_owner_id_length_counts_chars_not_bytes() {
        // 60 chars but 120 bytes; must hit the character rule, not the
        // length cap
        let multibyte = "é".repeat(60);
        assert_eq!(
            validate_owner_id(&multibyte),
            Err(CredentialValidationError::InvalidOwnerIdCharacter('é'))
        );

        let too_many = "é".repeat(101);
        assert_eq!(
            validate_owner_id(&too_many),
            Err(CredentialValidationError::OwnerIdTooLong(100))
        );
    }

    #[test]
    fn test_owner_id_with_whitespace() {
        assert_eq!(
            validate_owner_id("acct 1"),
            Err(CredentialValidationError::InvalidOwnerIdCharacter(' '))
        );
        assert_eq!(
            validate_owner_id("acct\t1"),
            Err(CredentialValidationError::InvalidOwnerIdCharacter('\t'))
        );
    }

    #[test]
    fn test_valid_key_names() {
        assert!(validate_key_name("Billing service key").is_ok());
        assert!(validate_key_name("k").is_ok());
    }

    #[test]
    fn test_empty_key_name() {
        assert_eq!(
            validate_key_name(""),
            Err(CredentialValidationError::EmptyName)
        );
        assert_eq!(
            validate_key_name(" \t "),
            Err(CredentialValidationError::EmptyName)
        );
    }

    #[test]
    fn test_too_long_key_name() {
        let long_name = "n".repeat(201);
        assert_eq!(
            validate_key_name(&long_name),
            Err(CredentialValidationError::NameTooLong(200))
        );
    }

    #[test]
    fn test_max_length_inputs() {
        assert!(validate_owner_id(&"a".repeat(100)).is_ok());
        assert!(validate_key_name(&"n".repeat(200)).is_ok());
    }
}
