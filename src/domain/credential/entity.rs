//! Credential entity and identifier types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{resolve_status, CredentialStatus};
use super::validation::{validate_owner_id, CredentialValidationError};

/// Credential identifier, assigned by the engine at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(Uuid);

impl CredentialId {
    /// Draw a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CredentialId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Service account identifier a credential authenticates
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Create a new OwnerId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, CredentialValidationError> {
        let id = id.into();
        validate_owner_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OwnerId {
    type Error = CredentialValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> Self {
        id.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Credential record
///
/// The raw key value never appears here. Only the comparable form (a
/// one-way hash of the raw key) is kept, and it is excluded from
/// serialized output.
#[derive(Debug, Clone, Serialize)]
pub struct Credential {
    /// Unique identifier, immutable after creation
    id: CredentialId,
    /// Service account this credential authenticates
    owner_id: OwnerId,
    /// Comparable form of the key, matched at lookup time
    #[serde(skip_serializing)]
    secret_hash: String,
    /// Display name
    name: String,
    /// Free-text description
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Administrative active flag; false means revoked/deactivated
    is_active: bool,
    /// Expiration timestamp (None = never expires)
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
    /// Soft-delete timestamp; set once, never cleared
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted_at: Option<DateTime<Utc>>,
    /// Actor that created the credential
    #[serde(skip_serializing_if = "Option::is_none")]
    created_by: Option<String>,
    /// Actor that last updated the credential
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_by: Option<String>,
    /// Actor that soft-deleted the credential
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted_by: Option<String>,
}

impl Credential {
    /// Create a new active credential
    pub fn new(
        id: CredentialId,
        owner_id: OwnerId,
        secret_hash: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            owner_id,
            secret_hash: secret_hash.into(),
            name: name.into(),
            description: None,
            is_active: true,
            expires_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            created_by: None,
            updated_by: None,
            deleted_by: None,
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set expiration (None = never expires)
    pub fn with_expiration(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// Set the active flag at creation time
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Set creator
    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    // Getters

    pub fn id(&self) -> &CredentialId {
        &self.id
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn secret_hash(&self) -> &str {
        &self.secret_hash
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn updated_by(&self) -> Option<&str> {
        self.updated_by.as_deref()
    }

    pub fn deleted_by(&self) -> Option<&str> {
        self.deleted_by.as_deref()
    }

    // Status checks

    /// Derived lifecycle status at the given instant
    pub fn status_at(&self, now: DateTime<Utc>) -> CredentialStatus {
        resolve_status(self, now)
    }

    /// Whether the credential is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    // Mutators

    /// Update the name
    pub fn set_name(&mut self, name: impl Into<String>, actor: Option<&str>) {
        self.name = name.into();
        self.touch(actor);
    }

    /// Update the description
    pub fn set_description(&mut self, description: Option<String>, actor: Option<&str>) {
        self.description = description;
        self.touch(actor);
    }

    /// Update the administrative active flag
    pub fn set_active_flag(&mut self, is_active: bool, actor: Option<&str>) {
        self.is_active = is_active;
        self.touch(actor);
    }

    /// Administratively deactivate (revoke) the credential
    pub fn deactivate(&mut self, actor: Option<&str>) {
        self.set_active_flag(false, actor);
    }

    /// Soft-delete the credential. Idempotent; the original deletion
    /// timestamp and actor are kept on repeated calls.
    pub fn soft_delete(&mut self, actor: Option<&str>) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(Utc::now());
            self.deleted_by = actor.map(String::from);
            self.touch(actor);
        }
    }

    fn touch(&mut self, actor: Option<&str>) {
        self.updated_at = Utc::now();
        if actor.is_some() {
            self.updated_by = actor.map(String::from);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_credential(owner: &str, name: &str) -> Credential {
        let owner_id = OwnerId::new(owner).unwrap();
        Credential::new(CredentialId::new(), owner_id, "sha256$hash", name)
    }

    #[test]
    fn test_owner_id_valid() {
        let id = OwnerId::new("acct-1").unwrap();
        assert_eq!(id.as_str(), "acct-1");
    }

    #[test]
    fn test_owner_id_invalid() {
        assert!(OwnerId::new("").is_err());
        assert!(OwnerId::new("  ").is_err());
        assert!(OwnerId::new("has space").is_err());
    }

    #[test]
    fn test_credential_ids_are_unique() {
        assert_ne!(CredentialId::new(), CredentialId::new());
    }

    #[test]
    fn test_credential_creation_defaults() {
        let credential = create_test_credential("acct-1", "Test Key")
            .with_description("billing integration");

        assert_eq!(credential.owner_id().as_str(), "acct-1");
        assert_eq!(credential.name(), "Test Key");
        assert_eq!(credential.description(), Some("billing integration"));
        assert!(credential.is_active());
        assert!(credential.expires_at().is_none());
        assert!(credential.deleted_at().is_none());
        assert_eq!(credential.created_at(), credential.updated_at());
    }

    #[test]
    fn test_deactivate_refreshes_updated_at() {
        let mut credential = create_test_credential("acct-1", "Test Key");
        let created = credential.updated_at();

        credential.deactivate(Some("admin@ops"));

        assert!(!credential.is_active());
        assert!(credential.updated_at() >= created);
        assert_eq!(credential.updated_by(), Some("admin@ops"));
    }

    #[test]
    fn test_soft_delete_is_idempotent() {
        let mut credential = create_test_credential("acct-1", "Test Key");

        credential.soft_delete(Some("admin@ops"));
        let first_deleted_at = credential.deleted_at().unwrap();
        assert_eq!(credential.deleted_by(), Some("admin@ops"));

        credential.soft_delete(Some("someone-else"));
        assert_eq!(credential.deleted_at(), Some(first_deleted_at));
        assert_eq!(credential.deleted_by(), Some("admin@ops"));
    }

    #[test]
    fn test_secret_hash_never_serialized() {
        let credential = create_test_credential("acct-1", "Test Key");
        let json = serde_json::to_string(&credential).unwrap();

        assert!(!json.contains("secret_hash"));
        assert!(!json.contains("sha256$hash"));
        assert!(json.contains("acct-1"));
    }
}
