//! Derived credential status
//!
//! The lifecycle status is never stored. It is computed from the record's
//! flags and timestamps on every read, so revocation and expiry take
//! effect immediately without a write-back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Credential;

/// Derived lifecycle status of a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    /// Usable for authentication
    Active,
    /// Past its expiration timestamp
    Expired,
    /// Administratively deactivated
    Revoked,
    /// Soft-deleted
    Deleted,
}

impl CredentialStatus {
    /// Whether a credential in this status may authenticate a request
    pub fn may_authenticate(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Expired => write!(f, "expired"),
            Self::Revoked => write!(f, "revoked"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// Resolve the authoritative status of a record at the given instant.
///
/// Precedence, highest first: soft deletion, then revocation, then
/// expiry. Deletion and revocation always outrank expiry in reporting.
pub fn resolve_status(credential: &Credential, now: DateTime<Utc>) -> CredentialStatus {
    if credential.deleted_at().is_some() {
        return CredentialStatus::Deleted;
    }

    if !credential.is_active() {
        return CredentialStatus::Revoked;
    }

    if let Some(expires_at) = credential.expires_at() {
        if expires_at <= now {
            return CredentialStatus::Expired;
        }
    }

    CredentialStatus::Active
}
