//! Credential store contract
//!
//! Persistence is externally owned. The engine only depends on this
//! trait; uniqueness of the comparable form is enforced by the store's
//! own constraint, never by in-process locking, so multiple engine
//! instances can run against the same store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::entity::{Credential, CredentialId, OwnerId};
use super::status::CredentialStatus;
use crate::domain::context::RequestContext;
use crate::domain::DomainError;

/// Filter for credential listings
///
/// Soft-deleted records are excluded unless explicitly requested (or the
/// status filter itself asks for deleted records).
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub owner_id: Option<OwnerId>,
    pub status: Option<CredentialStatus>,
    pub include_deleted: bool,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a single owner
    pub fn for_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Restrict to a derived status
    pub fn with_status(mut self, status: CredentialStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Include soft-deleted records
    pub fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }
}

/// Sort order for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
}

/// Pagination request, 1-based page numbering
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub sort: SortOrder,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            sort: SortOrder::default(),
        }
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

/// One page of credentials plus the total match count
#[derive(Debug, Clone)]
pub struct CredentialPage {
    pub records: Vec<Credential>,
    pub total: u64,
}

/// Store contract consumed by the engine
///
/// Implementations must filter by derived status using the same
/// resolution rule as [`super::status::resolve_status`], so listing and
/// validation never disagree about which records are active.
#[async_trait]
pub trait CredentialStore: Send + Sync + Debug {
    /// Insert a credential, enforcing uniqueness of the comparable form.
    ///
    /// A collision returns [`DomainError::Conflict`]; the generator
    /// treats that as an ordinary retry trigger.
    async fn insert_unique(
        &self,
        credential: Credential,
        ctx: &RequestContext,
    ) -> Result<Credential, DomainError>;

    /// Look up a credential by its comparable form
    async fn find_by_comparable(
        &self,
        comparable: &str,
        ctx: &RequestContext,
    ) -> Result<Option<Credential>, DomainError>;

    /// Get a credential by id
    async fn get(
        &self,
        id: &CredentialId,
        ctx: &RequestContext,
    ) -> Result<Option<Credential>, DomainError>;

    /// Update the administrative active flag
    async fn update_active_flag(
        &self,
        id: &CredentialId,
        is_active: bool,
        actor: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<Credential, DomainError>;

    /// Soft-delete a credential. Idempotent on already-deleted records.
    async fn soft_delete(
        &self,
        id: &CredentialId,
        actor: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<Credential, DomainError>;

    /// List credentials matching the filter, paginated
    async fn list(
        &self,
        filter: &ListFilter,
        page: &PageRequest,
        ctx: &RequestContext,
    ) -> Result<CredentialPage, DomainError>;
}


#[cfg(test)]
mod tests {
    use super::mock::MockCredentialStore;
    use super::*;

    fn test_credential(owner: &str, hash: &str) -> Credential {
        let owner_id = OwnerId::new(owner).unwrap();
        Credential::new(CredentialId::new(), owner_id, hash, "Test Key")
    }

    #[tokio::test]
    async fn test_mock_insert_and_find() {
        let store = MockCredentialStore::new();
        let ctx = RequestContext::new();
        let credential = test_credential("acct-1", "sha256$abc");

        store.insert_unique(credential, &ctx).await.unwrap();

        let found = store.find_by_comparable("sha256$abc", &ctx).await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().owner_id().as_str(), "acct-1");
    }

    #[tokio::test]
    async fn test_mock_rejects_duplicate_comparable() {
        let store = MockCredentialStore::new();
        let ctx = RequestContext::new();

        store
            .insert_unique(test_credential("acct-1", "sha256$same"), &ctx)
            .await
            .unwrap();

        let err = store
            .insert_unique(test_credential("acct-2", "sha256$same"), &ctx)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_mock_induced_collisions() {
        let store = MockCredentialStore::new();
        let ctx = RequestContext::new();
        store.reject_next_inserts(2);

        let err = store
            .insert_unique(test_credential("acct-1", "sha256$a"), &ctx)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let err = store
            .insert_unique(test_credential("acct-1", "sha256$b"), &ctx)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // Third attempt goes through
        store
            .insert_unique(test_credential("acct-1", "sha256$c"), &ctx)
            .await
            .unwrap();
        assert_eq!(store.insert_attempts(), 3);
    }
}
