//! In-memory credential store implementation
//!
//! Reference implementation of the store contract, used in tests and
//! embedded setups. The comparable-form index stands in for the unique
//! constraint a durable store would enforce.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    resolve_status, Credential, CredentialId, CredentialPage, CredentialStatus, CredentialStore,
    DomainError, ListFilter, PageRequest, RequestContext, SortOrder,
};

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<Uuid, Credential>,
    comparable_index: HashMap<String, Uuid>,
}

/// In-memory implementation of [`CredentialStore`]
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert_unique(
        &self,
        credential: Credential,
        _ctx: &RequestContext,
    ) -> Result<Credential, DomainError> {
        let mut inner = self.inner.write().await;

        if inner
            .comparable_index
            .contains_key(credential.secret_hash())
        {
            return Err(DomainError::conflict(
                "credential with the same comparable form already exists",
            ));
        }

        let id = credential.id().as_uuid();
        inner
            .comparable_index
            .insert(credential.secret_hash().to_string(), id);
        inner.records.insert(id, credential.clone());

        Ok(credential)
    }

    async fn find_by_comparable(
        &self,
        comparable: &str,
        _ctx: &RequestContext,
    ) -> Result<Option<Credential>, DomainError> {
        let inner = self.inner.read().await;

        Ok(inner
            .comparable_index
            .get(comparable)
            .and_then(|id| inner.records.get(id))
            .cloned())
    }

    async fn get(
        &self,
        id: &CredentialId,
        _ctx: &RequestContext,
    ) -> Result<Option<Credential>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.records.get(&id.as_uuid()).cloned())
    }

    async fn update_active_flag(
        &self,
        id: &CredentialId,
        is_active: bool,
        actor: Option<&str>,
        _ctx: &RequestContext,
    ) -> Result<Credential, DomainError> {
        let mut inner = self.inner.write().await;

        let credential = inner
            .records
            .get_mut(&id.as_uuid())
            .ok_or_else(|| DomainError::not_found(format!("Credential '{id}' not found")))?;

        credential.set_active_flag(is_active, actor);
        Ok(credential.clone())
    }

    async fn soft_delete(
        &self,
        id: &CredentialId,
        actor: Option<&str>,
        _ctx: &RequestContext,
    ) -> Result<Credential, DomainError> {
        let mut inner = self.inner.write().await;

        let credential = inner
            .records
            .get_mut(&id.as_uuid())
            .ok_or_else(|| DomainError::not_found(format!("Credential '{id}' not found")))?;

        credential.soft_delete(actor);
        Ok(credential.clone())
    }

    async fn list(
        &self,
        filter: &ListFilter,
        page: &PageRequest,
        _ctx: &RequestContext,
    ) -> Result<CredentialPage, DomainError> {
        let now = Utc::now();
        let include_deleted =
            filter.include_deleted || filter.status == Some(CredentialStatus::Deleted);

        let inner = self.inner.read().await;
        let mut matched: Vec<Credential> = inner
            .records
            .values()
            .filter(|c| {
                if c.is_deleted() && !include_deleted {
                    return false;
                }
                if let Some(owner) = &filter.owner_id {
                    if c.owner_id() != owner {
                        return false;
                    }
                }
                if let Some(status) = filter.status {
                    // Same derivation rule as validation
                    if resolve_status(c, now) != status {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| match page.sort {
            SortOrder::CreatedAtAsc => a.created_at().cmp(&b.created_at()),
            SortOrder::CreatedAtDesc => b.created_at().cmp(&a.created_at()),
        });

        let total = matched.len() as u64;
        let start = (page.page.max(1) - 1) as usize * page.limit as usize;
        let records = matched
            .into_iter()
            .skip(start)
            .take(page.limit as usize)
            .collect();

        Ok(CredentialPage { records, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OwnerId;
    use chrono::Duration;

    fn credential(owner: &str, hash: &str, name: &str) -> Credential {
        Credential::new(
            CredentialId::new(),
            OwnerId::new(owner).unwrap(),
            hash,
            name,
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryCredentialStore::new();
        let ctx = RequestContext::new();

        let created = store
            .insert_unique(credential("acct-1", "sha256$a", "Key A"), &ctx)
            .await
            .unwrap();

        let found = store
            .find_by_comparable("sha256$a", &ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), created.id());

        let missing = store.find_by_comparable("sha256$z", &ctx).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_uniqueness_constraint_on_comparable_form() {
        let store = InMemoryCredentialStore::new();
        let ctx = RequestContext::new();

        store
            .insert_unique(credential("acct-1", "sha256$same", "First"), &ctx)
            .await
            .unwrap();

        let err = store
            .insert_unique(credential("acct-2", "sha256$same", "Second"), &ctx)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_active_flag() {
        let store = InMemoryCredentialStore::new();
        let ctx = RequestContext::new();

        let created = store
            .insert_unique(credential("acct-1", "sha256$a", "Key"), &ctx)
            .await
            .unwrap();

        let updated = store
            .update_active_flag(created.id(), false, Some("admin"), &ctx)
            .await
            .unwrap();
        assert!(!updated.is_active());
        assert_eq!(updated.updated_by(), Some("admin"));

        let err = store
            .update_active_flag(&CredentialId::new(), false, None, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_the_row() {
        let store = InMemoryCredentialStore::new();
        let ctx = RequestContext::new();

        let created = store
            .insert_unique(credential("acct-1", "sha256$a", "Key"), &ctx)
            .await
            .unwrap();

        let deleted = store
            .soft_delete(created.id(), Some("admin"), &ctx)
            .await
            .unwrap();
        assert!(deleted.is_deleted());
        assert_eq!(deleted.deleted_by(), Some("admin"));

        // Row persists for audit
        let fetched = store.get(created.id(), &ctx).await.unwrap().unwrap();
        assert!(fetched.is_deleted());

        // Second delete keeps the original timestamp
        let again = store.soft_delete(created.id(), None, &ctx).await.unwrap();
        assert_eq!(again.deleted_at(), deleted.deleted_at());
    }

    #[tokio::test]
    async fn test_list_excludes_deleted_by_default() {
        let store = InMemoryCredentialStore::new();
        let ctx = RequestContext::new();

        store
            .insert_unique(credential("acct-1", "sha256$a", "Kept"), &ctx)
            .await
            .unwrap();
        let dropped = store
            .insert_unique(credential("acct-1", "sha256$b", "Dropped"), &ctx)
            .await
            .unwrap();
        store.soft_delete(dropped.id(), None, &ctx).await.unwrap();

        let page = store
            .list(&ListFilter::new(), &PageRequest::new(1, 10), &ctx)
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].name(), "Kept");

        let page = store
            .list(
                &ListFilter::new().including_deleted(),
                &PageRequest::new(1, 10),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_list_status_deleted_implies_inclusion() {
        let store = InMemoryCredentialStore::new();
        let ctx = RequestContext::new();

        let dropped = store
            .insert_unique(credential("acct-1", "sha256$a", "Dropped"), &ctx)
            .await
            .unwrap();
        store.soft_delete(dropped.id(), None, &ctx).await.unwrap();

        let page = store
            .list(
                &ListFilter::new().with_status(CredentialStatus::Deleted),
                &PageRequest::new(1, 10),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_derived_status() {
        let store = InMemoryCredentialStore::new();
        let ctx = RequestContext::new();

        store
            .insert_unique(credential("acct-1", "sha256$a", "Active"), &ctx)
            .await
            .unwrap();
        store
            .insert_unique(
                credential("acct-1", "sha256$b", "Expired")
                    .with_expiration(Some(Utc::now() - Duration::hours(1))),
                &ctx,
            )
            .await
            .unwrap();
        let revoked = store
            .insert_unique(credential("acct-1", "sha256$c", "Revoked"), &ctx)
            .await
            .unwrap();
        store
            .update_active_flag(revoked.id(), false, None, &ctx)
            .await
            .unwrap();

        let active = store
            .list(
                &ListFilter::new().with_status(CredentialStatus::Active),
                &PageRequest::new(1, 10),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(active.total, 1);
        assert_eq!(active.records[0].name(), "Active");

        let expired = store
            .list(
                &ListFilter::new().with_status(CredentialStatus::Expired),
                &PageRequest::new(1, 10),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(expired.total, 1);
        assert_eq!(expired.records[0].name(), "Expired");
    }

    #[tokio::test]
    async fn test_list_pagination_and_sort() {
        let store = InMemoryCredentialStore::new();
        let ctx = RequestContext::new();

        for i in 0..5 {
            store
                .insert_unique(
                    credential("acct-1", &format!("sha256${i}"), &format!("Key {i}")),
                    &ctx,
                )
                .await
                .unwrap();
            // Distinct created_at values for a deterministic order
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let page = store
            .list(
                &ListFilter::new(),
                &PageRequest::new(2, 2).with_sort(SortOrder::CreatedAtAsc),
                &ctx,
            )
            .await
            .unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].name(), "Key 2");
        assert_eq!(page.records[1].name(), "Key 3");

        let desc = store
            .list(&ListFilter::new(), &PageRequest::new(1, 1), &ctx)
            .await
            .unwrap();
        assert_eq!(desc.records[0].name(), "Key 4");

        // Past the last page
        let empty = store
            .list(&ListFilter::new(), &PageRequest::new(4, 2), &ctx)
            .await
            .unwrap();
        assert_eq!(empty.total, 5);
        assert!(empty.records.is_empty());
    }
}
