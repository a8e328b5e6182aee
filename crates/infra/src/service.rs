//! Inventory service: sequences the pure inventory core around gateway IO.
//!
//! The core never performs IO. Each method here loads what it needs from the
//! gateways, runs the pure operation, writes the resulting intent back and
//! re-fetches, logging (not retrying) anything that fails on the way.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use consign_auth::{authorize, Action, AuthzError, PrincipalId, Session, UserProfile};
use consign_core::{DomainError, ItemId};
use consign_inventory::{
    history, malformed_fields, project, transition, InventoryItem, InventoryStats, ItemPatch,
    ItemStatus, NewItem, SearchDirective, SortDirective,
};

use crate::gateway::{
    GatewayError, IdentityDirectory, ObjectKey, ObjectStore, RecordStore, StoredObject,
};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Clone)]
pub struct InventoryService {
    records: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStore>,
    identity: Arc<dyn IdentityDirectory>,
}

impl InventoryService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        objects: Arc<dyn ObjectStore>,
        identity: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            records,
            objects,
            identity,
        }
    }

    // ---------------------------------------------------------------------
    // Identity
    // ---------------------------------------------------------------------

    /// Resolve the session for a verified principal, creating its profile on
    /// first sign-in.
    pub async fn sign_in(&self, principal_id: PrincipalId, email: &str) -> ServiceResult<Session> {
        let profile = self
            .identity
            .ensure_profile(principal_id, email)
            .await
            .inspect_err(|e| tracing::warn!(%principal_id, "profile lookup failed: {e}"))?;
        Ok(Session::from_profile(&profile))
    }

    pub async fn users(&self, session: &Session) -> ServiceResult<Vec<UserProfile>> {
        authorize(session, Action::ManageUsers)?;
        Ok(self
            .identity
            .list_profiles()
            .await
            .inspect_err(|e| tracing::warn!("error fetching users: {e}"))?)
    }

    /// Flip another user's admin flag and return the stored result.
    pub async fn toggle_privileged(
        &self,
        session: &Session,
        user_id: PrincipalId,
    ) -> ServiceResult<UserProfile> {
        authorize(session, Action::ManageUsers)?;

        let current = self.identity.profile(user_id).await?;
        let next = current.toggled();
        self.identity
            .set_privileged(user_id, next.is_admin)
            .await
            .inspect_err(|e| tracing::warn!(%user_id, "error updating admin status: {e}"))?;

        tracing::info!(
            actor = %session.principal_id(),
            %user_id,
            is_admin = next.is_admin,
            "admin status toggled"
        );
        Ok(self.identity.profile(user_id).await?)
    }

    // ---------------------------------------------------------------------
    // Inventory
    // ---------------------------------------------------------------------

    /// Current collection, filtered and ordered by the directives.
    pub async fn list(
        &self,
        session: &Session,
        search: &SearchDirective,
        sort: SortDirective,
    ) -> ServiceResult<Vec<InventoryItem>> {
        authorize(session, Action::ManageInventory)?;

        let items = self.fetch_all().await?;
        if let Some(field) = sort.field {
            for issue in malformed_fields(&items, field) {
                tracing::warn!("sorting over malformed value: {issue}");
            }
        }
        Ok(project(&items, search, sort))
    }

    pub async fn get(&self, session: &Session, id: ItemId) -> ServiceResult<InventoryItem> {
        authorize(session, Action::ManageInventory)?;
        Ok(self.records.fetch_one(id).await?)
    }

    pub async fn add(&self, session: &Session, new: NewItem) -> ServiceResult<InventoryItem> {
        authorize(session, Action::ManageInventory)?;
        new.validate()?;

        let id = self
            .records
            .insert(new, Utc::now())
            .await
            .inspect_err(|e| tracing::warn!("error adding item: {e}"))?;

        tracing::info!(item_id = %id, actor = %session.principal_id(), "item added");
        Ok(self.records.fetch_one(id).await?)
    }

    pub async fn edit(
        &self,
        session: &Session,
        id: ItemId,
        patch: ItemPatch,
    ) -> ServiceResult<InventoryItem> {
        authorize(session, Action::ManageInventory)?;
        patch.validate()?;

        if !patch.is_empty() {
            self.records
                .update(id, &patch)
                .await
                .inspect_err(|e| tracing::warn!(item_id = %id, "error updating item: {e}"))?;
            tracing::info!(item_id = %id, actor = %session.principal_id(), "item edited");
        }
        Ok(self.records.fetch_one(id).await?)
    }

    pub async fn delete(&self, session: &Session, id: ItemId) -> ServiceResult<()> {
        authorize(session, Action::ManageInventory)?;
        self.records
            .delete(id)
            .await
            .inspect_err(|e| tracing::warn!(item_id = %id, "error deleting item: {e}"))?;

        tracing::info!(item_id = %id, actor = %session.principal_id(), "item deleted");
        Ok(())
    }

    /// Move an item to `target` (`"available"`, `"on hold"` or `"sold"`).
    ///
    /// Unknown targets fail with `InvalidState` before any IO happens.
    pub async fn change_status(
        &self,
        session: &Session,
        id: ItemId,
        target: &str,
    ) -> ServiceResult<InventoryItem> {
        authorize(session, Action::ManageInventory)?;
        let target: ItemStatus = target.parse()?;

        let current = self.records.fetch_one(id).await?;
        let next = transition(&current, target);

        self.records
            .update(id, &ItemPatch::status_only(next.status()))
            .await
            .inspect_err(|e| tracing::warn!(item_id = %id, "error updating status: {e}"))?;

        tracing::info!(
            item_id = %id,
            from = %current.status(),
            to = %next.status(),
            "status changed"
        );
        Ok(self.records.fetch_one(id).await?)
    }

    /// Upload (or replace) an item's image and record its URL on the item.
    pub async fn upload_image(
        &self,
        session: &Session,
        id: ItemId,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ServiceResult<InventoryItem> {
        authorize(session, Action::ManageInventory)?;
        let key = ObjectKey::new(id, filename)?;

        // The record must exist before anything is written to storage.
        self.records.fetch_one(id).await?;

        let url = self
            .objects
            .upload(&key, content_type, bytes)
            .await
            .inspect_err(|e| tracing::warn!(item_id = %id, "error uploading image: {e}"))?;
        self.records
            .update(id, &ItemPatch::image_only(url))
            .await
            .inspect_err(|e| tracing::warn!(item_id = %id, "error recording image url: {e}"))?;

        tracing::info!(item_id = %id, filename, "image uploaded");
        Ok(self.records.fetch_one(id).await?)
    }

    /// Raw image bytes for serving. Image URLs are public, so no session.
    pub async fn image(&self, id: ItemId, filename: &str) -> ServiceResult<StoredObject> {
        let key = ObjectKey::new(id, filename)?;
        Ok(self.objects.download(&key).await?)
    }

    /// Sold items, recomputed from the current collection.
    pub async fn history(&self, session: &Session) -> ServiceResult<Vec<InventoryItem>> {
        authorize(session, Action::ManageInventory)?;
        Ok(history(&self.fetch_all().await?))
    }

    pub async fn stats(&self, session: &Session) -> ServiceResult<InventoryStats> {
        authorize(session, Action::ViewStats)?;
        Ok(InventoryStats::from_items(&self.fetch_all().await?))
    }

    async fn fetch_all(&self) -> ServiceResult<Vec<InventoryItem>> {
        Ok(self
            .records
            .fetch_all()
            .await
            .inspect_err(|e| tracing::warn!("error fetching items: {e}"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{InMemoryIdentityDirectory, InMemoryObjectStore, InMemoryRecordStore};
    use consign_inventory::{SortDirection, SortField};

    fn service() -> InventoryService {
        InventoryService::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryObjectStore::new("http://img.test")),
            Arc::new(InMemoryIdentityDirectory::new()),
        )
    }

    fn clerk() -> Session {
        Session::new(PrincipalId::new(), "clerk@example.com", false)
    }

    fn admin() -> Session {
        Session::new(PrincipalId::new(), "admin@example.com", true)
    }

    fn new_item(sku: &str, consignor: &str, price: f64) -> NewItem {
        NewItem {
            sku: sku.to_string(),
            name: format!("{sku} item"),
            price,
            quantity: 1,
            consignor_name: consignor.to_string(),
        }
    }

    #[tokio::test]
    async fn add_then_list_sorted_by_price() {
        let svc = service();
        let s = clerk();
        svc.add(&s, new_item("B1", "Alice", 10.0)).await.unwrap();
        svc.add(&s, new_item("A1", "Bob", 5.0)).await.unwrap();

        let sort = SortDirective::by(SortField::Price, SortDirection::Asc);
        let listed = svc.list(&s, &SearchDirective::default(), sort).await.unwrap();
        let skus: Vec<&str> = listed.iter().map(|i| i.sku()).collect();
        assert_eq!(skus, ["A1", "B1"]);

        let unsorted = svc
            .list(&s, &SearchDirective::default(), SortDirective::none())
            .await
            .unwrap();
        assert_eq!(unsorted[0].sku(), "B1");
    }

    #[tokio::test]
    async fn add_rejects_blank_fields_without_writing() {
        let svc = service();
        let s = clerk();
        let err = svc.add(&s, new_item("", "Alice", 1.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert!(svc.history(&s).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_change_moves_item_in_and_out_of_history() {
        let svc = service();
        let s = clerk();
        let item = svc.add(&s, new_item("B1", "Alice", 10.0)).await.unwrap();
        let id = item.id_typed();

        let sold = svc.change_status(&s, id, "sold").await.unwrap();
        assert_eq!(sold.status(), ItemStatus::Sold);
        assert_eq!(sold.sku(), item.sku());
        assert_eq!(svc.history(&s).await.unwrap().len(), 1);

        svc.change_status(&s, id, "available").await.unwrap();
        assert!(svc.history(&s).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let svc = service();
        let s = clerk();
        let item = svc.add(&s, new_item("B1", "Alice", 10.0)).await.unwrap();

        let err = svc.change_status(&s, item.id_typed(), "lost").await.unwrap_err();
        assert_eq!(err, ServiceError::Domain(DomainError::InvalidState("lost".to_string())));
        assert_eq!(svc.get(&s, item.id_typed()).await.unwrap().status(), ItemStatus::Available);
    }

    #[tokio::test]
    async fn missing_item_surfaces_gateway_not_found() {
        let svc = service();
        let err = svc.change_status(&clerk(), ItemId::new(), "sold").await.unwrap_err();
        assert_eq!(err, ServiceError::Gateway(GatewayError::NotFound));
    }

    #[tokio::test]
    async fn image_upload_sets_url_and_is_served() {
        let svc = service();
        let s = clerk();
        let item = svc.add(&s, new_item("B1", "Alice", 10.0)).await.unwrap();
        let id = item.id_typed();

        let updated = svc
            .upload_image(&s, id, "front.png", "image/png", vec![1, 2])
            .await
            .unwrap();
        assert_eq!(
            updated.image_url(),
            Some(format!("http://img.test/images/{id}/front.png").as_str())
        );
        assert_eq!(svc.image(id, "front.png").await.unwrap().bytes, vec![1, 2]);
    }

    #[tokio::test]
    async fn edit_and_delete() {
        let svc = service();
        let s = clerk();
        let item = svc.add(&s, new_item("B1", "Alice", 10.0)).await.unwrap();
        let id = item.id_typed();

        let patch = ItemPatch {
            name: Some("Walnut desk".to_string()),
            ..ItemPatch::default()
        };
        let edited = svc.edit(&s, id, patch).await.unwrap();
        assert_eq!(edited.name(), "Walnut desk");
        assert_eq!(edited.date_added(), item.date_added());

        svc.delete(&s, id).await.unwrap();
        assert_eq!(
            svc.get(&s, id).await.unwrap_err(),
            ServiceError::Gateway(GatewayError::NotFound)
        );
    }

    #[tokio::test]
    async fn admin_views_require_privilege() {
        let svc = service();
        assert!(matches!(svc.stats(&clerk()).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(svc.users(&clerk()).await, Err(ServiceError::Forbidden(_))));

        let a = admin();
        svc.add(&a, new_item("B1", "Alice", 10.0)).await.unwrap();
        let sold = svc.add(&a, new_item("A1", "Bob", 5.0)).await.unwrap();
        svc.change_status(&a, sold.id_typed(), "sold").await.unwrap();

        let stats = svc.stats(&a).await.unwrap();
        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.sold_items, 1);
        assert_eq!(stats.total_revenue, 5.0);
    }

    #[tokio::test]
    async fn sign_in_then_toggle_admin() {
        let svc = service();
        let user = svc.sign_in(PrincipalId::new(), "new@example.com").await.unwrap();
        assert!(!user.is_privileged());

        let profile = svc.toggle_privileged(&admin(), user.principal_id()).await.unwrap();
        assert!(profile.is_admin);

        let again = svc.sign_in(user.principal_id(), "new@example.com").await.unwrap();
        assert!(again.is_privileged());
    }

    /// Record store whose writes fail after the object upload succeeded.
    struct ReadOnlyRecords(InMemoryRecordStore);

    #[async_trait::async_trait]
    impl RecordStore for ReadOnlyRecords {
        async fn fetch_all(&self) -> crate::gateway::GatewayResult<Vec<InventoryItem>> {
            self.0.fetch_all().await
        }

        async fn fetch_one(&self, id: ItemId) -> crate::gateway::GatewayResult<InventoryItem> {
            self.0.fetch_one(id).await
        }

        async fn insert(
            &self,
            new: NewItem,
            date_added: chrono::DateTime<Utc>,
        ) -> crate::gateway::GatewayResult<ItemId> {
            self.0.insert(new, date_added).await
        }

        async fn update(&self, _id: ItemId, _patch: &ItemPatch) -> crate::gateway::GatewayResult<()> {
            Err(GatewayError::PermissionDenied("read-only".to_string()))
        }

        async fn delete(&self, id: ItemId) -> crate::gateway::GatewayResult<()> {
            self.0.delete(id).await
        }
    }

    #[tokio::test]
    async fn image_upload_reports_failed_record_update() {
        let records = InMemoryRecordStore::new();
        let id = records.insert(new_item("B1", "Alice", 10.0), Utc::now()).await.unwrap();
        let svc = InventoryService::new(
            Arc::new(ReadOnlyRecords(records)),
            Arc::new(InMemoryObjectStore::new("http://img.test")),
            Arc::new(InMemoryIdentityDirectory::new()),
        );

        let err = svc
            .upload_image(&clerk(), id, "front.png", "image/png", vec![1])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Gateway(GatewayError::PermissionDenied("read-only".to_string()))
        );
        assert_eq!(svc.get(&clerk(), id).await.unwrap().image_url(), None);
    }
}
