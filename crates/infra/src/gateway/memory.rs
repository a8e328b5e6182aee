//! In-memory gateways for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use consign_auth::{PrincipalId, UserProfile};
use consign_core::{Entity, ItemId};
use consign_inventory::{InventoryItem, ItemPatch, NewItem};

use super::{
    object_url, GatewayError, GatewayResult, IdentityDirectory, ObjectKey, ObjectStore,
    RecordStore, StoredObject,
};

fn poisoned<T>(_: T) -> GatewayError {
    GatewayError::Transport("in-memory store lock poisoned".to_string())
}

/// Inventory collection kept in a `Vec`, so `fetch_all` returns insertion order.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<Vec<InventoryItem>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn fetch_all(&self) -> GatewayResult<Vec<InventoryItem>> {
        Ok(self.inner.read().map_err(poisoned)?.clone())
    }

    async fn fetch_one(&self, id: ItemId) -> GatewayResult<InventoryItem> {
        let items = self.inner.read().map_err(poisoned)?;
        items
            .iter()
            .find(|item| *item.id() == id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn insert(&self, new: NewItem, date_added: DateTime<Utc>) -> GatewayResult<ItemId> {
        let id = ItemId::new();
        let item = InventoryItem::create(id, new, date_added)?;
        self.inner.write().map_err(poisoned)?.push(item);
        Ok(id)
    }

    async fn update(&self, id: ItemId, patch: &ItemPatch) -> GatewayResult<()> {
        let mut items = self.inner.write().map_err(poisoned)?;
        let slot = items
            .iter_mut()
            .find(|item| *item.id() == id)
            .ok_or(GatewayError::NotFound)?;
        *slot = slot.apply_patch(patch)?;
        Ok(())
    }

    async fn delete(&self, id: ItemId) -> GatewayResult<()> {
        let mut items = self.inner.write().map_err(poisoned)?;
        let before = items.len();
        items.retain(|item| *item.id() != id);
        if items.len() == before {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }
}

/// Object storage backed by a map; URLs point at `base_url`.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    base_url: String,
    inner: RwLock<HashMap<ObjectKey, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            inner: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(&self, key: &ObjectKey, content_type: &str, bytes: Vec<u8>) -> GatewayResult<String> {
        self.inner.write().map_err(poisoned)?.insert(
            key.clone(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(object_url(&self.base_url, key))
    }

    async fn download(&self, key: &ObjectKey) -> GatewayResult<StoredObject> {
        self.inner
            .read()
            .map_err(poisoned)?
            .get(key)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }
}

/// Profiles keyed by principal.
#[derive(Debug, Default)]
pub struct InMemoryIdentityDirectory {
    inner: RwLock<Vec<UserProfile>>,
}

impl InMemoryIdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile directly (e.g. the bootstrap admin).
    pub fn with_profile(self, profile: UserProfile) -> Self {
        if let Ok(mut profiles) = self.inner.write() {
            profiles.retain(|p| p.id != profile.id);
            profiles.push(profile);
        }
        self
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryIdentityDirectory {
    async fn ensure_profile(&self, id: PrincipalId, email: &str) -> GatewayResult<UserProfile> {
        let mut profiles = self.inner.write().map_err(poisoned)?;
        if let Some(existing) = profiles.iter().find(|p| p.id == id) {
            return Ok(existing.clone());
        }
        let profile = UserProfile::first_sign_in(id, email);
        profiles.push(profile.clone());
        Ok(profile)
    }

    async fn profile(&self, id: PrincipalId) -> GatewayResult<UserProfile> {
        self.inner
            .read()
            .map_err(poisoned)?
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn list_profiles(&self) -> GatewayResult<Vec<UserProfile>> {
        Ok(self.inner.read().map_err(poisoned)?.clone())
    }

    async fn set_privileged(&self, id: PrincipalId, privileged: bool) -> GatewayResult<()> {
        let mut profiles = self.inner.write().map_err(poisoned)?;
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GatewayError::NotFound)?;
        profile.is_admin = privileged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consign_inventory::ItemStatus;

    fn new_item(sku: &str) -> NewItem {
        NewItem {
            sku: sku.to_string(),
            name: "Lamp".to_string(),
            price: 12.0,
            quantity: 1,
            consignor_name: "Dana".to_string(),
        }
    }

    #[tokio::test]
    async fn records_keep_insertion_order() {
        let store = InMemoryRecordStore::new();
        for sku in ["C", "A", "B"] {
            store.insert(new_item(sku), Utc::now()).await.unwrap();
        }
        let all = store.fetch_all().await.unwrap();
        let skus: Vec<&str> = all.iter().map(|i| i.sku()).collect();
        assert_eq!(skus, ["C", "A", "B"]);
    }

    #[tokio::test]
    async fn insert_rejects_blank_sku() {
        let store = InMemoryRecordStore::new();
        let err = store.insert(new_item(""), Utc::now()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_records() {
        let store = InMemoryRecordStore::new();
        let missing = ItemId::new();
        assert_eq!(
            store.update(missing, &ItemPatch::status_only(ItemStatus::Sold)).await,
            Err(GatewayError::NotFound)
        );
        assert_eq!(store.delete(missing).await, Err(GatewayError::NotFound));
    }

    #[tokio::test]
    async fn partial_update_touches_only_given_fields() {
        let store = InMemoryRecordStore::new();
        let id = store.insert(new_item("A"), Utc::now()).await.unwrap();
        let before = store.fetch_one(id).await.unwrap();

        store.update(id, &ItemPatch::status_only(ItemStatus::OnHold)).await.unwrap();
        let after = store.fetch_one(id).await.unwrap();

        assert_eq!(after.status(), ItemStatus::OnHold);
        assert_eq!(after.sku(), before.sku());
        assert_eq!(after.date_added(), before.date_added());
    }

    #[tokio::test]
    async fn object_upload_overwrites() {
        let store = InMemoryObjectStore::new("http://img.test");
        let key = ObjectKey::new(ItemId::new(), "a.png").unwrap();

        let url = store.upload(&key, "image/png", vec![1]).await.unwrap();
        store.upload(&key, "image/png", vec![2, 3]).await.unwrap();

        assert_eq!(url, format!("http://img.test/{}", key.path()));
        assert_eq!(store.download(&key).await.unwrap().bytes, vec![2, 3]);
    }

    #[tokio::test]
    async fn first_sign_in_creates_unprivileged_profile_once() {
        let dir = InMemoryIdentityDirectory::new();
        let id = PrincipalId::new();

        let first = dir.ensure_profile(id, "a@example.com").await.unwrap();
        assert!(!first.is_admin);

        dir.set_privileged(id, true).await.unwrap();
        let again = dir.ensure_profile(id, "a@example.com").await.unwrap();
        assert!(again.is_admin);
        assert_eq!(dir.list_profiles().await.unwrap().len(), 1);
    }
}
