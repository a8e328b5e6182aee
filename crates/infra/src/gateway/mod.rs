//! Gateway contracts for the external document store, object storage and
//! identity directory.
//!
//! Every operation is asynchronous and may fail with a transport or permission
//! error. Failures are reported to the caller and never retried here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use consign_auth::{PrincipalId, UserProfile};
use consign_core::{DomainError, ItemId};
use consign_inventory::{InventoryItem, ItemPatch, NewItem};

pub mod fs;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use fs::FsObjectStore;
pub use memory::{InMemoryIdentityDirectory, InMemoryObjectStore, InMemoryRecordStore};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresIdentityDirectory, PostgresRecordStore};

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("not found")]
    NotFound,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The store refused the payload (e.g. a record that fails domain checks).
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<DomainError> for GatewayError {
    fn from(value: DomainError) -> Self {
        GatewayError::Rejected(value.to_string())
    }
}

/// Inventory collection in the document store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whole collection, in insertion order.
    async fn fetch_all(&self) -> GatewayResult<Vec<InventoryItem>>;

    async fn fetch_one(&self, id: ItemId) -> GatewayResult<InventoryItem>;

    /// Insert a new record; the store assigns the id.
    async fn insert(&self, new: NewItem, date_added: DateTime<Utc>) -> GatewayResult<ItemId>;

    /// Write the fields present in `patch`. Last write wins.
    async fn update(&self, id: ItemId, patch: &ItemPatch) -> GatewayResult<()>;

    async fn delete(&self, id: ItemId) -> GatewayResult<()>;
}

/// Location of an uploaded item image: `<item id>/<file name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    item_id: ItemId,
    filename: String,
}

impl ObjectKey {
    /// The file name must be a single, non-empty path segment.
    pub fn new(item_id: ItemId, filename: impl Into<String>) -> Result<Self, DomainError> {
        let filename = filename.into();
        let bad = filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\', '\0']);
        if bad {
            return Err(DomainError::validation(format!("invalid file name '{filename}'")));
        }
        Ok(Self { item_id, filename })
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Relative path under which the object is stored and served.
    pub fn path(&self) -> String {
        format!("images/{}/{}", self.item_id, self.filename)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Binary object storage for item images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store (or overwrite) an object and return its durable URL.
    async fn upload(&self, key: &ObjectKey, content_type: &str, bytes: Vec<u8>) -> GatewayResult<String>;

    async fn download(&self, key: &ObjectKey) -> GatewayResult<StoredObject>;
}

/// Side lookup from principal to profile (email + admin flag).
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Return the profile, creating a non-privileged one on first sign-in.
    async fn ensure_profile(&self, id: PrincipalId, email: &str) -> GatewayResult<UserProfile>;

    async fn profile(&self, id: PrincipalId) -> GatewayResult<UserProfile>;

    async fn list_profiles(&self) -> GatewayResult<Vec<UserProfile>>;

    async fn set_privileged(&self, id: PrincipalId, privileged: bool) -> GatewayResult<()>;
}

/// Join a public base URL and an object path without doubling slashes.
pub(crate) fn object_url(base_url: &str, key: &ObjectKey) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key.path())
}

/// Best-effort content type from the file extension.
pub(crate) fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
