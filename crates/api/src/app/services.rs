use std::sync::Arc;

use consign_infra::gateway::{
    FsObjectStore, IdentityDirectory, InMemoryIdentityDirectory, InMemoryObjectStore,
    InMemoryRecordStore, ObjectStore, RecordStore,
};
use consign_infra::{GatewayError, InventoryService};

use crate::config::ApiConfig;

/// Everything the handlers need, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub inventory: InventoryService,
    /// Origin for links handed to clients (QR targets).
    pub public_base_url: String,
}

impl AppServices {
    pub fn new(inventory: InventoryService, public_base_url: impl Into<String>) -> Self {
        Self {
            inventory,
            public_base_url: public_base_url.into(),
        }
    }

    /// In-memory records and images around a caller-provided directory, e.g.
    /// one seeded with a bootstrap admin.
    pub fn with_identity(
        public_base_url: impl Into<String>,
        identity: Arc<dyn IdentityDirectory>,
    ) -> Self {
        let public_base_url = public_base_url.into();
        let inventory = InventoryService::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryObjectStore::new(public_base_url.clone())),
            identity,
        );
        Self::new(inventory, public_base_url)
    }
}

pub async fn build_services(config: &ApiConfig) -> Result<AppServices, GatewayError> {
    let objects: Arc<dyn ObjectStore> = match &config.image_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "storing images on disk");
            Arc::new(FsObjectStore::new(dir, config.public_base_url.clone()))
        }
        None => Arc::new(InMemoryObjectStore::new(config.public_base_url.clone())),
    };

    let (records, identity) = match &config.database_url {
        Some(url) => build_persistent_stores(url).await?,
        None => in_memory_stores(),
    };

    Ok(AppServices::new(
        InventoryService::new(records, objects, identity),
        config.public_base_url.clone(),
    ))
}

type Stores = (Arc<dyn RecordStore>, Arc<dyn IdentityDirectory>);

fn in_memory_stores() -> Stores {
    (
        Arc::new(InMemoryRecordStore::new()),
        Arc::new(InMemoryIdentityDirectory::new()),
    )
}

#[cfg(feature = "postgres")]
async fn build_persistent_stores(database_url: &str) -> Result<Stores, GatewayError> {
    use consign_infra::gateway::{postgres, PostgresIdentityDirectory, PostgresRecordStore};

    let pool = sqlx::PgPool::connect(database_url).await?;
    postgres::migrate(&pool).await?;
    tracing::info!("using postgres record store");

    Ok((
        Arc::new(PostgresRecordStore::new(pool.clone())),
        Arc::new(PostgresIdentityDirectory::new(pool)),
    ))
}

#[cfg(not(feature = "postgres"))]
async fn build_persistent_stores(_database_url: &str) -> Result<Stores, GatewayError> {
    tracing::warn!("DATABASE_URL set but postgres feature not enabled, falling back to in-memory");
    Ok(in_memory_stores())
}
