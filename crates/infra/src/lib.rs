//! Infrastructure layer: gateways to the record store, object storage and
//! identity directory, plus the service that sequences them around the pure
//! inventory core.

pub mod gateway;
pub mod service;

pub use gateway::{
    GatewayError, GatewayResult, IdentityDirectory, ObjectKey, ObjectStore, RecordStore,
    StoredObject,
};
pub use service::{InventoryService, ServiceError, ServiceResult};
