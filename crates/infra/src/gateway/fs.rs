//! Filesystem-backed object storage.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use super::{
    content_type_for, object_url, GatewayError, GatewayResult, ObjectKey, ObjectStore,
    StoredObject,
};

/// Stores objects under `root/images/<item id>/<file name>`.
///
/// The content type is not persisted; downloads infer it from the extension.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    base_url: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    fn path_for(&self, key: &ObjectKey) -> PathBuf {
        self.root
            .join("images")
            .join(key.item_id().to_string())
            .join(key.filename())
    }
}

fn io_error(err: std::io::Error) -> GatewayError {
    match err.kind() {
        ErrorKind::NotFound => GatewayError::NotFound,
        ErrorKind::PermissionDenied => GatewayError::PermissionDenied(err.to_string()),
        _ => GatewayError::Transport(err.to_string()),
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn upload(&self, key: &ObjectKey, _content_type: &str, bytes: Vec<u8>) -> GatewayResult<String> {
        let path = self.path_for(key);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(io_error)?;
        }
        tokio::fs::write(&path, bytes).await.map_err(io_error)?;

        tracing::debug!(path = %path.display(), "stored object");
        Ok(object_url(&self.base_url, key))
    }

    async fn download(&self, key: &ObjectKey) -> GatewayResult<StoredObject> {
        let bytes = tokio::fs::read(self.path_for(key)).await.map_err(io_error)?;
        Ok(StoredObject {
            content_type: content_type_for(key.filename()).to_string(),
            bytes,
        })
    }
}
