//! Filesystem-backed [`BlobStore`], grounded on `mr-reviewer::cache`'s
//! env-overridable root dir plus sanitized on-disk keys — standing in for
//! the real S3 bucket the Reconciler writes reports into (§1 external
//! collaborator).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use orchestrator_core::errors::OrchestratorError;
use orchestrator_core::ports::BlobStore;
use orchestrator_core::OrchestratorResult;
use tokio::fs;

fn blob_root() -> PathBuf {
    std::env::var("ORCHESTRATOR_BLOB_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("code_data/blobs"))
}

fn sanitize(key: &str) -> String {
    key.trim_start_matches('/').replace("..", "_")
}

#[derive(Debug, Default, Clone)]
pub struct FsBlobStore {
    root: Option<PathBuf>,
}

impl FsBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let root = self.root.clone().unwrap_or_else(blob_root);
        root.join(sanitize(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> OrchestratorResult<()> {
        let path = self.path_for(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| OrchestratorError::Store(e.to_string()))?;
        }
        fs::write(&path, bytes)
            .await
            .map_err(|e| OrchestratorError::Store(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> OrchestratorResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        if !Path::new(&path).exists() {
            return Ok(None);
        }
        let data = fs::read(&path).await.map_err(|e| OrchestratorError::Store(e.to_string()))?;
        Ok(Some(data))
    }

    async fn signed_url(&self, key: &str, ttl_secs: u64) -> OrchestratorResult<String> {
        let expires = Utc::now() + chrono::Duration::seconds(ttl_secs as i64);
        let path = self.path_for(key);
        Ok(format!("file://{}?expires={}", path.display(), expires.timestamp()))
    }
}
