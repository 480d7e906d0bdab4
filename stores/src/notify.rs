//! [`Notifier`] implementations. `LogNotifier` mirrors the teacher's
//! ambient `tracing`-based observability; `FsNotifier` additionally
//! persists each notification as a JSON blob, useful for tests that assert
//! on what the Reconciler published without wiring a real SNS topic.

use async_trait::async_trait;
use orchestrator_core::errors::OrchestratorError;
use orchestrator_core::model::NotificationMessage;
use orchestrator_core::ports::Notifier;
use orchestrator_core::OrchestratorResult;
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, message: NotificationMessage) -> OrchestratorResult<()> {
        info!(title = %message.title, report_url = %message.report_url, "notification published");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FsNotifier {
    dir: std::path::PathBuf,
}

impl FsNotifier {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Notifier for FsNotifier {
    async fn publish(&self, message: NotificationMessage) -> OrchestratorResult<()> {
        info!(title = %message.title, report_url = %message.report_url, "notification published");
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| OrchestratorError::Store(e.to_string()))?;
        let filename = format!("{}.json", uuid_like(&message.report_url));
        let path = self.dir.join(filename);
        let bytes = serde_json::to_vec_pretty(&message).map_err(OrchestratorError::from)?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| OrchestratorError::Store(e.to_string()))?;
        Ok(())
    }
}

fn uuid_like(seed: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}
