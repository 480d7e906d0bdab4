//! In-process [`TaskStore`]: keyed by `request_id`, ordered by `number`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use orchestrator_core::TaskRecord;
use orchestrator_core::ports::TaskStore;
use orchestrator_core::OrchestratorResult;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    inner: Arc<RwLock<HashMap<String, Vec<TaskRecord>>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn put(&self, record: TaskRecord) -> OrchestratorResult<()> {
        let mut guard = self.inner.write().await;
        let bucket = guard.entry(record.request_id.clone()).or_default();
        match bucket.iter_mut().find(|t| t.number == record.number) {
            Some(existing) => *existing = record,
            None => bucket.push(record),
        }
        Ok(())
    }

    async fn list_by_request(&self, request_id: &str) -> OrchestratorResult<Vec<TaskRecord>> {
        let guard = self.inner.read().await;
        let mut records = guard.get(request_id).cloned().unwrap_or_default();
        records.sort_by_key(|t| t.number);
        Ok(records)
    }
}
