//! In-process [`RequestStore`] (§11): a sharded map standing in for the
//! real request table. Counter mutation goes through `HashMap::entry` under
//! a single write-lock acquisition per call — never read-then-write across
//! two lock acquisitions — so concurrent Executor completions can't race
//! each other the way a naive read-modify-write would (§5).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orchestrator_core::{OrchestratorError, OrchestratorResult, RequestRecord, TaskStatus};
use orchestrator_core::ports::{RequestKey, RequestStore};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryRequestStore {
    inner: Arc<RwLock<HashMap<(String, String), RequestRecord>>>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map_key(key: &RequestKey) -> (String, String) {
        (key.commit_id.clone(), key.request_id.clone())
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn put(&self, record: RequestRecord) -> OrchestratorResult<()> {
        let key = (record.commit_id.clone(), record.request_id.clone());
        self.inner.write().await.insert(key, record);
        Ok(())
    }

    async fn get(&self, key: &RequestKey) -> OrchestratorResult<Option<RequestRecord>> {
        Ok(self.inner.read().await.get(&Self::map_key(key)).cloned())
    }

    async fn init_dispatch(&self, key: &RequestKey, task_total: u32) -> OrchestratorResult<()> {
        let mut guard = self.inner.write().await;
        let record = guard
            .get_mut(&Self::map_key(key))
            .ok_or_else(|| OrchestratorError::NotFound(format!("request {}/{}", key.commit_id, key.request_id)))?;
        record.task_status = TaskStatus::Initializing;
        record.task_total = task_total;
        record.task_complete = 0;
        record.task_failure = 0;
        record.report_s3key = None;
        record.report_url = None;
        record.update_time = Utc::now();
        Ok(())
    }

    async fn patch_project_name(&self, key: &RequestKey, project_name: &str) -> OrchestratorResult<()> {
        let mut guard = self.inner.write().await;
        if let Some(record) = guard.get_mut(&Self::map_key(key)) {
            record.project_name = project_name.to_string();
            record.update_time = Utc::now();
        }
        Ok(())
    }

    async fn incr_complete(&self, key: &RequestKey) -> OrchestratorResult<RequestRecord> {
        let mut guard = self.inner.write().await;
        let record = guard
            .get_mut(&Self::map_key(key))
            .ok_or_else(|| OrchestratorError::NotFound(format!("request {}/{}", key.commit_id, key.request_id)))?;
        record.task_complete += 1;
        record.task_status = TaskStatus::Processing;
        record.update_time = Utc::now();
        Ok(record.clone())
    }

    async fn incr_failure(&self, key: &RequestKey) -> OrchestratorResult<RequestRecord> {
        let mut guard = self.inner.write().await;
        let record = guard
            .get_mut(&Self::map_key(key))
            .ok_or_else(|| OrchestratorError::NotFound(format!("request {}/{}", key.commit_id, key.request_id)))?;
        record.task_failure += 1;
        record.task_status = TaskStatus::Processing;
        record.update_time = Utc::now();
        Ok(record.clone())
    }

    async fn try_complete(&self, key: &RequestKey, report_s3key: &str, report_url: &str) -> OrchestratorResult<bool> {
        let mut guard = self.inner.write().await;
        let Some(record) = guard.get_mut(&Self::map_key(key)) else {
            return Ok(false);
        };
        if record.task_status == TaskStatus::Complete {
            return Ok(false);
        }
        record.task_status = TaskStatus::Complete;
        record.report_s3key = Some(report_s3key.to_string());
        record.report_url = Some(report_url.to_string());
        record.update_time = Utc::now();
        Ok(true)
    }

    async fn scan_incomplete_since(&self, since: DateTime<Utc>) -> OrchestratorResult<Vec<RequestRecord>> {
        let guard = self.inner.read().await;
        Ok(guard
            .values()
            .filter(|r| {
                matches!(r.task_status, TaskStatus::Start | TaskStatus::Processing) && r.create_time >= since
            })
            .cloned()
            .collect())
    }
}
