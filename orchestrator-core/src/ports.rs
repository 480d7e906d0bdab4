//! Narrow capability ports for the three stores, the task queue and the
//! notifier (§11). Modelled as `async-trait` objects, in the `Arc<dyn Trait>`
//! style the pack's `domain::ports` repository traits use — unlike the
//! enum-dispatched provider clients (a closed, small set of source-control
//! platforms), these ports are a pluggability seam meant to grow a real
//! DynamoDB/S3/SQS/SNS-backed implementation later without touching callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::OrchestratorResult;
use crate::model::{RequestRecord, TaskMessage, TaskRecord};

/// Key identifying one `RequestRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub commit_id: String,
    pub request_id: String,
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn put(&self, record: RequestRecord) -> OrchestratorResult<()>;

    async fn get(&self, key: &RequestKey) -> OrchestratorResult<Option<RequestRecord>>;

    /// Full-record rewrite to `Initializing` with the given total, counters reset.
    async fn init_dispatch(&self, key: &RequestKey, task_total: u32) -> OrchestratorResult<()>;

    /// Best-effort patch of `project_name`, logged on failure by the caller.
    async fn patch_project_name(&self, key: &RequestKey, project_name: &str) -> OrchestratorResult<()>;

    /// Atomic, never read-modify-write: bump `task_complete`, set status `Processing`.
    async fn incr_complete(&self, key: &RequestKey) -> OrchestratorResult<RequestRecord>;

    /// Atomic, never read-modify-write: bump `task_failure`, set status `Processing`.
    async fn incr_failure(&self, key: &RequestKey) -> OrchestratorResult<RequestRecord>;

    /// Compare-and-swap: only transitions if current status != `Complete`.
    /// Returns `true` if this call performed the transition.
    async fn try_complete(
        &self,
        key: &RequestKey,
        report_s3key: &str,
        report_url: &str,
    ) -> OrchestratorResult<bool>;

    /// The `(task_status, create_time)` index: records in `Start`/`Processing`
    /// created at or after `since`.
    async fn scan_incomplete_since(&self, since: DateTime<Utc>) -> OrchestratorResult<Vec<RequestRecord>>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn put(&self, record: TaskRecord) -> OrchestratorResult<()>;

    async fn list_by_request(&self, request_id: &str) -> OrchestratorResult<Vec<TaskRecord>>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> OrchestratorResult<()>;

    async fn get(&self, key: &str) -> OrchestratorResult<Option<Vec<u8>>>;

    /// Time-limited signed URL (the in-process store just returns a `file://`-ish
    /// path with an embedded expiry; see `stores::blob`).
    async fn signed_url(&self, key: &str, ttl_secs: u64) -> OrchestratorResult<String>;
}

#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn send(&self, message: TaskMessage) -> OrchestratorResult<()>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, message: crate::model::NotificationMessage) -> OrchestratorResult<()>;
}

/// Seam between the Dispatcher/Executor and the Reconciler (§4.F), so
/// neither crate depends on the other directly: the Dispatcher calls this
/// synchronously on the empty-work short-circuit (§4.D step 9), and the
/// Executor calls it after every successful task (§4.E step 9).
#[async_trait]
pub trait ReconcileTrigger: Send + Sync {
    async fn reconcile(&self, key: &RequestKey) -> OrchestratorResult<()>;
}
