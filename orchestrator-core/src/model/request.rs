use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source-control platform a request originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    GitHub,
    GitLab,
}

/// Event kind normalised by the Source-control Adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Push,
    Merge,
}

/// Closed lifecycle of a `RequestRecord`, persisted as its string value to
/// preserve the wire format the downstream result-check endpoint exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Start,
    Initializing,
    Processing,
    Complete,
}

/// Optional GitHub pull-request metadata, captured at ingress time so the
/// Reconciler can post the summary comment back without re-parsing the webhook.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PrMetadata {
    pub pr_number: Option<u64>,
    pub pr_url: Option<String>,
    pub pr_title: Option<String>,
}

/// Primary key: `(commit_id, request_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    pub commit_id: String,
    pub request_id: String,
    pub source: Source,
    pub project_id: String,
    pub project_name: String,
    pub repo_url: String,
    pub event_type: EventType,
    pub target_branch: String,
    pub previous_commit_id: String,
    pub task_status: TaskStatus,
    pub task_total: u32,
    pub task_complete: u32,
    pub task_failure: u32,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_s3key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    #[serde(flatten)]
    pub pr: PrMetadata,
}

impl RequestRecord {
    /// Construct a freshly-ingressed record in state `Start`.
    pub fn new(
        commit_id: String,
        request_id: String,
        source: Source,
        project_id: String,
        project_name: String,
        repo_url: String,
        event_type: EventType,
        target_branch: String,
        previous_commit_id: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            commit_id,
            request_id,
            source,
            project_id,
            project_name,
            repo_url,
            event_type,
            target_branch,
            previous_commit_id,
            task_status: TaskStatus::Start,
            task_total: 0,
            task_complete: 0,
            task_failure: 0,
            create_time: now,
            update_time: now,
            report_s3key: None,
            report_url: None,
            pr: PrMetadata::default(),
        }
    }

    /// `(request_id, commit_id)` key tuple, as used by store implementations.
    pub fn key(&self) -> (String, String) {
        (self.commit_id.clone(), self.request_id.clone())
    }

    pub fn is_done(&self) -> bool {
        self.task_complete + self.task_failure >= self.task_total
    }
}
