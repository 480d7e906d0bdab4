use orchestrator_core::{EventType, Source};
use serde::{Deserialize, Serialize};

/// Which provider a [`SourceControlClient`](crate::client::SourceControlClient) talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    GitHub,
    GitLab,
}

/// Uniform request descriptor produced by `parseWebhook` (§4.A).
///
/// `event_type = None` or `commit_id = None` both mean "skip" downstream:
/// an unsupported event kind, or a pull-request action outside
/// `{opened, synchronize, reopened}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub source: Source,
    pub web_url: String,
    pub repo_url: String,
    pub project_id: String,
    pub project_name: String,
    pub private_token: String,
    pub event_type: Option<EventType>,
    pub target_branch: String,
    pub commit_id: Option<String>,
    pub previous_commit_id: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub username: String,
    /// GitHub pull-request metadata, captured only for `merge` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_title: Option<String>,
}

impl RequestDescriptor {
    /// True when this descriptor should not proceed past Ingress.
    pub fn is_skip(&self) -> bool {
        self.event_type.is_none() || self.commit_id.is_none()
    }
}

/// Normalises a `ref` of the form `refs/heads/X` to `X`; leaves anything
/// else untouched.
pub fn normalize_ref(git_ref: &str) -> String {
    git_ref
        .strip_prefix("refs/heads/")
        .unwrap_or(git_ref)
        .to_string()
}

/// Opaque, authenticated handle to a resolved repository, returned by
/// `initContext`.
#[derive(Debug, Clone)]
pub struct RepoHandle {
    pub project_id: String,
    pub project_name: String,
    pub default_branch: Option<String>,
}

/// A PR/MR number accepted in either integer or all-digit-string form
/// (Testable Property 10).
#[derive(Debug, Clone)]
pub enum PrNumber {
    Int(u64),
    Text(String),
}

impl PrNumber {
    /// Resolves to a numeric id, or `None` if the text form is not all-digit.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            PrNumber::Int(n) => Some(*n),
            PrNumber::Text(s) => s.parse().ok(),
        }
    }
}
