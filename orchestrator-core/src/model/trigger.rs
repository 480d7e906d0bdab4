use serde::{Deserialize, Serialize};

/// On-demand Ingress payload (`invoker = "webtool"`): the caller supplies a
/// fully-formed rule directly instead of it being read from the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebToolTrigger {
    pub rule_name: String,
    pub mode: String,
    pub model: String,
    /// Not part of the minimal wire contract but required so the
    /// synthesised rule still passes the branch/event filter (§4.B)
    /// downstream of rule loading, same as a repo-sourced rule would.
    #[serde(default)]
    pub event_type: String,
    pub target_branch: String,
    pub commit_id: String,
    pub private_token: String,
    pub prompt_system: String,
    pub prompt_user: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub confirm: bool,
    #[serde(default)]
    pub confirm_prompt: Option<String>,
}
