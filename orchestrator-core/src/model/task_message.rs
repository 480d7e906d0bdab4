use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Queue payload built by the Dispatcher for each `WorkItem`, base64(JSON)-wrapped
/// on the wire (see `dispatcher::encode_task_message`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMessage {
    /// The original normalised event, carried through unmodified so the
    /// Executor/Reconciler never need to re-parse the webhook.
    pub context: Value,
    pub commit_id: String,
    pub request_id: String,
    pub number: u32,
    pub mode: String,
    pub model: String,
    /// Lowercase `"{mode}-{model}-{number}-{rule_name}-{filepath}"`.
    pub identity: String,
    pub filepath: String,
    pub rule_name: String,
    pub prompt_system: String,
    pub prompt_user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_prompt: Option<String>,
    #[serde(default)]
    pub enable_reasoning: bool,
}

impl TaskMessage {
    pub fn build_identity(mode: &str, model: &str, number: u32, rule_name: &str, filepath: &str) -> String {
        format!("{mode}-{model}-{number}-{rule_name}-{filepath}").to_lowercase()
    }
}
