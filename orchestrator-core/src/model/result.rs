use serde::{Deserialize, Serialize};

/// One finding emitted by the model inside its `<output>` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
}

/// Blob persisted at `result/{request_id}/{number}.json`: the Executor's
/// full per-task payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultObject {
    pub rule: String,
    pub model: String,
    pub content: Vec<Finding>,
    pub prompt_system: String,
    /// Alternating user turns sent across the retry/rectifier/confirm rounds.
    pub prompt_user: Vec<String>,
    /// Exact request body sent to the LLM on the final successful round.
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub timecost_secs: f64,
}
