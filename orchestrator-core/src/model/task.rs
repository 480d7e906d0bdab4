use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primary key: `(request_id, number)`. `number` is dense `1..task_total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub request_id: String,
    pub number: u32,
    pub mode: String,
    pub model: String,
    pub retry_times: u32,
    /// Absent while in-flight; `Some(true)` success, `Some(false)` exhausted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub succ: Option<bool>,
    /// Last error(s), JSON-encoded, populated on terminal failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrock_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrock_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrock_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrock_start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrock_end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrock_timecost: Option<f64>,
    /// Blob-store key of the full `ResultObject` JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl TaskRecord {
    pub fn new(request_id: String, number: u32, mode: String, model: String, now: DateTime<Utc>) -> Self {
        Self {
            request_id,
            number,
            mode,
            model,
            retry_times: 0,
            succ: None,
            message: None,
            bedrock_system: None,
            bedrock_prompt: None,
            bedrock_model: None,
            bedrock_start_time: None,
            bedrock_end_time: None,
            bedrock_timecost: None,
            data: None,
            create_time: now,
            update_time: now,
        }
    }
}
