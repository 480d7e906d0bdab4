//! GET result-check (§6): polls a request's progress and, once every task
//! has landed, its report URL. Grounded on the Python source's
//! `result_checker.py` — including its behaviour of never failing the HTTP
//! response itself; any internal error comes back as `{"succ": false, ...}`
//! with a 200, since the caller is a polling loop, not a human reading
//! status codes.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use orchestrator_core::ports::RequestKey;
use orchestrator_core::TaskStatus;
use orchestrator_core::OrchestratorResult;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResultCheckQuery {
    pub commit_id: String,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct ResultCheckResponse {
    pub succ: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub tasks: Vec<serde_json::Value>,
}

async fn build_response(state: &AppState, query: &ResultCheckQuery) -> OrchestratorResult<ResultCheckResponse> {
    let key = RequestKey {
        commit_id: query.commit_id.clone(),
        request_id: query.request_id.clone(),
    };

    let mut ready = false;
    let mut url = None;
    let mut summary = None;
    if let Some(record) = state.request_store.get(&key).await? {
        summary = Some(format!(
            "{} tasks total: {} successful, {} failed。",
            record.task_total, record.task_complete, record.task_failure
        ));
        if record.task_status == TaskStatus::Complete {
            ready = true;
            url = record.report_url.clone();
        }
    }

    let task_records = state.task_store.list_by_request(&query.request_id).await?;
    let mut tasks = Vec::with_capacity(task_records.len());
    for task in task_records {
        let number = task.number;
        let request_id = task.request_id.clone();
        let blob_key = task.data.clone();
        let mut value = serde_json::to_value(task).unwrap_or(serde_json::Value::Null);

        if let Some(blob_key) = blob_key {
            match state.blob_store.get(&blob_key).await {
                Ok(Some(bytes)) => match serde_json::from_slice::<serde_json::Value>(&bytes) {
                    Ok(s3_data) => {
                        if let Some(obj) = value.as_object_mut() {
                            obj.insert("bedrock_system".into(), s3_data.get("prompt_system").cloned().unwrap_or_default());
                            obj.insert("bedrock_prompt".into(), s3_data.get("prompt_user").cloned().unwrap_or_default());
                            obj.insert("bedrock_payload".into(), s3_data.get("payload").cloned().unwrap_or_default());
                            obj.insert("result".into(), s3_data);
                        }
                    }
                    Err(e) => {
                        warn!(blob_key, request_id, number, error = %e, "failed to parse task result blob");
                        if let Some(obj) = value.as_object_mut() {
                            obj.insert("bedrock_payload".into(), serde_json::Value::String(String::new()));
                            obj.insert("result".into(), serde_json::Value::String(String::new()));
                        }
                    }
                },
                Ok(None) => warn!(blob_key, request_id, number, "task result blob missing"),
                Err(e) => warn!(blob_key, request_id, number, error = %e, "failed to fetch task result blob"),
            }
        }
        tasks.push(value);
    }

    Ok(ResultCheckResponse {
        succ: true,
        message: None,
        ready,
        url,
        summary,
        tasks,
    })
}

#[instrument(skip(state))]
pub async fn result_check(State(state): State<Arc<AppState>>, Query(query): Query<ResultCheckQuery>) -> Json<ResultCheckResponse> {
    match build_response(&state, &query).await {
        Ok(resp) => Json(resp),
        Err(e) => Json(ResultCheckResponse {
            succ: false,
            message: Some(e.to_string()),
            ready: false,
            url: None,
            summary: None,
            tasks: Vec::new(),
        }),
    }
}
