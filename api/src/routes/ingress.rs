//! POST ingress (§4.A / §6): the one endpoint platform webhooks and the
//! on-demand web-tool both call. Generates the `request_id`, normalises the
//! payload into a [`RequestDescriptor`], and returns `{request_id, commit_id}`
//! immediately — every downstream step (Dispatcher, Executor, Reconciler)
//! runs in a detached task, exactly as the real deployment's async Lambda
//! invocation would.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use dispatcher::{DispatchRequest, DispatchSource};
use orchestrator_core::model::{EventType, Source, WebToolTrigger};
use orchestrator_core::ports::RequestKey;
use orchestrator_core::{OrchestratorError, RequestRecord, ZERO_COMMIT};
use serde::Serialize;
use serde_json::Value;
use source_control::{ProviderKind, RequestDescriptor, SourceControlClient};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IngressResponse {
    pub request_id: String,
    pub commit_id: String,
}

fn provider_kind(source: Source) -> ProviderKind {
    match source {
        Source::GitHub => ProviderKind::GitHub,
        Source::GitLab => ProviderKind::GitLab,
    }
}

fn sc_error(e: source_control::Error) -> AppError {
    AppError::from(OrchestratorError::from(e))
}

/// Builds a [`RequestDescriptor`]/[`WebToolTrigger`] pair from a web-tool
/// trigger body, grounded on the Python source's
/// `parse_github_webtool_parameters`: the caller supplies a fully-formed
/// rule directly rather than it being read from the repository.
pub(crate) fn parse_webtool(body: &Value, configured_token: &str) -> AppResult<(RequestDescriptor, WebToolTrigger)> {
    let get_str = |k: &str| body.get(k).and_then(|v| v.as_str()).map(str::to_string);
    let missing = |field: &str| AppError::Validation(format!("webtool trigger missing `{field}`"));

    let project_id = get_str("project_id")
        .or_else(|| get_str("full_name"))
        .or_else(|| get_str("path_with_namespace"))
        .ok_or_else(|| missing("project_id"))?;
    let source = match get_str("source").as_deref() {
        Some("gitlab") => Source::GitLab,
        _ => Source::GitHub,
    };
    let target_branch = get_str("target_branch").ok_or_else(|| missing("target_branch"))?;
    let commit_id = get_str("commit_id").ok_or_else(|| missing("commit_id"))?;
    let previous_commit_id = get_str("previous_commit_id").unwrap_or_else(|| ZERO_COMMIT.to_string());
    let private_token = get_str("private_token").unwrap_or_else(|| configured_token.to_string());
    let web_url = get_str("web_url").unwrap_or_default();
    let repo_url = get_str("repo_url").unwrap_or_else(|| web_url.clone());
    let git_ref = get_str("ref").unwrap_or_else(|| target_branch.clone());
    let raw_event_type = get_str("event_type").unwrap_or_else(|| "push".to_string());
    let event_type = match raw_event_type.as_str() {
        "merge" | "pull_request" => EventType::Merge,
        _ => EventType::Push,
    };

    let descriptor = RequestDescriptor {
        source,
        web_url,
        repo_url,
        project_id: project_id.clone(),
        project_name: get_str("project_name").unwrap_or_else(|| "Test Project".to_string()),
        private_token: private_token.clone(),
        event_type: Some(event_type),
        target_branch: target_branch.clone(),
        commit_id: Some(commit_id.clone()),
        previous_commit_id,
        git_ref,
        username: "mock".to_string(),
        pr_number: None,
        pr_url: None,
        pr_title: None,
    };

    let trigger = WebToolTrigger {
        rule_name: get_str("rule_name").unwrap_or_else(|| "webtool".to_string()),
        mode: get_str("mode").unwrap_or_else(|| "all".to_string()),
        model: get_str("model").ok_or_else(|| missing("model"))?,
        event_type: raw_event_type,
        target_branch,
        commit_id,
        private_token,
        prompt_system: get_str("prompt_system").unwrap_or_default(),
        prompt_user: get_str("prompt_user").unwrap_or_default(),
        target: get_str("target"),
        confirm: body.get("confirm").and_then(|v| v.as_bool()).unwrap_or(false),
        confirm_prompt: get_str("confirm_prompt"),
    };

    Ok((descriptor, trigger))
}

fn parse_platform_event(headers: &HeaderMap, body: &Value, configured_token: &str) -> AppResult<RequestDescriptor> {
    if let Some(event) = headers.get("X-GitHub-Event").and_then(|v| v.to_str().ok()) {
        return source_control::parse_github(event, body, configured_token).map_err(sc_error);
    }
    if let Some(event) = headers.get("X-Gitlab-Event").and_then(|v| v.to_str().ok()) {
        let token_header = headers.get("X-Gitlab-Token").and_then(|v| v.to_str().ok());
        return source_control::parse_gitlab(event, body, token_header, configured_token).map_err(sc_error);
    }
    Err(AppError::Validation(
        "missing X-GitHub-Event or X-Gitlab-Event header".into(),
    ))
}

/// Runs the Dispatcher in a detached task; per-item errors are the
/// Dispatcher's own concern (it warns and continues), so a dispatch-level
/// error here only means the request never got off the ground and is
/// logged, not surfaced — Ingress has already answered the caller.
pub(crate) fn spawn_dispatch(state: Arc<AppState>, request_id: String, descriptor: RequestDescriptor, source: DispatchSource, context: Value) {
    tokio::spawn(async move {
        let kind = provider_kind(descriptor.source);
        let token = if !descriptor.private_token.is_empty() {
            descriptor.private_token.clone()
        } else {
            state.config.access_token.clone()
        };
        let sc_client = SourceControlClient::new(kind, &state.sc_config, token);
        let default_mode = state.default_mode;
        let req = DispatchRequest {
            request_id: request_id.clone(),
            descriptor,
            source,
            context,
        };
        if let Err(e) = dispatcher::dispatch(
            req,
            &sc_client,
            state.request_store.as_ref(),
            state.task_queue.as_ref(),
            state.reconciler.as_ref(),
            default_mode,
        )
        .await
        {
            error!(request_id = %request_id, error = %e, "dispatch failed");
        }
    });
}

/// A descriptor that fails `is_skip` before it ever reaches the Dispatcher
/// (unsupported event kind, or a pull-request action outside the supported
/// set) still needs a `RequestRecord` that resolves to `Complete` with an
/// empty report — an accepted delivery must always produce an outcome the
/// result-check endpoint can answer. Since a skip descriptor carries no
/// `commit_id`, the zero commit stands in for it.
async fn complete_skip(state: Arc<AppState>, request_id: String, descriptor: RequestDescriptor) {
    let key = RequestKey {
        commit_id: ZERO_COMMIT.to_string(),
        request_id: request_id.clone(),
    };
    let record = RequestRecord::new(
        key.commit_id.clone(),
        key.request_id.clone(),
        descriptor.source,
        descriptor.project_id.clone(),
        if descriptor.project_name.is_empty() {
            "Unknown".to_string()
        } else {
            descriptor.project_name.clone()
        },
        descriptor.repo_url.clone(),
        descriptor.event_type.unwrap_or(EventType::Push),
        descriptor.target_branch.clone(),
        descriptor.previous_commit_id.clone(),
        Utc::now(),
    );
    if let Err(e) = state.request_store.put(record).await {
        error!(request_id = %request_id, error = %e, "failed to persist skipped request");
        return;
    }
    if let Err(e) = state.request_store.init_dispatch(&key, 0).await {
        error!(request_id = %request_id, error = %e, "failed to initialise skipped request");
        return;
    }
    if let Err(e) = state.reconciler.check_and_maybe_report(&key).await {
        error!(request_id = %request_id, error = %e, "failed to reconcile skipped request");
    }
}

#[instrument(skip(state, headers, body))]
pub async fn ingress(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> AppResult<Json<IngressResponse>> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("invalid JSON body: {e}")))?;
    let request_id = Uuid::new_v4().to_string();

    let is_webtool = payload.get("invoker").and_then(|v| v.as_str()) == Some("webtool");

    if is_webtool {
        let (descriptor, trigger) = parse_webtool(&payload, &state.config.access_token)?;
        let commit_id = descriptor.commit_id.clone().expect("webtool descriptor always carries a commit_id");
        spawn_dispatch(
            Arc::clone(&state),
            request_id.clone(),
            descriptor,
            DispatchSource::WebTool(trigger),
            payload,
        );
        return Ok(Json(IngressResponse { request_id, commit_id }));
    }

    let descriptor = parse_platform_event(&headers, &payload, &state.config.access_token)?;

    if descriptor.is_skip() {
        let commit_id = ZERO_COMMIT.to_string();
        tokio::spawn(complete_skip(Arc::clone(&state), request_id.clone(), descriptor));
        return Ok(Json(IngressResponse { request_id, commit_id }));
    }

    let commit_id = descriptor.commit_id.clone().expect("non-skip descriptor carries a commit_id");
    spawn_dispatch(Arc::clone(&state), request_id.clone(), descriptor, DispatchSource::Webhook, payload);
    Ok(Json(IngressResponse { request_id, commit_id }))
}
