//! Dispatcher (§4.D): the Lambda-style handler invoked asynchronously from
//! Ingress. Validates the event, resolves rules, builds work items through
//! the Content Builder, persists the `Initializing` transition, and enqueues
//! one `TaskMessage` per work item — or, when there is no work at all,
//! short-circuits straight to the Reconciler so every accepted request still
//! produces a report.

pub mod errors;
pub mod message;
pub mod prompt;
pub mod vars;

use std::collections::HashMap;

use chrono::Utc;
use orchestrator_core::model::TaskMessage;
use orchestrator_core::ports::{RequestKey, RequestStore, TaskQueue};
use orchestrator_core::{Mode, ReconcileTrigger, RequestRecord, WebToolTrigger, ZERO_COMMIT};
use source_control::{RequestDescriptor, SourceControlClient};
use tracing::{info, instrument, warn};

pub use errors::{DispatchError, DispatchResult};
pub use message::{decode_task_message, encode_task_message};

/// How this dispatch was triggered; carries the web-tool's synthesised rule
/// inputs when applicable (§4.B's `loadRules` branches on exactly this).
pub enum DispatchSource {
    Webhook,
    WebTool(WebToolTrigger),
}

pub struct DispatchRequest {
    pub request_id: String,
    pub descriptor: RequestDescriptor,
    pub source: DispatchSource,
    /// The original normalised event, carried through on every `TaskMessage`.
    pub context: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub request_id: String,
    pub commit_id: String,
    pub task_total: u32,
}

fn event_type_str(event: orchestrator_core::EventType) -> &'static str {
    match event {
        orchestrator_core::EventType::Push => "push",
        orchestrator_core::EventType::Merge => "merge",
    }
}

fn mode_str(mode: Mode) -> &'static str {
    match mode {
        Mode::All => "all",
        Mode::Single => "single",
        Mode::Diff => "diff",
    }
}

fn variable_map(descriptor: &RequestDescriptor, request_id: &str, commit_id: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("project_name".to_string(), descriptor.project_name.clone());
    vars.insert("project_id".to_string(), descriptor.project_id.clone());
    vars.insert("repo_url".to_string(), descriptor.repo_url.clone());
    vars.insert("branch".to_string(), descriptor.target_branch.clone());
    vars.insert("commit_id".to_string(), commit_id.to_string());
    vars.insert("username".to_string(), descriptor.username.clone());
    vars.insert("request_id".to_string(), request_id.to_string());
    vars
}

/// Runs the full Dispatcher algorithm (§4.D, steps 1-9).
#[instrument(skip(req, sc_client, request_store, task_queue, reconciler), fields(request_id = %req.request_id))]
pub async fn dispatch(
    req: DispatchRequest,
    sc_client: &SourceControlClient,
    request_store: &dyn RequestStore,
    task_queue: &dyn TaskQueue,
    reconciler: &dyn ReconcileTrigger,
    default_mode: Mode,
) -> DispatchResult<DispatchOutcome> {
    // 1. Validate event.
    if req.request_id.trim().is_empty() {
        return Err(DispatchError::Validation("missing request_id".into()));
    }
    let descriptor = req.descriptor;
    if descriptor.is_skip() {
        return Err(DispatchError::Validation("event carries no event_type/commit_id to act on".into()));
    }
    let commit_id_raw = descriptor.commit_id.clone().unwrap();
    let event_type = descriptor.event_type.unwrap();

    // 2. Init repo context; canonicalise commit ids.
    let handle = sc_client.init_context(&descriptor.project_id).await?;
    let commit_id = sc_client
        .format_commit_id(&handle, &descriptor.target_branch, &commit_id_raw)
        .await?;
    let previous_commit_id = if descriptor.previous_commit_id.is_empty() || descriptor.previous_commit_id == ZERO_COMMIT {
        descriptor.previous_commit_id.clone()
    } else {
        sc_client
            .format_commit_id(&handle, &descriptor.target_branch, &descriptor.previous_commit_id)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to canonicalise previous_commit_id, using raw value");
                descriptor.previous_commit_id.clone()
            })
    };

    let key = RequestKey {
        commit_id: commit_id.clone(),
        request_id: req.request_id.clone(),
    };

    if request_store.get(&key).await?.is_none() {
        let mut record = RequestRecord::new(
            commit_id.clone(),
            req.request_id.clone(),
            descriptor.source,
            descriptor.project_id.clone(),
            descriptor.project_name.clone(),
            descriptor.repo_url.clone(),
            event_type,
            descriptor.target_branch.clone(),
            previous_commit_id.clone(),
            Utc::now(),
        );
        record.pr.pr_number = descriptor.pr_number;
        record.pr.pr_url = descriptor.pr_url.clone();
        record.pr.pr_title = descriptor.pr_title.clone();
        request_store.put(record).await?;
    }

    // 3. Best-effort project-name patch.
    if !handle.project_name.is_empty() && handle.project_name != descriptor.project_name {
        if let Err(e) = request_store.patch_project_name(&key, &handle.project_name).await {
            warn!(error = %e, "failed to patch project_name, continuing");
        }
    }

    // 4. Load + filter rules.
    let trigger = match &req.source {
        DispatchSource::WebTool(t) => Some(t),
        DispatchSource::Webhook => None,
    };
    let rules = rule_store::load_rules(
        trigger,
        Some((sc_client, &handle, &commit_id, &descriptor.target_branch)),
        default_mode,
    )
    .await;
    let filtered = rule_store::filter_rules(rules, &descriptor.target_branch, event_type_str(event_type));

    // 5. Content Builder per rule.
    let mut items = Vec::new();
    for rule in &filtered {
        match content_builder::build_work_items(sc_client, &handle, &commit_id, &previous_commit_id, rule).await {
            Ok(mut built) => items.append(&mut built),
            Err(e) => warn!(rule = %rule.name, error = %e, "content builder failed for rule, skipping"),
        }
    }

    // 6. Initializing transition.
    request_store.init_dispatch(&key, items.len() as u32).await?;

    if items.is_empty() {
        // 9. Empty-work short-circuit.
        info!("no work items produced, reconciling empty request directly");
        reconciler.reconcile(&key).await.map_err(DispatchError::Core)?;
        return Ok(DispatchOutcome {
            request_id: req.request_id,
            commit_id,
            task_total: 0,
        });
    }

    // 7/8. Build + enqueue one TaskMessage per item, dense numbering from 1.
    let vars = variable_map(&descriptor, &req.request_id, &commit_id);
    let mut dispatched = 0u32;
    for (idx, item) in items.iter().enumerate() {
        let number = (idx + 1) as u32;
        let rule = &item.rule;
        let Some((prompt_system, prompt_user)) = prompt::build_prompt_pair(rule, item, &vars) else {
            continue;
        };
        let confirm_prompt = prompt::build_confirm_prompt(rule, &vars);
        let mode = mode_str(item.mode);
        let identity = TaskMessage::build_identity(mode, &rule.model, number, &rule.name, &item.filepath);

        let message = TaskMessage {
            context: req.context.clone(),
            commit_id: commit_id.clone(),
            request_id: req.request_id.clone(),
            number,
            mode: mode.to_string(),
            model: rule.model.clone(),
            identity,
            filepath: item.filepath.clone(),
            rule_name: rule.name.clone(),
            prompt_system,
            prompt_user,
            confirm_prompt,
            enable_reasoning: rule.enable_reasoning,
        };

        match task_queue.send(message).await {
            Ok(()) => dispatched += 1,
            Err(e) => {
                warn!(number, error = %e, "failed to enqueue task, recording as failure");
                if let Err(e2) = request_store.incr_failure(&key).await {
                    warn!(error = %e2, "failed to record enqueue failure");
                }
            }
        }
    }

    info!(task_total = items.len(), dispatched, "dispatch complete");

    Ok(DispatchOutcome {
        request_id: req.request_id,
        commit_id,
        task_total: items.len() as u32,
    })
}
