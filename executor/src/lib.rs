//! Executor (§4.E): decodes one queue message, drives the LLM through its
//! retry/rectifier loop, persists the result, and hands off to the
//! Reconciler. The Python source recurses on parse failure; this rewrites
//! that as a bounded loop with an explicit `retry` counter (§9).

pub mod backoff;
pub mod errors;
pub mod extract;

use chrono::Utc;
use dispatcher::decode_task_message;
use llm_client::{InvokeParams, LlmClient};
use orchestrator_core::model::{Finding, ResultObject, TaskRecord};
use orchestrator_core::ports::{BlobStore, ReconcileTrigger, RequestKey, RequestStore, TaskStore};
use tracing::{info, instrument, warn};

pub use errors::{ExecutorError, ExecutorResult};

/// Fixed follow-up turn asking the model to re-emit a valid `<output>` block.
const RECTIFIER_PROMPT: &str =
    "Your previous reply did not contain a valid <output>...</output> JSON block. \
     Re-emit your findings strictly as a JSON object or array of objects, \
     wrapped in <output></output> tags, and nothing else.";

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub sqs_base_delay_secs: u64,
    pub sqs_max_delay_secs: u64,
    pub sqs_max_retries: u32,
    pub max_token_to_sample: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            sqs_base_delay_secs: 60,
            sqs_max_delay_secs: 300,
            sqs_max_retries: 5,
            max_token_to_sample: 10_000,
            temperature: 0.0,
            top_p: 1.0,
        }
    }
}

fn require_nonempty(value: &str, field: &str) -> ExecutorResult<()> {
    if value.is_empty() {
        return Err(ExecutorError::Validation(format!("task message missing {field}")));
    }
    Ok(())
}

/// Runs one task message end to end (§4.E steps 1-9).
#[instrument(skip_all)]
pub async fn execute_task_message(
    encoded: &str,
    config: &ExecutorConfig,
    llm: &dyn LlmClient,
    task_store: &dyn TaskStore,
    blob_store: &dyn BlobStore,
    request_store: &dyn RequestStore,
    reconciler: &dyn ReconcileTrigger,
) -> ExecutorResult<()> {
    // 1. Decode + validate.
    let msg = decode_task_message(encoded)?;
    require_nonempty(&msg.commit_id, "commit_id")?;
    require_nonempty(&msg.mode, "mode")?;
    require_nonempty(&msg.model, "model")?;
    require_nonempty(&msg.rule_name, "rule_name")?;
    require_nonempty(&msg.prompt_system, "prompt_system")?;
    require_nonempty(&msg.prompt_user, "prompt_user")?;

    // 2. Create the TaskRecord up front, in-flight (`succ` absent).
    let now = Utc::now();
    let mut task = TaskRecord::new(msg.request_id.clone(), msg.number, msg.mode.clone(), msg.model.clone(), now);
    task_store.put(task.clone()).await?;

    let key = RequestKey {
        commit_id: msg.commit_id.clone(),
        request_id: msg.request_id.clone(),
    };

    // 3. Conversation state.
    let mut turns = vec![msg.prompt_user.clone()];
    let mut retry = 0u32;
    let start_time = Utc::now();
    let mut final_payload = serde_json::Value::Null;

    // 4/5. Invoke, extract, rectify-and-retry loop.
    let first_round: Result<Vec<Finding>, Vec<String>> = loop {
        let invoked = llm
            .invoke(InvokeParams {
                model: &msg.model,
                system: Some(&msg.prompt_system),
                turns: &turns,
                max_tokens: config.max_token_to_sample,
                temperature: config.temperature,
                top_p: config.top_p,
                enable_reasoning: msg.enable_reasoning,
                reasoning_budget: config.max_token_to_sample,
            })
            .await;

        let outcome = match invoked {
            Ok(outcome) => outcome,
            Err(e) => {
                retry += 1;
                task.retry_times = retry;
                task.update_time = Utc::now();
                task_store.put(task.clone()).await?;
                if retry >= config.sqs_max_retries {
                    break Err(vec![e.to_string()]);
                }
                let delay = backoff::backoff_delay(retry, config.sqs_base_delay_secs, config.sqs_max_delay_secs);
                warn!(error = %e, retry, delay_secs = delay.as_secs(), "llm invocation failed, backing off");
                tokio::time::sleep(delay).await;
                continue;
            }
        };

        final_payload = outcome.request_body.clone();

        match extract::extract_findings(&outcome.reply.text) {
            extract::ExtractOutcome::Findings(findings) => break Ok(findings),
            extract::ExtractOutcome::NeedsRectify => {
                retry += 1;
                task.retry_times = retry;
                task.update_time = Utc::now();
                task_store.put(task.clone()).await?;
                if retry >= config.sqs_max_retries {
                    break Err(vec!["exhausted retries without a valid <output> block".to_string()]);
                }
                turns.push(outcome.reply.text);
                turns.push(RECTIFIER_PROMPT.to_string());
            }
        }
    };

    let mut findings = match first_round {
        Ok(f) => f,
        Err(error_history) => {
            task.succ = Some(false);
            task.message = Some(serde_json::to_string(&error_history).unwrap_or_default());
            task.update_time = Utc::now();
            task_store.put(task.clone()).await?;
            request_store.incr_failure(&key).await?;
            warn!(identity = %msg.identity, "task exhausted retry budget");
            let _ = reconciler.reconcile(&key).await;
            return Err(ExecutorError::RetryExhausted(msg.identity.clone()));
        }
    };

    // 6. Optional confirmation round, overwriting (not appending to) content.
    let mut reasoning = None;
    if let Some(confirm_prompt) = &msg.confirm_prompt {
        turns.push(confirm_prompt.clone());
        match llm
            .invoke(InvokeParams {
                model: &msg.model,
                system: Some(&msg.prompt_system),
                turns: &turns,
                max_tokens: config.max_token_to_sample,
                temperature: config.temperature,
                top_p: config.top_p,
                enable_reasoning: msg.enable_reasoning,
                reasoning_budget: config.max_token_to_sample,
            })
            .await
        {
            Ok(outcome) => {
                final_payload = outcome.request_body.clone();
                reasoning = outcome.reply.reasoning.clone();
                if let extract::ExtractOutcome::Findings(confirmed) = extract::extract_findings(&outcome.reply.text) {
                    findings = confirmed;
                }
                turns.push(outcome.reply.text);
            }
            Err(e) => warn!(error = %e, "confirmation round failed, keeping first-round findings"),
        }
    }

    // 7. Persist result + success.
    let end_time = Utc::now();
    let timecost_secs = (end_time - start_time).num_milliseconds() as f64 / 1000.0;

    let result = ResultObject {
        rule: msg.rule_name.clone(),
        model: msg.model.clone(),
        content: findings,
        prompt_system: msg.prompt_system.clone(),
        prompt_user: turns.clone(),
        payload: final_payload,
        reasoning,
        start_time,
        end_time,
        timecost_secs,
    };

    let blob_key = format!("result/{}/{}.json", msg.request_id, msg.number);
    let bytes = serde_json::to_vec(&result)?;
    blob_store.put(&blob_key, bytes, "application/json").await?;

    task.succ = Some(true);
    task.data = Some(blob_key);
    task.bedrock_system = Some(msg.prompt_system.clone());
    task.bedrock_prompt = turns.first().cloned();
    task.bedrock_model = Some(msg.model.clone());
    task.bedrock_start_time = Some(start_time);
    task.bedrock_end_time = Some(end_time);
    task.bedrock_timecost = Some(timecost_secs);
    task.update_time = Utc::now();
    task_store.put(task).await?;

    request_store.incr_complete(&key).await?;
    info!(identity = %msg.identity, "task completed");

    // 9. Progress check.
    reconciler.reconcile(&key).await?;

    Ok(())
}
