//! The LLM-invocation transport itself is an external collaborator (§1
//! Out of scope); this is the thin seam the Executor calls through, with a
//! default HTTP implementation that talks to a Bedrock-runtime-shaped
//! endpoint the way `ai-llm-service`'s provider clients talk to
//! Ollama/ChatGPT — a bearer-style `Authorization` header built from the
//! configured credentials, not full SigV4 request signing (signing belongs
//! to the deployment's transport layer, not this crate).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::errors::{LlmError, LlmResult};
use crate::model_table::{ModelConfig, get_model_config};
use crate::request::{build_converse_body, build_invoke_body};
use crate::response::{ParsedReply, parse_converse_response, parse_invoke_response};

/// Everything one LLM call needs, already resolved from the task's
/// conversation state.
#[derive(Debug, Clone)]
pub struct InvokeParams<'a> {
    pub model: &'a str,
    pub system: Option<&'a str>,
    pub turns: &'a [String],
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub enable_reasoning: bool,
    pub reasoning_budget: u32,
}

/// One successful model turn, plus the exact request body sent (the
/// Executor persists this verbatim in the `ResultObject.payload` field).
#[derive(Debug, Clone)]
pub struct InvokeOutcome {
    pub reply: ParsedReply,
    pub request_body: Value,
    pub model_id: String,
    pub used_converse: bool,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, params: InvokeParams<'_>) -> LlmResult<InvokeOutcome>;
}

/// Default HTTP-backed client. Endpoint base and credentials come from
/// environment configuration resolved by the caller (mirrors
/// `ai-llm-service`'s `LlmModelConfig` construction from env helpers).
#[derive(Debug, Clone)]
pub struct BedrockHttpClient {
    http: Client,
    runtime_base: String,
    auth_header: Option<String>,
}

impl BedrockHttpClient {
    pub fn new(runtime_base: String, access_key: Option<String>, secret_key: Option<String>) -> Self {
        let auth_header = match (access_key, secret_key) {
            (Some(ak), Some(sk)) => Some(format!("Bearer {ak}:{sk}")),
            _ => None,
        };
        Self {
            http: Client::new(),
            runtime_base,
            auth_header,
        }
    }

    fn model_config(model: &str) -> LlmResult<ModelConfig> {
        get_model_config(model).ok_or_else(|| LlmError::UnsupportedModel(model.to_string()))
    }

    async fn post_json(&self, path: &str, body: &Value, timeout_secs: u64) -> LlmResult<Value> {
        let url = format!("{}{}", self.runtime_base, path);
        let mut req = self.http.post(url).json(body).timeout(Duration::from_secs(timeout_secs));
        if let Some(auth) = &self.auth_header {
            req = req.header("Authorization", auth);
        }
        let resp = req.send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl LlmClient for BedrockHttpClient {
    async fn invoke(&self, params: InvokeParams<'_>) -> LlmResult<InvokeOutcome> {
        let cfg = Self::model_config(params.model)?;

        if params.enable_reasoning && cfg.supports_reasoning {
            let body = build_converse_body(&cfg, params.system, params.turns, params.max_tokens, params.reasoning_budget);
            let path = format!("/model/{}/converse", cfg.model_id);
            let response_body = self.post_json(&path, &body, cfg.timeout_secs).await?;
            let reply = parse_converse_response(&response_body)?;
            Ok(InvokeOutcome {
                reply,
                request_body: body,
                model_id: cfg.model_id.to_string(),
                used_converse: true,
            })
        } else {
            let body = build_invoke_body(&cfg, params.system, params.turns, params.max_tokens, params.temperature, params.top_p);
            let path = format!("/model/{}/invoke", cfg.model_id);
            let response_body = self.post_json(&path, &body, cfg.timeout_secs).await?;
            let reply = parse_invoke_response(&response_body)?;
            Ok(InvokeOutcome {
                reply,
                request_body: body,
                model_id: cfg.model_id.to_string(),
                used_converse: false,
            })
        }
    }
}
