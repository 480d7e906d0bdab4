//! Builds the two request shapes Bedrock's Claude models accept: the
//! standard `invoke_model` body and the `converse` body used when
//! reasoning is enabled (§4.E).

use serde_json::{Value, json};

use crate::model_table::{ModelConfig, ParamRestriction};

/// Alternates `user`/`assistant` roles over a flat list of turns, the same
/// convention `build_messages` uses in the source (even-indexed turns are
/// the reviewer's prompts, odd-indexed are the model's prior replies).
fn alternating_messages(turns: &[String], for_converse: bool) -> Vec<Value> {
    turns
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            if for_converse {
                json!({ "role": role, "content": [{ "text": text }] })
            } else {
                json!({ "role": role, "content": [{ "type": "text", "text": text }] })
            }
        })
        .collect()
}

/// Minimum reasoning token budget Bedrock accepts; below this the source
/// clamps up rather than failing the request.
pub const MIN_REASONING_BUDGET: u32 = 1024;

/// Builds the standard `invoke_model` request body.
pub fn build_invoke_body(
    model_cfg: &ModelConfig,
    system: Option<&str>,
    turns: &[String],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
) -> Value {
    let mut body = serde_json::Map::new();
    body.insert("anthropic_version".into(), json!("bedrock-2023-05-31"));
    body.insert("max_tokens".into(), json!(max_tokens));
    body.insert("messages".into(), json!(alternating_messages(turns, false)));

    if let Some(sys) = system {
        if !sys.is_empty() {
            body.insert("system".into(), json!(sys));
        }
    }

    body.insert("temperature".into(), json!(temperature));
    if model_cfg.param_restriction != ParamRestriction::TemperatureOnly {
        body.insert("top_p".into(), json!(top_p));
    }

    Value::Object(body)
}

/// Builds the `converse` request body used when reasoning is enabled.
/// Forces `temperature = 1.0` and omits `top_p`, both mandated by Bedrock
/// when `thinking` is enabled.
pub fn build_converse_body(
    model_cfg: &ModelConfig,
    system: Option<&str>,
    turns: &[String],
    max_tokens: u32,
    reasoning_budget: u32,
) -> Value {
    let budget = reasoning_budget.max(MIN_REASONING_BUDGET);

    let mut body = serde_json::Map::new();
    body.insert("modelId".into(), json!(model_cfg.model_id));
    body.insert("messages".into(), json!(alternating_messages(turns, true)));
    body.insert(
        "inferenceConfig".into(),
        json!({ "maxTokens": max_tokens, "temperature": 1.0 }),
    );
    body.insert(
        "additionalModelRequestFields".into(),
        json!({ "thinking": { "type": "enabled", "budget_tokens": budget } }),
    );
    if let Some(sys) = system {
        if !sys.is_empty() {
            body.insert("system".into(), json!([{ "text": sys }]));
        }
    }

    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_table::get_model_config;

    #[test]
    fn temperature_only_model_omits_top_p() {
        let cfg = get_model_config("claude4.5-sonnet").unwrap();
        let body = build_invoke_body(&cfg, Some("be terse"), &["hi".to_string()], 1000, 0.0, 1.0);
        assert!(body.get("top_p").is_none());
        assert_eq!(body["system"], "be terse");
    }

    #[test]
    fn unrestricted_model_keeps_top_p() {
        let cfg = get_model_config("claude3-sonnet").unwrap();
        let body = build_invoke_body(&cfg, None, &["hi".to_string()], 1000, 0.0, 1.0);
        assert_eq!(body["top_p"], 1.0);
        assert!(body.get("system").is_none());
    }

    #[test]
    fn converse_body_forces_temperature_one_and_clamps_budget() {
        let cfg = get_model_config("claude3.7-sonnet").unwrap();
        let body = build_converse_body(&cfg, None, &["hi".to_string()], 1000, 10);
        assert_eq!(body["inferenceConfig"]["temperature"], 1.0);
        assert_eq!(
            body["additionalModelRequestFields"]["thinking"]["budget_tokens"],
            MIN_REASONING_BUDGET
        );
    }

    #[test]
    fn alternates_roles_across_turns() {
        let turns = vec!["q1".to_string(), "a1".to_string(), "q2".to_string()];
        let msgs = alternating_messages(&turns, false);
        assert_eq!(msgs[0]["role"], "user");
        assert_eq!(msgs[1]["role"], "assistant");
        assert_eq!(msgs[2]["role"], "user");
    }
}
