//! Static model table (§4.E / `model_config.py`): maps a rule's `model`
//! string to the Bedrock model id plus the invocation knobs that differ
//! per model generation.

/// How a model restricts sampling parameters on the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRestriction {
    /// No restriction: both `temperature` and `top_p` may be set.
    None,
    /// Claude 4.5 family: only `temperature` may be set, `top_p` is omitted.
    TemperatureOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct ModelConfig {
    pub model_id: &'static str,
    pub supports_reasoning: bool,
    pub version: &'static str,
    pub timeout_secs: u64,
    pub param_restriction: ParamRestriction,
}

const TABLE: &[(&str, ModelConfig)] = &[
    (
        "claude3.7-sonnet",
        ModelConfig {
            model_id: "us.anthropic.claude-3-7-sonnet-20250219-v1:0",
            supports_reasoning: true,
            version: "3.7",
            timeout_secs: 900,
            param_restriction: ParamRestriction::None,
        },
    ),
    (
        "claude4-opus",
        ModelConfig {
            model_id: "us.anthropic.claude-opus-4-20250514-v1:0",
            supports_reasoning: true,
            version: "4",
            timeout_secs: 900,
            param_restriction: ParamRestriction::None,
        },
    ),
    (
        "claude4-opus-4.1",
        ModelConfig {
            model_id: "us.anthropic.claude-opus-4-1-20250805-v1:0",
            supports_reasoning: true,
            version: "4.1",
            timeout_secs: 900,
            param_restriction: ParamRestriction::None,
        },
    ),
    (
        "claude4-sonnet",
        ModelConfig {
            model_id: "us.anthropic.claude-sonnet-4-20250514-v1:0",
            supports_reasoning: true,
            version: "4",
            timeout_secs: 900,
            param_restriction: ParamRestriction::None,
        },
    ),
    (
        "claude4.5-sonnet",
        ModelConfig {
            model_id: "us.anthropic.claude-sonnet-4-5-20250929-v1:0",
            supports_reasoning: true,
            version: "4.5",
            timeout_secs: 900,
            param_restriction: ParamRestriction::TemperatureOnly,
        },
    ),
    (
        "claude4.5-haiku",
        ModelConfig {
            model_id: "us.anthropic.claude-haiku-4-5-20251001-v1:0",
            supports_reasoning: true,
            version: "4.5",
            timeout_secs: 900,
            param_restriction: ParamRestriction::TemperatureOnly,
        },
    ),
    (
        "claude3.5-sonnet",
        ModelConfig {
            model_id: "anthropic.claude-3-5-sonnet-20240620-v1:0",
            supports_reasoning: false,
            version: "3.5",
            timeout_secs: 120,
            param_restriction: ParamRestriction::None,
        },
    ),
    (
        "claude3-opus",
        ModelConfig {
            model_id: "anthropic.claude-3-opus-20240229-v1:0",
            supports_reasoning: false,
            version: "3",
            timeout_secs: 120,
            param_restriction: ParamRestriction::None,
        },
    ),
    (
        "claude3-sonnet",
        ModelConfig {
            model_id: "anthropic.claude-3-sonnet-20240229-v1:0",
            supports_reasoning: false,
            version: "3",
            timeout_secs: 120,
            param_restriction: ParamRestriction::None,
        },
    ),
    (
        "claude3-haiku",
        ModelConfig {
            model_id: "anthropic.claude-3-haiku-20240307-v1:0",
            supports_reasoning: false,
            version: "3",
            timeout_secs: 120,
            param_restriction: ParamRestriction::None,
        },
    ),
    (
        "claude3",
        ModelConfig {
            model_id: "anthropic.claude-3-sonnet-20240229-v1:0",
            supports_reasoning: false,
            version: "3",
            timeout_secs: 120,
            param_restriction: ParamRestriction::None,
        },
    ),
];

/// Looks up a model's static configuration by its rule-facing name
/// (e.g. `"claude4.5-sonnet"`), case-sensitive as the source table is.
pub fn get_model_config(model: &str) -> Option<ModelConfig> {
    TABLE.iter().find(|(name, _)| *name == model).map(|(_, c)| *c)
}

/// True for any model name the Dispatcher/Executor are willing to invoke
/// (§4.D: "Rules whose model does not start with claude3/claude4 produce
/// no task"). The documented prefix contract, not the source's narrower
/// literal `startswith('claude3')` (see DESIGN.md Open Question 1).
pub fn is_invokable_model(model: &str) -> bool {
    model.starts_with("claude3") || model.starts_with("claude4")
}

pub fn all_model_names() -> Vec<&'static str> {
    TABLE.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_known_model() {
        let cfg = get_model_config("claude4.5-haiku").unwrap();
        assert_eq!(cfg.param_restriction, ParamRestriction::TemperatureOnly);
        assert!(cfg.supports_reasoning);
    }

    #[test]
    fn unknown_model_is_none() {
        assert!(get_model_config("gpt-4").is_none());
    }

    #[test]
    fn invokable_gate_accepts_claude3_and_claude4_prefixes() {
        assert!(is_invokable_model("claude3-sonnet"));
        assert!(is_invokable_model("claude4.5-sonnet"));
        assert!(!is_invokable_model("gpt-4"));
    }
}
