use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content slice strategy a rule asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    All,
    Single,
    Diff,
}

impl Mode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(Mode::All),
            "single" => Some(Mode::Single),
            "diff" => Some(Mode::Diff),
            _ => None,
        }
    }
}

/// Keys a repo-hosted rule YAML may carry that are *not* DIY prompt fields.
pub const RESERVED_RULE_FIELDS: &[&str] = &[
    "name", "event", "mode", "model", "branch", "target", "system", "order", "confirm",
    "enable_reasoning",
];

/// A resolved review rule, either loaded from `.codereview/*.yaml` or
/// synthesised verbatim from a web-tool trigger payload.
///
/// DIY fields (arbitrary top-level keys outside [`RESERVED_RULE_FIELDS`]) are
/// kept in load order in `diy`; `order` is the explicit permutation applied
/// when the repo-flavour prompt is assembled (§4.D), with any key not listed
/// in `order` sorted after the listed ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub event: String,
    pub branch: String,
    pub mode: Mode,
    pub model: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub confirm: Option<String>,
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub prompt_system: Option<String>,
    #[serde(default)]
    pub prompt_user: Option<String>,
    /// Propagated onto the `TaskMessage`; switches the Executor's LLM call
    /// onto the converse surface when the model also supports reasoning (§4.E, §10.D).
    #[serde(default)]
    pub enable_reasoning: bool,
    /// Arbitrary non-reserved keys, insertion-ordered.
    #[serde(default)]
    pub diy: BTreeMap<String, String>,
}

impl Rule {
    /// True for web-tool-flavour rules (`prompt_user` present verbatim).
    pub fn is_web_tool_flavour(&self) -> bool {
        self.prompt_user.is_some()
    }

    /// DIY field values in prompt-assembly order: `order`-listed keys first
    /// (in the order named), then any remaining keys in their load order.
    pub fn ordered_diy_values(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::with_capacity(self.diy.len());
        for key in &self.order {
            if let Some(v) = self.diy.get(key) {
                out.push(v.as_str());
                seen.insert(key.as_str());
            }
        }
        for (key, v) in &self.diy {
            if !seen.contains(key.as_str()) {
                out.push(v.as_str());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_with_diy(order: Vec<&str>, diy: &[(&str, &str)]) -> Rule {
        Rule {
            name: "r".into(),
            event: "push".into(),
            branch: "main".into(),
            mode: Mode::Diff,
            model: "claude3-sonnet".into(),
            target: "**".into(),
            confirm: None,
            order: order.into_iter().map(String::from).collect(),
            system: Some("sys".into()),
            prompt_system: None,
            prompt_user: None,
            enable_reasoning: false,
            diy: diy.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn ordered_diy_values_follows_order_then_remaining() {
        let rule = rule_with_diy(vec!["b", "a"], &[("a", "A"), ("b", "B"), ("c", "C")]);
        assert_eq!(rule.ordered_diy_values(), vec!["B", "A", "C"]);
    }

    #[test]
    fn web_tool_flavour_detected_by_prompt_user_presence() {
        let mut rule = rule_with_diy(vec![], &[]);
        assert!(!rule.is_web_tool_flavour());
        rule.prompt_user = Some("verbatim".into());
        assert!(rule.is_web_tool_flavour());
    }
}

/// A rule as read straight off disk/repo, before DIY-field extraction.
///
/// YAML rule files are free-form maps; this carries the raw fields so the
/// Rule Store can split reserved metadata from DIY prompt fields without
/// losing unknown keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRule(pub serde_yml::Mapping);
