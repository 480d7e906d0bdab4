//! Splits a [`RawRule`]'s free-form YAML map into the typed [`Rule`],
//! separating reserved metadata from DIY prompt fields (§3).

use std::collections::BTreeMap;

use orchestrator_core::{Mode, RESERVED_RULE_FIELDS, RawRule, Rule};
use serde_yml::Value;
use tracing::warn;

fn value_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => serde_yml::to_string(other).ok().map(|s| s.trim().to_string()),
    }
}

fn get_str(map: &serde_yml::Mapping, key: &str) -> Option<String> {
    map.get(key).and_then(value_to_string)
}

fn get_str_list(map: &serde_yml::Mapping, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Sequence(items)) => items.iter().filter_map(value_to_string).collect(),
        Some(other) => value_to_string(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn get_bool(map: &serde_yml::Mapping, key: &str) -> bool {
    matches!(map.get(key), Some(Value::Bool(true)))
}

/// Resolves a raw YAML mapping into a [`Rule`], skipping it with a warning
/// when it is missing a required field (`name`, `event`, `branch`, `model`).
///
/// `default_mode` backs an absent/unparsable `mode` field.
pub fn resolve_rule(raw: &RawRule, default_mode: Mode, source: &str) -> Option<Rule> {
    let map = &raw.0;

    let name = get_str(map, "name")?;
    let event = get_str(map, "event")?;
    let branch = get_str(map, "branch")?;
    let model = match get_str(map, "model") {
        Some(m) => m,
        None => {
            warn!(%source, rule = %name, "rule missing 'model', skipping");
            return None;
        }
    };

    let mode = get_str(map, "mode")
        .and_then(|m| Mode::parse(&m))
        .unwrap_or(default_mode);

    let target = get_str(map, "target").unwrap_or_default();
    let confirm = get_str(map, "confirm");
    let order = get_str_list(map, "order");
    let system = get_str(map, "system");
    let prompt_system = get_str(map, "prompt_system").or_else(|| system.clone());
    let prompt_user = get_str(map, "prompt_user");
    let enable_reasoning = get_bool(map, "enable_reasoning");

    let mut diy = BTreeMap::new();
    for (k, v) in map.iter() {
        let Some(key) = k.as_str() else { continue };
        if RESERVED_RULE_FIELDS.contains(&key) || key == "prompt_system" || key == "prompt_user" {
            continue;
        }
        if let Some(s) = value_to_string(v) {
            diy.insert(key.to_string(), s);
        }
    }

    Some(Rule {
        name,
        event,
        branch,
        mode,
        model,
        target,
        confirm,
        order,
        system,
        prompt_system,
        prompt_user,
        enable_reasoning,
        diy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping_from(yaml: &str) -> RawRule {
        let v: Value = serde_yml::from_str(yaml).unwrap();
        RawRule(v.as_mapping().unwrap().clone())
    }

    #[test]
    fn repo_rule_uses_system_as_prompt_system_and_collects_diy_fields() {
        let raw = mapping_from(
            "name: lint\nevent: push\nbranch: main\nmodel: claude3-sonnet\nsystem: be terse\norder: [b, a]\na: A text\nb: B text\n",
        );
        let rule = resolve_rule(&raw, Mode::All, "test").unwrap();
        assert_eq!(rule.prompt_system.as_deref(), Some("be terse"));
        assert!(rule.prompt_user.is_none());
        assert_eq!(rule.ordered_diy_values(), vec!["B text", "A text"]);
    }

    #[test]
    fn missing_model_is_skipped() {
        let raw = mapping_from("name: lint\nevent: push\nbranch: main\n");
        assert!(resolve_rule(&raw, Mode::All, "test").is_none());
    }
}
