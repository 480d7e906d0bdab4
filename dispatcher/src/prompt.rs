//! Prompt generation (§4.D's "non-trivial heart"): builds the
//! `(prompt_system, prompt_user)` pair for one rule/work-item pair, or
//! returns `None` when the rule's model isn't an invokable claude3/claude4
//! identifier (no task is dispatched for it).

use std::collections::HashMap;

use orchestrator_core::{Rule, WorkItem};

use crate::vars::format_prompt;

/// Literal prefix the source prepends to the rendered code slice for
/// repo-flavour rules.
const CODE_PREFIX: &str = "以下是我的代码:\n";

/// `(prompt_system, prompt_user)`, both already `{{var}}`/`{{code}}`-substituted.
pub fn build_prompt_pair(rule: &Rule, item: &WorkItem, vars: &HashMap<String, String>) -> Option<(String, String)> {
    if !llm_client::is_invokable_model(&rule.model) {
        return None;
    }

    let mut vars = vars.clone();
    vars.insert("code".to_string(), item.content.clone());

    let (system_template, user_template) = if rule.is_web_tool_flavour() {
        (
            rule.prompt_system.clone().unwrap_or_default(),
            rule.prompt_user.clone().unwrap_or_default(),
        )
    } else {
        let diy_joined = rule.ordered_diy_values().join("\n\n");
        let user_template = format!("{CODE_PREFIX}{{{{code}}}}\n{diy_joined}");
        (rule.system.clone().unwrap_or_default(), user_template)
    };

    Some((
        format_prompt(&system_template, &vars),
        format_prompt(&user_template, &vars),
    ))
}

/// Builds the confirmation follow-up prompt, if the rule carries one.
pub fn build_confirm_prompt(rule: &Rule, vars: &HashMap<String, String>) -> Option<String> {
    rule.confirm.as_ref().map(|tpl| format_prompt(tpl, vars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchestrator_core::Mode;

    fn web_tool_rule() -> Rule {
        Rule {
            name: "r".into(),
            event: "push".into(),
            branch: "main".into(),
            mode: Mode::Diff,
            model: "claude3-sonnet".into(),
            target: "**".into(),
            confirm: None,
            order: vec![],
            system: None,
            prompt_system: Some("system for {{project_name}}".into()),
            prompt_user: Some("review this:\n{{code}}".into()),
            enable_reasoning: false,
            diy: Default::default(),
        }
    }

    fn repo_rule() -> Rule {
        Rule {
            name: "r".into(),
            event: "push".into(),
            branch: "main".into(),
            mode: Mode::Diff,
            model: "claude3-sonnet".into(),
            target: "**".into(),
            confirm: None,
            order: vec!["b".into(), "a".into()],
            system: Some("be terse".into()),
            prompt_system: None,
            prompt_user: None,
            enable_reasoning: false,
            diy: [("a".to_string(), "A".to_string()), ("b".to_string(), "B".to_string())].into(),
        }
    }

    fn item(content: &str) -> WorkItem {
        WorkItem {
            mode: Mode::Diff,
            filepath: "src/a.py".into(),
            content: content.into(),
            rule: web_tool_rule(),
        }
    }

    #[test]
    fn web_tool_flavour_uses_verbatim_prompts() {
        let mut vars = HashMap::new();
        vars.insert("project_name".to_string(), "acme/repo".to_string());
        let (system, user) = build_prompt_pair(&web_tool_rule(), &item("print(1)"), &vars).unwrap();
        assert_eq!(system, "system for acme/repo");
        assert_eq!(user, "review this:\nprint(1)");
    }

    #[test]
    fn repo_flavour_prefixes_code_and_orders_diy_fields() {
        let vars = HashMap::new();
        let (system, user) = build_prompt_pair(&repo_rule(), &item("print(1)"), &vars).unwrap();
        assert_eq!(system, "be terse");
        assert_eq!(user, "以下是我的代码:\nprint(1)\nB\n\nA");
    }

    #[test]
    fn non_invokable_model_yields_no_prompt() {
        let mut rule = web_tool_rule();
        rule.model = "gpt-4".into();
        assert!(build_prompt_pair(&rule, &item("x"), &HashMap::new()).is_none());
    }
}
