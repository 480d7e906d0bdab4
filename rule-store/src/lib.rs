//! Rule Store (§4.B): baseline rules cached for the process lifetime, plus
//! per-request rules either read from the repository or synthesised from a
//! web-tool trigger, filtered to the ones that actually apply.

pub mod baseline;
pub mod resolve;

use orchestrator_core::{Mode, RawRule, Rule, WebToolTrigger};
use source_control::{RepoHandle, SourceControlClient};
use tracing::info;

fn webtool_rule(trigger: &WebToolTrigger) -> Rule {
    Rule {
        name: trigger.rule_name.clone(),
        event: trigger.event_type.clone(),
        branch: trigger.target_branch.clone(),
        mode: Mode::parse(&trigger.mode).unwrap_or(Mode::All),
        model: trigger.model.clone(),
        target: trigger.target.clone().unwrap_or_default(),
        confirm: trigger.confirm.then(|| trigger.confirm_prompt.clone()).flatten(),
        order: Vec::new(),
        system: None,
        prompt_system: Some(trigger.prompt_system.clone()),
        prompt_user: Some(trigger.prompt_user.clone()),
        enable_reasoning: false,
        diy: Default::default(),
    }
}

/// Mirrors `load_rules`: baseline rules plus either a synthesised web-tool
/// rule or the repository's `.codereview/*.yaml` rules, resolved to typed
/// [`Rule`]s (malformed entries are skipped with a warning by
/// [`resolve::resolve_rule`]).
pub async fn load_rules(
    trigger: Option<&WebToolTrigger>,
    client: Option<(&SourceControlClient, &RepoHandle, &str, &str)>,
    default_mode: Mode,
) -> Vec<Rule> {
    let base_raw = baseline::load_base_rules();
    let mut rules: Vec<Rule> = base_raw
        .iter()
        .filter_map(|raw| resolve::resolve_rule(raw, default_mode, "baseline"))
        .collect();

    if let Some(trigger) = trigger {
        rules.push(webtool_rule(trigger));
        info!(rule_count = rules.len(), "loaded rules for webtool invoker");
        return rules;
    }

    if let Some((client, handle, commit, branch)) = client {
        let repo_raw: Vec<RawRule> = client
            .get_rules(handle, commit, branch)
            .await
            .unwrap_or_default();
        let repo_count = repo_raw.len();
        let mut repo_rules: Vec<Rule> = repo_raw
            .iter()
            .filter_map(|raw| resolve::resolve_rule(raw, default_mode, "repo"))
            .collect();
        rules.append(&mut repo_rules);
        info!(base_rules = base_raw.len(), repo_rules = repo_count, "loaded rules for webhook invoker");
    }

    rules
}

/// Retains only rules matching the request's branch and event exactly
/// (no globbing).
pub fn filter_rules(rules: Vec<Rule>, target_branch: &str, event_type: &str) -> Vec<Rule> {
    rules
        .into_iter()
        .filter(|r| r.branch == target_branch && r.event == event_type)
        .collect()
}
