//! `parseWebhook` (§4.A): normalises GitHub/GitLab webhook deliveries (or
//! a web-tool trigger payload) into a uniform [`RequestDescriptor`].

use orchestrator_core::{EventType, Source};
use serde_json::Value;

use crate::errors::{Error, ScResult};
use crate::types::{RequestDescriptor, normalize_ref};

/// Pull-request actions that proceed past Ingress; anything else yields a skip descriptor.
const SUPPORTED_PR_ACTIONS: &[&str] = &["opened", "synchronize", "reopened"];

fn skip_descriptor(source: Source, target_branch: String) -> RequestDescriptor {
    RequestDescriptor {
        source,
        web_url: String::new(),
        repo_url: String::new(),
        project_id: String::new(),
        project_name: String::new(),
        private_token: String::new(),
        event_type: None,
        target_branch,
        commit_id: None,
        previous_commit_id: String::new(),
        git_ref: String::new(),
        username: String::new(),
        pr_number: None,
        pr_url: None,
        pr_title: None,
    }
}

fn get_str<'a>(v: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut cur = v;
    for key in path {
        cur = cur.get(key)?;
    }
    cur.as_str()
}

/// Parses a GitHub webhook delivery (`X-GitHub-Event` header + JSON body).
pub fn parse_github(
    event_header: &str,
    body: &Value,
    configured_token: &str,
) -> ScResult<RequestDescriptor> {
    let repo_full_name = get_str(body, &["repository", "full_name"])
        .ok_or_else(|| Error::Validation("missing repository.full_name".into()))?
        .to_string();
    let repo_name = get_str(body, &["repository", "name"])
        .unwrap_or(&repo_full_name)
        .to_string();
    let repo_url = get_str(body, &["repository", "clone_url"])
        .or_else(|| get_str(body, &["repository", "html_url"]))
        .unwrap_or_default()
        .to_string();
    let web_url = get_str(body, &["repository", "html_url"])
        .unwrap_or_default()
        .to_string();

    match event_header {
        "push" => {
            let git_ref = get_str(body, &["ref"]).unwrap_or_default().to_string();
            let target_branch = normalize_ref(&git_ref);
            let after = get_str(body, &["after"]).unwrap_or_default().to_string();
            let before = get_str(body, &["before"]).unwrap_or_default().to_string();
            let username = get_str(body, &["pusher", "name"])
                .or_else(|| get_str(body, &["sender", "login"]))
                .unwrap_or_default()
                .to_string();

            Ok(RequestDescriptor {
                source: Source::GitHub,
                web_url,
                repo_url,
                project_id: repo_full_name,
                project_name: repo_name,
                private_token: configured_token.to_string(),
                event_type: Some(EventType::Push),
                target_branch,
                commit_id: Some(after),
                previous_commit_id: before,
                git_ref,
                username,
                pr_number: None,
                pr_url: None,
                pr_title: None,
            })
        }
        "pull_request" => {
            let action = get_str(body, &["action"]).unwrap_or_default();
            let base_ref = get_str(body, &["pull_request", "base", "ref"])
                .unwrap_or_default()
                .to_string();

            if !SUPPORTED_PR_ACTIONS.contains(&action) {
                return Ok(skip_descriptor(Source::GitHub, base_ref));
            }

            let head_sha = get_str(body, &["pull_request", "head", "sha"])
                .ok_or_else(|| Error::Validation("missing pull_request.head.sha".into()))?
                .to_string();
            let base_sha = get_str(body, &["pull_request", "base", "sha"])
                .unwrap_or_default()
                .to_string();
            let username = get_str(body, &["pull_request", "user", "login"])
                .unwrap_or_default()
                .to_string();
            let pr_number = body
                .get("pull_request")
                .and_then(|p| p.get("number"))
                .and_then(|n| n.as_u64());
            let pr_url = get_str(body, &["pull_request", "html_url"]).map(String::from);
            let pr_title = get_str(body, &["pull_request", "title"]).map(String::from);

            Ok(RequestDescriptor {
                source: Source::GitHub,
                web_url,
                repo_url,
                project_id: repo_full_name,
                project_name: repo_name,
                private_token: configured_token.to_string(),
                event_type: Some(EventType::Merge),
                target_branch: base_ref,
                commit_id: Some(head_sha),
                previous_commit_id: base_sha,
                git_ref: format!("refs/pull/{}", pr_number.unwrap_or_default()),
                username,
                pr_number,
                pr_url,
                pr_title,
            })
        }
        other => Ok(skip_descriptor(Source::GitHub, format!("unsupported:{other}"))),
    }
}

/// Parses a GitLab webhook delivery (`X-Gitlab-Event` header + JSON body).
pub fn parse_gitlab(
    event_header: &str,
    body: &Value,
    gitlab_token_header: Option<&str>,
    configured_token: &str,
) -> ScResult<RequestDescriptor> {
    let project_id = body
        .get("project_id")
        .and_then(|v| v.as_u64())
        .map(|n| n.to_string())
        .or_else(|| get_str(body, &["project", "id"]).map(String::from))
        .ok_or_else(|| Error::Validation("missing project_id".into()))?;
    let project_name = get_str(body, &["project", "name"]).unwrap_or_default().to_string();
    let web_url = get_str(body, &["project", "web_url"]).unwrap_or_default().to_string();
    let repo_url = get_str(body, &["project", "git_http_url"])
        .unwrap_or(&web_url)
        .to_string();
    let private_token = gitlab_token_header.unwrap_or(configured_token).to_string();

    match event_header {
        "Push Hook" | "Tag Push Hook" => {
            let git_ref = get_str(body, &["ref"]).unwrap_or_default().to_string();
            let target_branch = normalize_ref(&git_ref);
            let after = get_str(body, &["after"]).unwrap_or_default().to_string();
            let before = get_str(body, &["before"]).unwrap_or_default().to_string();
            let username = get_str(body, &["user_username"]).unwrap_or_default().to_string();

            Ok(RequestDescriptor {
                source: Source::GitLab,
                web_url,
                repo_url,
                project_id,
                project_name,
                private_token,
                event_type: Some(EventType::Push),
                target_branch,
                commit_id: Some(after),
                previous_commit_id: before,
                git_ref,
                username,
                pr_number: None,
                pr_url: None,
                pr_title: None,
            })
        }
        "Merge Request Hook" => {
            let action = get_str(body, &["object_attributes", "action"]).unwrap_or_default();
            let target_branch = get_str(body, &["object_attributes", "target_branch"])
                .unwrap_or_default()
                .to_string();

            // GitLab's action vocabulary differs from GitHub's; map the
            // equivalent "review should run" actions onto the same gate.
            let proceeds = matches!(action, "open" | "update" | "reopen");
            if !proceeds {
                return Ok(skip_descriptor(Source::GitLab, target_branch));
            }

            let head_sha = get_str(body, &["object_attributes", "last_commit", "id"])
                .ok_or_else(|| Error::Validation("missing object_attributes.last_commit.id".into()))?
                .to_string();
            let source_branch = get_str(body, &["object_attributes", "source_branch"])
                .unwrap_or_default()
                .to_string();
            let username = get_str(body, &["user", "username"]).unwrap_or_default().to_string();
            let iid = body
                .get("object_attributes")
                .and_then(|o| o.get("iid"))
                .and_then(|n| n.as_u64());
            let pr_url = get_str(body, &["object_attributes", "url"]).map(String::from);
            let pr_title = get_str(body, &["object_attributes", "title"]).map(String::from);

            Ok(RequestDescriptor {
                source: Source::GitLab,
                web_url,
                repo_url,
                project_id,
                project_name,
                private_token,
                event_type: Some(EventType::Merge),
                target_branch,
                commit_id: Some(head_sha),
                previous_commit_id: String::new(),
                git_ref: source_branch,
                username,
                pr_number: iid,
                pr_url,
                pr_title,
            })
        }
        other => Ok(skip_descriptor(Source::GitLab, format!("unsupported:{other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn github_push_normalises_ref_and_extracts_shas() {
        let body = json!({
            "ref": "refs/heads/main",
            "before": "0000000000000000000000000000000000000000",
            "after": "abc1231111111111111111111111111111111111",
            "pusher": {"name": "octocat"},
            "repository": {"full_name": "acme/repo", "name": "repo", "html_url": "https://github.com/acme/repo", "clone_url": "https://github.com/acme/repo.git"}
        });
        let d = parse_github("push", &body, "tok").unwrap();
        assert!(!d.is_skip());
        assert_eq!(d.target_branch, "main");
        assert_eq!(d.commit_id.as_deref(), Some("abc1231111111111111111111111111111111111"));
        assert_eq!(d.project_id, "acme/repo");
    }

    #[test]
    fn github_pull_request_unsupported_action_is_skip() {
        let body = json!({
            "action": "labeled",
            "pull_request": {"base": {"ref": "main"}},
            "repository": {"full_name": "acme/repo", "name": "repo"}
        });
        let d = parse_github("pull_request", &body, "tok").unwrap();
        assert!(d.is_skip());
    }

    #[test]
    fn gitlab_merge_request_opened_is_not_skip() {
        let body = json!({
            "project_id": 42,
            "project": {"name": "repo", "web_url": "https://gitlab.com/acme/repo"},
            "object_attributes": {
                "action": "open",
                "target_branch": "main",
                "source_branch": "feature",
                "last_commit": {"id": "deadbeef"},
                "iid": 7
            },
            "user": {"username": "alice"}
        });
        let d = parse_gitlab("Merge Request Hook", &body, None, "tok").unwrap();
        assert!(!d.is_skip());
        assert_eq!(d.pr_number, Some(7));
    }
}
