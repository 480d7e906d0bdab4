//! GitHub provider (REST v3) backing the Source-control Adapter's §4.A contract.
//!
//! Endpoints used:
//!   * GET  /repos/{owner}/{repo}
//!   * GET  /repos/{owner}/{repo}/contents/{path}?ref={ref}
//!   * GET  /repos/{owner}/{repo}/git/trees/{ref}?recursive=1
//!   * GET  /repos/{owner}/{repo}/compare/{base}...{head}
//!   * GET  /repos/{owner}/{repo}/branches/{branch}
//!   * POST /repos/{owner}/{repo}/issues/{number}/comments

use std::collections::BTreeMap;

use orchestrator_core::{RawRule, ZERO_COMMIT};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::errors::{Error, ScResult};
use crate::types::{PrNumber, RepoHandle};

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String,
    token: String,
}

impl GitHubClient {
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        Self { http, base_api, token }
    }

    fn split_owner_repo<'a>(&self, project_id: &'a str) -> ScResult<(&'a str, &'a str)> {
        let mut parts = project_id.splitn(2, '/');
        let owner = parts.next().filter(|s| !s.is_empty());
        let repo = parts.next().filter(|s| !s.is_empty());
        match (owner, repo) {
            (Some(o), Some(r)) => Ok((o, r)),
            _ => Err(Error::Validation(format!(
                "invalid GitHub project id '{project_id}', expected 'owner/repo'"
            ))),
        }
    }

    pub async fn init_context(&self, project_id: &str) -> ScResult<RepoHandle> {
        let (owner, repo) = self.split_owner_repo(project_id)?;
        let url = format!("{}/repos/{owner}/{repo}", self.base_api);
        let resp: GitHubRepo = self
            .http
            .get(url)
            .header("Authorization", &self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(RepoHandle {
            project_id: project_id.to_string(),
            project_name: resp.name,
            default_branch: Some(resp.default_branch),
        })
    }

    pub async fn get_file(&self, handle: &RepoHandle, path: &str, git_ref: &str) -> ScResult<Option<Vec<u8>>> {
        let (owner, repo) = self.split_owner_repo(&handle.project_id)?;
        let url = format!("{}/repos/{owner}/{repo}/contents/{path}", self.base_api);
        let resp = self
            .http
            .get(url)
            .query(&[("ref", git_ref)])
            .header("Authorization", &self.token)
            .header("Accept", "application/vnd.github.v3.raw")
            .send()
            .await?;

        if resp.status().as_u16() == 404 {
            return Ok(None);
        }
        let resp = resp.error_for_status()?;
        let bytes = resp.bytes().await?;
        Ok(Some(bytes.to_vec()))
    }

    /// `getInvolvedFiles`: compares `from_commit`..`to_commit`. A `from_commit`
    /// of [`ZERO_COMMIT`] means "new branch" — the full tree at `to_commit` is
    /// returned instead, each mapped to an empty patch.
    pub async fn get_involved_files(
        &self,
        handle: &RepoHandle,
        from_commit: &str,
        to_commit: &str,
    ) -> ScResult<BTreeMap<String, String>> {
        if from_commit == ZERO_COMMIT || from_commit.is_empty() {
            let tree = self.list_tree(handle, to_commit).await?;
            return Ok(tree.into_iter().map(|path| (path, String::new())).collect());
        }

        let (owner, repo) = self.split_owner_repo(&handle.project_id)?;
        let url = format!("{}/repos/{owner}/{repo}/compare/{from_commit}...{to_commit}", self.base_api);
        let resp: GitHubCompare = self
            .http
            .get(url)
            .header("Authorization", &self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut out = BTreeMap::new();
        for f in resp.files {
            match f.status.as_str() {
                "removed" => {}
                "renamed" => {
                    if let Some(prev) = f.previous_filename {
                        out.remove(&prev);
                    }
                    out.insert(f.filename, f.patch.unwrap_or_default());
                }
                _ => {
                    out.insert(f.filename, f.patch.unwrap_or_default());
                }
            }
        }
        Ok(out)
    }

    async fn list_tree(&self, handle: &RepoHandle, git_ref: &str) -> ScResult<Vec<String>> {
        let (owner, repo) = self.split_owner_repo(&handle.project_id)?;
        let url = format!("{}/repos/{owner}/{repo}/git/trees/{git_ref}", self.base_api);
        let resp: GitHubTree = self
            .http
            .get(url)
            .query(&[("recursive", "1")])
            .header("Authorization", &self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp
            .tree
            .into_iter()
            .filter(|e| e.r#type == "blob")
            .map(|e| e.path)
            .collect())
    }

    /// `getProjectFiles`: lists the tree at `commit`, keeps paths matching
    /// `target_globs`, and fetches each one, skipping (with a warning) any
    /// file that fails to fetch.
    pub async fn get_project_files(
        &self,
        handle: &RepoHandle,
        commit: &str,
        target_globs: &str,
    ) -> ScResult<BTreeMap<String, Vec<u8>>> {
        let all_paths = self.list_tree(handle, commit).await?;
        let mut out = BTreeMap::new();
        for path in all_paths {
            if !orchestrator_core::targets::matches_target(&path, target_globs) {
                continue;
            }
            match self.get_file(handle, &path, commit).await {
                Ok(Some(bytes)) => {
                    out.insert(path, bytes);
                }
                Ok(None) => {}
                Err(e) => warn!(%path, error = %e, "skipping file that failed to fetch"),
            }
        }
        Ok(out)
    }

    /// `formatCommitId`: resolves an empty/zero/short commit id to the full
    /// 40-char SHA, falling back to the branch tip when empty or zero.
    pub async fn format_commit_id(&self, handle: &RepoHandle, branch: &str, commit_id: &str) -> ScResult<String> {
        let (owner, repo) = self.split_owner_repo(&handle.project_id)?;

        if commit_id.is_empty() || commit_id == ZERO_COMMIT {
            let url = format!("{}/repos/{owner}/{repo}/branches/{branch}", self.base_api);
            let resp: GitHubBranch = self
                .http
                .get(url)
                .header("Authorization", &self.token)
                .header("Accept", "application/vnd.github+json")
                .send()
                .await
                .map_err(Error::from)
                .and_then(|r| r.error_for_status().map_err(Error::from))?
                .json()
                .await?;
            return Ok(resp.commit.sha);
        }

        let url = format!("{}/repos/{owner}/{repo}/commits/{commit_id}", self.base_api);
        let resp = self
            .http
            .get(url)
            .header("Authorization", &self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;
        if resp.status().as_u16() == 404 {
            return Err(Error::NotFound(format!("commit {commit_id} not found")));
        }
        let resp: GitHubCommitLookup = resp.error_for_status()?.json().await?;
        Ok(resp.sha)
    }

    /// `getRules`: reads `.codereview/*.yaml`/`*.yml` at `commit` (or
    /// `branch` when `commit` is the zero sentinel).
    pub async fn get_rules(&self, handle: &RepoHandle, commit: &str, branch: &str) -> ScResult<Vec<RawRule>> {
        let git_ref = if commit.is_empty() || commit == ZERO_COMMIT { branch } else { commit };
        let (owner, repo) = self.split_owner_repo(&handle.project_id)?;
        let url = format!("{}/repos/{owner}/{repo}/contents/.codereview", self.base_api);
        let resp = self
            .http
            .get(url)
            .query(&[("ref", git_ref)])
            .header("Authorization", &self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        if resp.status().as_u16() == 404 {
            return Ok(Vec::new());
        }
        let entries: Vec<GitHubContentEntry> = resp.error_for_status()?.json().await?;

        let mut rules = Vec::new();
        for entry in entries {
            let lower = entry.name.to_lowercase();
            if !(lower.ends_with(".yaml") || lower.ends_with(".yml")) {
                continue;
            }
            match self.get_file(handle, &entry.path, git_ref).await {
                Ok(Some(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => match crate::rules_yaml::parse_documents(&text) {
                        Ok(mut docs) => rules.append(&mut docs),
                        Err(e) => warn!(file = %entry.path, error = %e, "skipping malformed rule file"),
                    },
                    Err(e) => warn!(file = %entry.path, error = %e, "skipping non-UTF8 rule file"),
                },
                Ok(None) => {}
                Err(e) => warn!(file = %entry.path, error = %e, "skipping unreadable rule file"),
            }
        }
        Ok(rules)
    }

    /// `postSummaryComment`: never raises into the caller; returns `false` on
    /// any provider error or on a non-numeric PR number.
    pub async fn post_summary_comment(&self, handle: &RepoHandle, pr_number: &PrNumber, body: &str) -> bool {
        let Some(number) = pr_number.as_u64() else {
            return false;
        };
        let Ok((owner, repo)) = self.split_owner_repo(&handle.project_id) else {
            return false;
        };
        let url = format!("{}/repos/{owner}/{repo}/issues/{number}/comments", self.base_api);
        debug!(%url, "posting GitHub summary comment");

        match self
            .http
            .post(url)
            .header("Authorization", &self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&json!({ "body": body }))
            .send()
            .await
        {
            Ok(resp) => resp.error_for_status().is_ok(),
            Err(_) => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct GitHubCompareFile {
    filename: String,
    #[serde(default)]
    previous_filename: Option<String>,
    status: String,
    #[serde(default)]
    patch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubCompare {
    files: Vec<GitHubCompareFile>,
}

#[derive(Debug, Deserialize)]
struct GitHubTreeEntry {
    path: String,
    #[serde(rename = "type")]
    r#type: String,
}

#[derive(Debug, Deserialize)]
struct GitHubTree {
    tree: Vec<GitHubTreeEntry>,
}

#[derive(Debug, Deserialize)]
struct GitHubBranchCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitHubBranch {
    commit: GitHubBranchCommit,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitLookup {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitHubContentEntry {
    name: String,
    path: String,
}
