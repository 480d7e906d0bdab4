//! GitLab provider (REST v4) backing the Source-control Adapter's §4.A contract.
//!
//! Endpoints used:
//!   * GET  /projects/{id}
//!   * GET  /projects/{id}/repository/files/{path}/raw?ref={ref}
//!   * GET  /projects/{id}/repository/tree?ref={ref}&recursive=true
//!   * GET  /projects/{id}/repository/compare?from={from}&to={to}
//!   * GET  /projects/{id}/repository/branches/{branch}
//!   * GET  /projects/{id}/repository/commits/{commit}
//!   * POST /projects/{id}/merge_requests/{iid}/notes

use std::collections::BTreeMap;

use orchestrator_core::{RawRule, ZERO_COMMIT};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::errors::{Error, ScResult};
use crate::types::{PrNumber, RepoHandle};

#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_api: String,
    token: String,
}

impl GitLabClient {
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        Self { http, base_api, token }
    }

    fn encoded_project(&self, project_id: &str) -> String {
        urlencoding::encode(project_id).into_owned()
    }

    pub async fn init_context(&self, project_id: &str) -> ScResult<RepoHandle> {
        let url = format!("{}/projects/{}", self.base_api, self.encoded_project(project_id));
        let resp: GitLabProject = self
            .http
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(RepoHandle {
            project_id: project_id.to_string(),
            project_name: resp.name,
            default_branch: resp.default_branch,
        })
    }

    pub async fn get_file(&self, handle: &RepoHandle, path: &str, git_ref: &str) -> ScResult<Option<Vec<u8>>> {
        let encoded_path = urlencoding::encode(path).into_owned();
        let url = format!(
            "{}/projects/{}/repository/files/{encoded_path}/raw",
            self.base_api,
            self.encoded_project(&handle.project_id)
        );
        let resp = self
            .http
            .get(url)
            .query(&[("ref", git_ref)])
            .header("PRIVATE-TOKEN", &self.token)
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

        let url = format!(
            "{}/projects/{}/repository/compare",
            self.base_api,
            self.encoded_project(&handle.project_id)
        );
        let resp: GitLabCompare = self
            .http
            .get(url)
            .query(&[("from", from_commit), ("to", to_commit)])
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut out = BTreeMap::new();
        for d in resp.diffs {
            if d.deleted_file {
                continue;
            }
            if d.renamed_file {
                out.remove(&d.old_path);
            }
            out.insert(d.new_path, d.diff);
        }
        Ok(out)
    }

    async fn list_tree(&self, handle: &RepoHandle, git_ref: &str) -> ScResult<Vec<String>> {
        let url = format!(
            "{}/projects/{}/repository/tree",
            self.base_api,
            self.encoded_project(&handle.project_id)
        );
        let resp: Vec<GitLabTreeEntry> = self
            .http
            .get(url)
            .query(&[("ref", git_ref), ("recursive", "true"), ("per_page", "100")])
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp
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
        let project = self.encoded_project(&handle.project_id);

        if commit_id.is_empty() || commit_id == ZERO_COMMIT {
            let encoded_branch = urlencoding::encode(branch).into_owned();
            let url = format!("{}/projects/{project}/repository/branches/{encoded_branch}", self.base_api);
            let resp: GitLabBranch = self
                .http
                .get(url)
                .header("PRIVATE-TOKEN", &self.token)
                .send()
                .await
                .map_err(Error::from)
                .and_then(|r| r.error_for_status().map_err(Error::from))?
                .json()
                .await?;
            return Ok(resp.commit.id);
        }

        let url = format!("{}/projects/{project}/repository/commits/{commit_id}", self.base_api);
        let resp = self
            .http
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;
        if resp.status().as_u16() == 404 {
            return Err(Error::NotFound(format!("commit {commit_id} not found")));
        }
        let resp: GitLabCommitLookup = resp.error_for_status()?.json().await?;
        Ok(resp.id)
    }

    /// `getRules`: reads `.codereview/*.yaml`/`*.yml` at `commit` (or
    /// `branch` when `commit` is the zero sentinel).
    pub async fn get_rules(&self, handle: &RepoHandle, commit: &str, branch: &str) -> ScResult<Vec<RawRule>> {
        let git_ref = if commit.is_empty() || commit == ZERO_COMMIT { branch } else { commit };
        let project = self.encoded_project(&handle.project_id);
        let url = format!("{}/projects/{project}/repository/tree", self.base_api);
        let resp = self
            .http
            .get(url)
            .query(&[("ref", git_ref), ("path", ".codereview")])
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        if resp.status().as_u16() == 404 {
            return Ok(Vec::new());
        }
        let entries: Vec<GitLabTreeEntry> = resp.error_for_status()?.json().await?;

        let mut rules = Vec::new();
        for entry in entries {
            let lower = entry.name.to_lowercase();
            if entry.r#type != "blob" || !(lower.ends_with(".yaml") || lower.ends_with(".yml")) {
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
    /// any provider error or on a non-numeric MR iid.
    pub async fn post_summary_comment(&self, handle: &RepoHandle, pr_number: &PrNumber, body: &str) -> bool {
        let Some(iid) = pr_number.as_u64() else {
            return false;
        };
        let project = self.encoded_project(&handle.project_id);
        let url = format!("{}/projects/{project}/merge_requests/{iid}/notes", self.base_api);
        debug!(%url, "posting GitLab summary comment");

        match self
            .http
            .post(url)
            .header("PRIVATE-TOKEN", &self.token)
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
struct GitLabProject {
    name: String,
    #[serde(default)]
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitLabDiff {
    old_path: String,
    new_path: String,
    #[serde(default)]
    diff: String,
    #[serde(default)]
    deleted_file: bool,
    #[serde(default)]
    renamed_file: bool,
}

#[derive(Debug, Deserialize)]
struct GitLabCompare {
    diffs: Vec<GitLabDiff>,
}

#[derive(Debug, Deserialize)]
struct GitLabTreeEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    r#type: String,
}

#[derive(Debug, Deserialize)]
struct GitLabBranchCommit {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GitLabBranch {
    commit: GitLabBranchCommit,
}

#[derive(Debug, Deserialize)]
struct GitLabCommitLookup {
    id: String,
}
