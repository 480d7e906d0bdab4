//! Enum-dispatched provider client: the single entry point the rest of the
//! workspace uses to talk to a repository host, regardless of which one.

use std::collections::BTreeMap;

use orchestrator_core::RawRule;
use reqwest::Client;

use crate::errors::ScResult;
use crate::github::GitHubClient;
use crate::gitlab::GitLabClient;
use crate::types::{PrNumber, ProviderKind, RepoHandle};

/// Per-provider connection details, resolved from the incoming
/// [`RequestDescriptor`](crate::types::RequestDescriptor) plus environment
/// configuration (base API URLs are fixed per deployment; tokens travel
/// with the request).
#[derive(Debug, Clone)]
pub struct SourceControlConfig {
    pub github_api: String,
    pub gitlab_api: String,
}

impl Default for SourceControlConfig {
    fn default() -> Self {
        Self {
            github_api: "https://api.github.com".to_string(),
            gitlab_api: "https://gitlab.com/api/v4".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SourceControlClient {
    GitHub(GitHubClient),
    GitLab(GitLabClient),
}

impl SourceControlClient {
    pub fn new(kind: ProviderKind, config: &SourceControlConfig, token: String) -> Self {
        let http = Client::new();
        match kind {
            ProviderKind::GitHub => {
                SourceControlClient::GitHub(GitHubClient::new(http, config.github_api.clone(), token))
            }
            ProviderKind::GitLab => {
                SourceControlClient::GitLab(GitLabClient::new(http, config.gitlab_api.clone(), token))
            }
        }
    }

    pub async fn init_context(&self, project_id: &str) -> ScResult<RepoHandle> {
        match self {
            SourceControlClient::GitHub(c) => c.init_context(project_id).await,
            SourceControlClient::GitLab(c) => c.init_context(project_id).await,
        }
    }

    pub async fn get_file(&self, handle: &RepoHandle, path: &str, git_ref: &str) -> ScResult<Option<Vec<u8>>> {
        match self {
            SourceControlClient::GitHub(c) => c.get_file(handle, path, git_ref).await,
            SourceControlClient::GitLab(c) => c.get_file(handle, path, git_ref).await,
        }
    }

    pub async fn get_involved_files(
        &self,
        handle: &RepoHandle,
        from_commit: &str,
        to_commit: &str,
    ) -> ScResult<BTreeMap<String, String>> {
        match self {
            SourceControlClient::GitHub(c) => c.get_involved_files(handle, from_commit, to_commit).await,
            SourceControlClient::GitLab(c) => c.get_involved_files(handle, from_commit, to_commit).await,
        }
    }

    pub async fn get_project_files(
        &self,
        handle: &RepoHandle,
        commit: &str,
        target_globs: &str,
    ) -> ScResult<BTreeMap<String, Vec<u8>>> {
        match self {
            SourceControlClient::GitHub(c) => c.get_project_files(handle, commit, target_globs).await,
            SourceControlClient::GitLab(c) => c.get_project_files(handle, commit, target_globs).await,
        }
    }

    pub async fn format_commit_id(&self, handle: &RepoHandle, branch: &str, commit_id: &str) -> ScResult<String> {
        match self {
            SourceControlClient::GitHub(c) => c.format_commit_id(handle, branch, commit_id).await,
            SourceControlClient::GitLab(c) => c.format_commit_id(handle, branch, commit_id).await,
        }
    }

    pub async fn get_rules(&self, handle: &RepoHandle, commit: &str, branch: &str) -> ScResult<Vec<RawRule>> {
        match self {
            SourceControlClient::GitHub(c) => c.get_rules(handle, commit, branch).await,
            SourceControlClient::GitLab(c) => c.get_rules(handle, commit, branch).await,
        }
    }

    pub async fn post_summary_comment(&self, handle: &RepoHandle, pr_number: &PrNumber, body: &str) -> bool {
        match self {
            SourceControlClient::GitHub(c) => c.post_summary_comment(handle, pr_number, body).await,
            SourceControlClient::GitLab(c) => c.post_summary_comment(handle, pr_number, body).await,
        }
    }
}
