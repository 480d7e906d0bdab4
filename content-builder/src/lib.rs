//! Content Builder (§4.C): turns one filtered [`Rule`] plus a commit pair
//! into the `[WorkItem]`s the Dispatcher hands to the Executor, one per
//! content-slice mode (`all`/`single`/`diff`).

use orchestrator_core::targets::matches_target;
use orchestrator_core::{Mode, Rule, WHOLE_PROJECT_FILEPATH, WorkItem};
use source_control::{RepoHandle, ScResult, SourceControlClient};
use tracing::debug;

/// Wraps a path + body in the fenced-block shape every mode shares.
fn fence(path: &str, body: &str) -> String {
    format!("{path}\n```\n{body}\n```\n")
}

/// `mode=all`: one item concatenating every target-matching file at `commit`.
async fn build_all(
    client: &SourceControlClient,
    handle: &RepoHandle,
    commit: &str,
    rule: &Rule,
) -> ScResult<Vec<WorkItem>> {
    let files = client.get_project_files(handle, commit, &rule.target).await?;
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let mut sections = Vec::with_capacity(files.len());
    for (path, bytes) in &files {
        match String::from_utf8(bytes.clone()) {
            Ok(text) => sections.push(fence(path, &text)),
            Err(e) => debug!(%path, error = %e, "skipping non-UTF8 file in all-mode concatenation"),
        }
    }
    if sections.is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![WorkItem {
        mode: Mode::All,
        filepath: WHOLE_PROJECT_FILEPATH.to_string(),
        content: sections.join("\n"),
        rule: rule.clone(),
    }])
}

/// `mode=single`: one item per target-matching involved file, full content
/// at `commit`.
async fn build_single(
    client: &SourceControlClient,
    handle: &RepoHandle,
    commit: &str,
    previous_commit: &str,
    rule: &Rule,
) -> ScResult<Vec<WorkItem>> {
    let involved = client.get_involved_files(handle, previous_commit, commit).await?;
    let mut items = Vec::new();
    for path in involved.keys() {
        if !matches_target(path, &rule.target) {
            continue;
        }
        let body = match client.get_file(handle, path, commit).await? {
            Some(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            None => continue,
        };
        items.push(WorkItem {
            mode: Mode::Single,
            filepath: path.clone(),
            content: fence(path, &body),
            rule: rule.clone(),
        });
    }
    Ok(items)
}

/// `mode=diff`: one item per target-matching involved file, wrapping the
/// diff patch (empty string for binary/patchless files — still an item).
async fn build_diff(
    client: &SourceControlClient,
    handle: &RepoHandle,
    commit: &str,
    previous_commit: &str,
    rule: &Rule,
) -> ScResult<Vec<WorkItem>> {
    let involved = client.get_involved_files(handle, previous_commit, commit).await?;
    let mut items = Vec::new();
    for (path, patch) in &involved {
        if !matches_target(path, &rule.target) {
            continue;
        }
        items.push(WorkItem {
            mode: Mode::Diff,
            filepath: path.clone(),
            content: fence(path, patch),
            rule: rule.clone(),
        });
    }
    Ok(items)
}

/// Dispatches to the mode-specific builder for one rule.
pub async fn build_work_items(
    client: &SourceControlClient,
    handle: &RepoHandle,
    commit: &str,
    previous_commit: &str,
    rule: &Rule,
) -> ScResult<Vec<WorkItem>> {
    match rule.mode {
        Mode::All => build_all(client, handle, commit, rule).await,
        Mode::Single => build_single(client, handle, commit, previous_commit, rule).await,
        Mode::Diff => build_diff(client, handle, commit, previous_commit, rule).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_wraps_path_and_body() {
        let s = fence("src/a.py", "print(1)");
        assert_eq!(s, "src/a.py\n```\nprint(1)\n```\n");
    }
}
