//! Loads baseline rules once per process from local YAML files under a
//! fixed asset directory (§4.B).

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use orchestrator_core::RawRule;
use tracing::{debug, error, info};

const BASE_RULES_DIRNAME: &str = ".baseCodeReviewRule";

static BASE_RULES_CACHE: OnceLock<Vec<RawRule>> = OnceLock::new();

fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(configured) = std::env::var("BASELINE_RULES_DIR") {
        dirs.push(PathBuf::from(configured));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            dirs.push(exe_dir.join(BASE_RULES_DIRNAME));
            if let Some(parent) = exe_dir.parent() {
                dirs.push(parent.join(BASE_RULES_DIRNAME));
            }
        }
    }
    dirs
}

fn load_dir(dir: &Path, rules: &mut Vec<RawRule>) {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "base rules directory not found");
        return;
    }

    let mut paths: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref(),
                    Some("yaml") | Some("yml")
                )
            })
            .collect(),
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "failed to read base rules directory");
            return;
        }
    };
    paths.sort();

    for path in paths {
        match std::fs::read_to_string(&path) {
            Ok(text) => match source_control::rules_yaml::parse_documents(&text) {
                Ok(mut docs) => {
                    info!(file = %path.display(), count = docs.len(), "loaded base rule file");
                    rules.append(&mut docs);
                }
                Err(e) => error!(file = %path.display(), error = %e, "failed to parse base rule file"),
            },
            Err(e) => error!(file = %path.display(), error = %e, "failed to read base rule file"),
        }
    }
}

/// Returns the process-wide cached baseline rule set, loading it on first call.
pub fn load_base_rules() -> &'static [RawRule] {
    BASE_RULES_CACHE.get_or_init(|| {
        let mut rules = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for dir in candidate_dirs() {
            let normalized = dunce::canonicalize(&dir).unwrap_or(dir.clone());
            if !seen.insert(normalized) {
                continue;
            }
            load_dir(&dir, &mut rules);
        }
        info!(count = rules.len(), "loaded base rules from local files");
        rules
    })
}
