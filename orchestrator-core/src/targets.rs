//! Target glob parsing shared by the Source-control Adapter's
//! `getProjectFiles` and the Content Builder's target filtering (§4.A/§4.C),
//! so both apply identical matching semantics.

use globset::{Glob, GlobSet, GlobSetBuilder};

/// Splits a rule's `target` field on `,`, trims whitespace, and strips a
/// single trailing `.` from each pattern.
pub fn parse_targets(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.strip_suffix('.').unwrap_or(s).to_string())
        .collect()
}

/// Builds a matcher where `**` means "any path" and everything else is
/// fnmatch-style glob matching via `globset`.
pub fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        let pattern = if p == "**" { "**/*" } else { p.as_str() };
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| GlobSetBuilder::new().build().unwrap())
}

/// Convenience: true if `path` matches any of the comma-separated `target` patterns.
pub fn matches_target(path: &str, target_spec: &str) -> bool {
    let patterns = parse_targets(target_spec);
    if patterns.is_empty() {
        return false;
    }
    if patterns.iter().any(|p| p == "**") {
        return true;
    }
    build_glob_set(&patterns).is_match(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_trimmed_targets() {
        assert_eq!(
            parse_targets("src/**, docs/*.md. , README."),
            vec!["src/**", "docs/*.md", "README"]
        );
    }

    #[test]
    fn double_star_matches_any_depth() {
        assert!(matches_target("a/b/c.rs", "**"));
        assert!(matches_target("a/b/c.rs", "**/*.rs"));
        assert!(!matches_target("a/b/c.py", "**/*.rs"));
    }

    #[test]
    fn single_glob_matches_top_level_only() {
        assert!(matches_target("src/a.py", "src/*.py"));
        assert!(!matches_target("src/nested/a.py", "src/*.py"));
    }
}
