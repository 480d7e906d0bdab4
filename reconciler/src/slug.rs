//! Project-name to filesystem-safe slug, mirroring the Python source's
//! `re.sub(r'[^a-zA-Z0-9]+', '_', name.lower()).strip('_')` (§6 persisted
//! report layout: `report/{slug}/{commit_id}/index.html`).

use std::sync::OnceLock;

use regex::Regex;

fn non_alnum_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9]+").expect("valid regex"))
}

pub fn slugify(project_name: &str) -> String {
    let lower = project_name.to_lowercase();
    let collapsed = non_alnum_regex().replace_all(&lower, "_");
    collapsed.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_punctuation_and_trims_underscores() {
        assert_eq!(slugify("Acme/Repo!!"), "acme_repo");
        assert_eq!(slugify("__Weird--Name__"), "weird_name");
    }

    #[test]
    fn leaves_alphanumeric_untouched() {
        assert_eq!(slugify("Already_OK123"), "already_ok123");
    }
}
