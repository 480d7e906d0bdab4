//! Output extraction (§4.E): pulls the first `<output>...</output>` block
//! out of a model reply and parses it as JSON. The source's Python uses
//! `ast.literal_eval`, which additionally accepts single-quoted strings and
//! the literals `True`/`False`/`None`; this normalises those spellings
//! before handing the text to `serde_json` so prompts written against the
//! looser grammar still parse (see DESIGN.md).

use std::sync::OnceLock;

use orchestrator_core::Finding;
use regex::Regex;
use serde_json::Value;

pub enum ExtractOutcome {
    Findings(Vec<Finding>),
    NeedsRectify,
}

fn output_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<output>(.*?)</output>").expect("valid regex"))
}

fn literal_regexes() -> &'static (Regex, Regex, Regex) {
    static RES: OnceLock<(Regex, Regex, Regex)> = OnceLock::new();
    RES.get_or_init(|| {
        (
            Regex::new(r"\bTrue\b").expect("valid regex"),
            Regex::new(r"\bFalse\b").expect("valid regex"),
            Regex::new(r"\bNone\b").expect("valid regex"),
        )
    })
}

fn normalize_literal(raw: &str) -> String {
    let (true_re, false_re, none_re) = literal_regexes();
    let mut s = true_re.replace_all(raw.trim(), "true").into_owned();
    s = false_re.replace_all(&s, "false").into_owned();
    s = none_re.replace_all(&s, "null").into_owned();
    if !s.contains('"') && s.contains('\'') {
        s = s.replace('\'', "\"");
    }
    s
}

/// Extracts and parses the model's `<output>` block, or reports that a
/// rectifier round is needed (Testable Property 7).
pub fn extract_findings(reply_text: &str) -> ExtractOutcome {
    let Some(captures) = output_regex().captures(reply_text) else {
        return ExtractOutcome::NeedsRectify;
    };
    let raw = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let normalized = normalize_literal(raw);

    let value: Value = match serde_json::from_str(&normalized) {
        Ok(v) => v,
        Err(_) => return ExtractOutcome::NeedsRectify,
    };

    match value {
        Value::Object(_) => match serde_json::from_value::<Finding>(value) {
            Ok(finding) => ExtractOutcome::Findings(vec![finding]),
            Err(_) => ExtractOutcome::NeedsRectify,
        },
        Value::Array(items) => {
            let mut findings = Vec::with_capacity(items.len());
            for item in items {
                if !item.is_object() {
                    return ExtractOutcome::NeedsRectify;
                }
                match serde_json::from_value::<Finding>(item) {
                    Ok(finding) => findings.push(finding),
                    Err(_) => return ExtractOutcome::NeedsRectify,
                }
            }
            ExtractOutcome::Findings(findings)
        }
        _ => ExtractOutcome::NeedsRectify,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_object() {
        let reply = "chatter\n<output>{\"title\": \"t\", \"content\": \"c\"}</output>\ntrailer";
        match extract_findings(reply) {
            ExtractOutcome::Findings(f) => {
                assert_eq!(f.len(), 1);
                assert_eq!(f[0].title, "t");
            }
            ExtractOutcome::NeedsRectify => panic!("expected findings"),
        }
    }

    #[test]
    fn extracts_array_of_objects() {
        let reply = r#"<output>[{"title": "a", "content": "1"}, {"title": "b", "content": "2"}]</output>"#;
        match extract_findings(reply) {
            ExtractOutcome::Findings(f) => assert_eq!(f.len(), 2),
            ExtractOutcome::NeedsRectify => panic!("expected findings"),
        }
    }

    #[test]
    fn python_style_literals_are_normalised() {
        let reply = "<output>{'title': 'a', 'content': 'ok', 'filepath': None}</output>";
        match extract_findings(reply) {
            ExtractOutcome::Findings(f) => {
                assert_eq!(f[0].title, "a");
                assert!(f[0].filepath.is_none());
            }
            ExtractOutcome::NeedsRectify => panic!("expected findings"),
        }
    }

    #[test]
    fn missing_output_tag_needs_rectify() {
        assert!(matches!(extract_findings("no tags here"), ExtractOutcome::NeedsRectify));
    }

    #[test]
    fn non_object_array_entry_needs_rectify() {
        let reply = r#"<output>["just a string"]</output>"#;
        assert!(matches!(extract_findings(reply), ExtractOutcome::NeedsRectify));
    }
}
