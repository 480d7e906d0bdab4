//! Parses a `.codereview/*.yaml` file's multi-document body into
//! [`RawRule`] entries, one per YAML document.

use orchestrator_core::RawRule;

use crate::errors::{Error, ProviderError, ScResult};

pub fn parse_documents(text: &str) -> ScResult<Vec<RawRule>> {
    let mut rules = Vec::new();
    for doc in serde_yml::Deserializer::from_str(text) {
        let value = serde_yml::Value::deserialize(doc)
            .map_err(|e| Error::Provider(ProviderError::Yaml(e.to_string())))?;
        if matches!(value, serde_yml::Value::Null) {
            continue;
        }
        let mapping = value
            .as_mapping()
            .cloned()
            .ok_or_else(|| Error::Provider(ProviderError::Yaml("rule document is not a mapping".into())))?;
        rules.push(RawRule(mapping));
    }
    Ok(rules)
}

use serde::Deserialize as _;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_documents_separated_by_dashes() {
        let text = "name: one\nevent: push\n---\nname: two\nevent: merge\n";
        let rules = parse_documents(text).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].0.get("name").unwrap().as_str(), Some("one"));
        assert_eq!(rules[1].0.get("name").unwrap().as_str(), Some("two"));
    }

    #[test]
    fn skips_empty_trailing_document() {
        let text = "name: one\n---\n";
        let rules = parse_documents(text).unwrap();
        assert_eq!(rules.len(), 1);
    }
}
