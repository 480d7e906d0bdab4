//! `{{var}}` substitution (§4.D): plain textual replacement, applied after
//! both prompt strings are constructed. Idempotent by construction as long
//! as substituted values don't themselves introduce new `{{...}}` tokens
//! (Testable Property 5), which holds for every variable this crate feeds in.

use std::collections::HashMap;

pub fn format_prompt(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{key}}}}}"), value.trim());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_vars_and_leaves_unknown_tokens() {
        let mut vars = HashMap::new();
        vars.insert("project_name".to_string(), "acme/repo".to_string());
        let out = format_prompt("Reviewing {{project_name}}, branch {{branch}}", &vars);
        assert_eq!(out, "Reviewing acme/repo, branch {{branch}}");
    }

    #[test]
    fn strips_whitespace_from_substituted_values() {
        let mut vars = HashMap::new();
        vars.insert("branch".to_string(), "  main  \n".to_string());
        let out = format_prompt("branch={{branch}}", &vars);
        assert_eq!(out, "branch=main");
    }

    #[test]
    fn formatting_twice_is_a_no_op_once_resolved() {
        let mut vars = HashMap::new();
        vars.insert("code".to_string(), "print(1)".to_string());
        let once = format_prompt("{{code}}", &vars);
        let twice = format_prompt(&once, &vars);
        assert_eq!(once, twice);
    }
}
