//! HTML report rendering: the template asset's `<script id="diy">` block is
//! the only thing ever touched (§1 treats the rest of the asset as opaque),
//! mirroring the Python source's DOTALL regex substitution in
//! `generate_report_content`.

use std::sync::OnceLock;

use orchestrator_core::ReportData;
use regex::{Captures, Regex};

fn diy_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)<script id="diy">.*?</script>"#).expect("valid regex"))
}

/// Substitutes the template's `diy` script block with `title`/`subtitle`/`data`
/// JS literals built from `report`. Falls back to appending the block if the
/// template doesn't carry one (a malformed asset shouldn't drop the report).
pub fn render_report_html(template: &str, report: &ReportData) -> String {
    let title_json = serde_json::to_string(&report.title).unwrap_or_else(|_| "\"\"".to_string());
    let subtitle_json = serde_json::to_string(&report.subtitle).unwrap_or_else(|_| "\"\"".to_string());
    let data_json = serde_json::to_string(&report.data).unwrap_or_else(|_| "[]".to_string());

    let replacement = format!(
        "<script id=\"diy\">\n\tconst expand_all = false;\n\tconst title = {title_json};\n\tconst subtitle = {subtitle_json};\n\tconst data = {data_json};\n</script>"
    );

    if diy_block_regex().is_match(template) {
        diy_block_regex()
            .replace(template, |_: &Captures| replacement.clone())
            .into_owned()
    } else {
        format!("{template}\n{replacement}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchestrator_core::{Finding, ReportEntry};

    fn sample_report() -> ReportData {
        ReportData {
            title: "demo代码审核报告".to_string(),
            subtitle: "检测时间: 2026-01-01".to_string(),
            data: vec![ReportEntry {
                rule: "style".to_string(),
                content: vec![Finding {
                    title: "t".to_string(),
                    content: "c".to_string(),
                    filepath: None,
                }],
            }],
        }
    }

    #[test]
    fn replaces_diy_block_preserving_surrounding_markup() {
        let template = "<html><body><script id=\"diy\">\nold\n</script></body></html>";
        let rendered = render_report_html(template, &sample_report());
        assert!(rendered.starts_with("<html><body>"));
        assert!(rendered.ends_with("</body></html>"));
        assert!(rendered.contains("demo代码审核报告"));
        assert!(!rendered.contains("old"));
    }

    #[test]
    fn appends_block_when_template_has_none() {
        let rendered = render_report_html("<html></html>", &sample_report());
        assert!(rendered.contains("<html></html>"));
        assert!(rendered.contains("const title"));
    }
}
