//! Renders the PR summary comment body (§6) and posts it through a
//! [`SourceControlClient`].

use orchestrator_core::{Finding, ReportEntry};

use crate::client::SourceControlClient;
use crate::types::{PrNumber, RepoHandle};

const MAX_COMMENT_CHARS: usize = 60_000;

/// Renders the fixed-format summary comment body. Overflow beyond
/// [`MAX_COMMENT_CHARS`] is truncated with an ellipsis and a pointer back to
/// the report URL, rather than silently dropping the tail.
pub fn render_summary_comment(report_url: &str, entries: &[ReportEntry]) -> String {
    let mut body = String::new();
    body.push_str("## 🤖 Code Review 结果\n\n");
    body.push_str(&format!("📄 [点击查看完整报告]({report_url})\n\n"));

    if entries.iter().all(|e| e.content.is_empty()) {
        body.push_str("✅ 未发现需要向团队报告的问题。\n\n");
    } else {
        for entry in entries {
            body.push_str(&format!("### {}\n", entry.rule));
            for (i, finding) in entry.content.iter().enumerate() {
                body.push_str(&format!("{}. **{}**\n", i + 1, finding.title));
                if let Some(path) = finding_filepath(finding) {
                    body.push_str(&format!("   - 📁 `{path}`\n"));
                }
                body.push_str(&format!("   - 描述：{}\n", finding.content));
            }
        }
    }

    body.push_str("---\n*此评论由 AWS Code Reviewer 自动生成*");

    truncate_with_pointer(&body, report_url)
}

fn finding_filepath(finding: &Finding) -> Option<&str> {
    finding.filepath.as_deref()
}

fn truncate_with_pointer(body: &str, report_url: &str) -> String {
    if body.chars().count() <= MAX_COMMENT_CHARS {
        return body.to_string();
    }
    let pointer = format!("\n…\n[完整报告]({report_url})");
    let budget = MAX_COMMENT_CHARS.saturating_sub(pointer.chars().count());
    let head: String = body.chars().take(budget).collect();
    format!("{head}{pointer}")
}

/// Renders and posts the summary comment; swallows all failures (§7:
/// "PR commenting failures are always swallowed").
pub async fn post_summary_comment(
    client: &SourceControlClient,
    handle: &RepoHandle,
    pr_number: &PrNumber,
    report_url: &str,
    entries: &[ReportEntry],
) -> bool {
    let body = render_summary_comment(report_url, entries);
    client.post_summary_comment(handle, pr_number, &body).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed_header_and_footer() {
        let entries = vec![ReportEntry {
            rule: "style".to_string(),
            content: vec![Finding {
                title: "missing docstring".to_string(),
                content: "public fn lacks a doc comment".to_string(),
                filepath: Some("src/lib.rs".to_string()),
            }],
        }];
        let body = render_summary_comment("https://example.com/report", &entries);
        assert!(body.starts_with("## 🤖 Code Review 结果\n\n"));
        assert!(body.contains("📄 [点击查看完整报告](https://example.com/report)"));
        assert!(body.contains("### style"));
        assert!(body.contains("📁 `src/lib.rs`"));
        assert!(body.ends_with("*此评论由 AWS Code Reviewer 自动生成*"));
    }

    #[test]
    fn empty_findings_renders_the_all_clear_message() {
        let body = render_summary_comment("https://example.com/report", &[]);
        assert!(body.contains("✅ 未发现需要向团队报告的问题。"));
        assert!(!body.contains("###"));
    }

    #[test]
    fn truncates_oversized_body_with_pointer() {
        let long_content = "x".repeat(MAX_COMMENT_CHARS + 1000);
        let entries = vec![ReportEntry {
            rule: "bulk".to_string(),
            content: vec![Finding {
                title: "t".to_string(),
                content: long_content,
                filepath: None,
            }],
        }];
        let body = render_summary_comment("https://example.com/report", &entries);
        assert!(body.chars().count() <= MAX_COMMENT_CHARS);
        assert!(body.contains("完整报告"));
    }
}
