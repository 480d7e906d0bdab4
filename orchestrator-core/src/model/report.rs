use serde::{Deserialize, Serialize};

/// One `{rule, content}` pair feeding the report's embedded data island.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub rule: String,
    pub content: Vec<super::result::Finding>,
}

/// Rendered report, persisted at `report/{slug}/{commit_id}/index.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub title: String,
    pub subtitle: String,
    pub data: Vec<ReportEntry>,
}

/// Notification message published once the report is ready.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub title: String,
    pub subtitle: String,
    pub report_url: String,
    pub data: Vec<ReportEntry>,
    pub context: serde_json::Value,
}
