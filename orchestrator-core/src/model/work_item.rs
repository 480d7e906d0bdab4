use crate::model::rule::{Mode, Rule};

/// One unit of review work before dispatch: a rule paired with a rendered
/// code slice for a single `filepath` (or the whole-project sentinel).
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub mode: Mode,
    pub filepath: String,
    pub content: String,
    pub rule: Rule,
}

/// Sentinel `filepath` used by `mode=all` items, matching the source's
/// literal placeholder for "no single file, the whole project".
pub const WHOLE_PROJECT_FILEPATH: &str = "<The Whole Project>";
