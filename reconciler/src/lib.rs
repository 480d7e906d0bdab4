//! Reconciler (§4.F): the progress check every Dispatcher empty-work
//! short-circuit and every Executor task completion calls through
//! [`ReconcileTrigger`], plus the recovery cron sweep over stalled requests.
//! Grounded on the Python source's `report.py`: once a request's
//! `task_complete + task_failure` reaches `task_total`, assemble every
//! successful task's findings into one HTML report, persist it, mint a
//! signed URL, flip the request to `Complete`, publish a notification, and
//! — GitHub only — post the summary comment back to the pull request.

pub mod errors;
pub mod slug;
pub mod template;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use orchestrator_core::model::{NotificationMessage, ReportData, ReportEntry, ResultObject};
use orchestrator_core::ports::{BlobStore, Notifier, ReconcileTrigger, RequestKey, RequestStore, TaskStore};
use orchestrator_core::{OrchestratorResult, Source, TaskStatus};
use source_control::SourceControlClient;
use tracing::{info, instrument, warn};

pub use errors::{ReconcileError, ReconcileResult};

/// The opaque report asset shipped with the crate; deployments may instead
/// point `REPORT_TEMPLATE_PATH` at a customised file (§6).
pub const DEFAULT_TEMPLATE: &str = include_str!("../assets/report_template.html");

/// Signed report URLs stay valid for five days, matching the Python source's
/// `ExpiresIn=3600*24*5`.
pub const REPORT_URL_TTL_SECS: u64 = 3600 * 24 * 5;

pub struct Reconciler {
    request_store: Arc<dyn RequestStore>,
    task_store: Arc<dyn TaskStore>,
    blob_store: Arc<dyn BlobStore>,
    notifier: Arc<dyn Notifier>,
    sc_client: SourceControlClient,
    template: String,
}

impl Reconciler {
    pub fn new(
        request_store: Arc<dyn RequestStore>,
        task_store: Arc<dyn TaskStore>,
        blob_store: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
        sc_client: SourceControlClient,
        template: String,
    ) -> Self {
        Self {
            request_store,
            task_store,
            blob_store,
            notifier,
            sc_client,
            template,
        }
    }

    /// Re-runs the progress check for one request; a no-op unless every task
    /// has landed and the request hasn't already been finalised (Testable
    /// Property 9).
    #[instrument(skip(self), fields(request_id = %key.request_id, commit_id = %key.commit_id))]
    pub async fn check_and_maybe_report(&self, key: &RequestKey) -> OrchestratorResult<()> {
        let Some(record) = self.request_store.get(key).await? else {
            return Ok(());
        };
        if record.task_status == TaskStatus::Complete {
            return Ok(());
        }
        if record.task_complete + record.task_failure < record.task_total {
            return Ok(());
        }
        self.generate_report_and_notify(key).await
    }

    async fn collect_report_entries(&self, request_id: &str) -> OrchestratorResult<Vec<ReportEntry>> {
        let tasks = self.task_store.list_by_request(request_id).await?;
        let mut entries = Vec::new();
        for task in tasks.iter().filter(|t| t.succ == Some(true)) {
            let Some(blob_key) = &task.data else { continue };
            let Some(bytes) = self.blob_store.get(blob_key).await? else {
                warn!(blob_key, "successful task missing its result blob, skipping");
                continue;
            };
            let result: ResultObject = match serde_json::from_slice(&bytes) {
                Ok(r) => r,
                Err(e) => {
                    warn!(blob_key, error = %e, "result blob failed to parse, skipping");
                    continue;
                }
            };
            if !result.content.is_empty() {
                entries.push(ReportEntry {
                    rule: result.rule,
                    content: result.content,
                });
            }
        }
        Ok(entries)
    }

    async fn generate_report_and_notify(&self, key: &RequestKey) -> OrchestratorResult<()> {
        let Some(record) = self.request_store.get(key).await? else {
            return Ok(());
        };

        let entries = self.collect_report_entries(&record.request_id).await?;

        let title = format!("{}代码审核报告", record.project_name);
        let subtitle = format!("检测时间: {}", Utc::now().format("%Y年%m月%d日 %H时%M分%S秒"));
        let report = ReportData {
            title: title.clone(),
            subtitle: subtitle.clone(),
            data: entries,
        };

        let html = template::render_report_html(&self.template, &report);
        let slug = slug::slugify(&record.project_name);
        let blob_key = format!("report/{slug}/{}/index.html", record.commit_id);
        self.blob_store.put(&blob_key, html.into_bytes(), "text/html").await?;
        let report_url = self.blob_store.signed_url(&blob_key, REPORT_URL_TTL_SECS).await?;

        let transitioned = self.request_store.try_complete(key, &blob_key, &report_url).await?;
        if !transitioned {
            // Another reconcile call (e.g. cron racing a direct trigger) already
            // finalised this request; its notification/comment already fired.
            return Ok(());
        }

        info!(report_url, "report generated");

        let context = serde_json::json!({
            "commit_id": record.commit_id,
            "request_id": record.request_id,
            "project_id": record.project_id,
            "project_name": record.project_name,
            "source": record.source,
        });
        let notification = NotificationMessage {
            title,
            subtitle,
            report_url: report_url.clone(),
            data: report.data.clone(),
            context,
        };
        if let Err(e) = self.notifier.publish(notification).await {
            warn!(error = %e, "failed to publish notification, continuing");
        }

        if record.source == Source::GitHub {
            if let Some(pr_number) = record.pr.pr_number {
                match self.sc_client.init_context(&record.project_id).await {
                    Ok(handle) => {
                        let posted = source_control::comment::post_summary_comment(
                            &self.sc_client,
                            &handle,
                            &source_control::PrNumber::Int(pr_number),
                            &report_url,
                            &report.data,
                        )
                        .await;
                        if !posted {
                            warn!("failed to post PR summary comment");
                        }
                    }
                    Err(e) => warn!(error = %e, "failed to init repo context for PR comment"),
                }
            }
        }

        Ok(())
    }

    /// Recovery sweep (§4.F): re-runs the progress check for every request
    /// still open in the last 24 hours, isolating failures per request so one
    /// stuck record doesn't block the rest of the sweep.
    #[instrument(skip(self))]
    pub async fn cron_sweep(&self) -> OrchestratorResult<()> {
        let since = Utc::now() - chrono::Duration::hours(24);
        let records = self.request_store.scan_incomplete_since(since).await?;
        info!(count = records.len(), "cron sweep scanning open requests");
        for record in records {
            let key = RequestKey {
                commit_id: record.commit_id.clone(),
                request_id: record.request_id.clone(),
            };
            if let Err(e) = self.check_and_maybe_report(&key).await {
                warn!(error = %e, request_id = %record.request_id, "cron sweep failed to reconcile request, isolating");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ReconcileTrigger for Reconciler {
    async fn reconcile(&self, key: &RequestKey) -> OrchestratorResult<()> {
        self.check_and_maybe_report(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::DateTime;
    use orchestrator_core::model::{EventType, Finding, RequestRecord, TaskRecord};
    use source_control::{ProviderKind, SourceControlConfig};
    use tokio::sync::RwLock;

    #[derive(Default)]
    struct FakeRequestStore {
        records: RwLock<HashMap<(String, String), RequestRecord>>,
    }

    #[async_trait]
    impl RequestStore for FakeRequestStore {
        async fn put(&self, record: RequestRecord) -> OrchestratorResult<()> {
            self.records.write().await.insert((record.commit_id.clone(), record.request_id.clone()), record);
            Ok(())
        }

        async fn get(&self, key: &RequestKey) -> OrchestratorResult<Option<RequestRecord>> {
            Ok(self.records.read().await.get(&(key.commit_id.clone(), key.request_id.clone())).cloned())
        }

        async fn init_dispatch(&self, _key: &RequestKey, _task_total: u32) -> OrchestratorResult<()> {
            Ok(())
        }

        async fn patch_project_name(&self, _key: &RequestKey, _project_name: &str) -> OrchestratorResult<()> {
            Ok(())
        }

        async fn incr_complete(&self, key: &RequestKey) -> OrchestratorResult<RequestRecord> {
            let mut guard = self.records.write().await;
            let record = guard.get_mut(&(key.commit_id.clone(), key.request_id.clone())).unwrap();
            record.task_complete += 1;
            Ok(record.clone())
        }

        async fn incr_failure(&self, key: &RequestKey) -> OrchestratorResult<RequestRecord> {
            let mut guard = self.records.write().await;
            let record = guard.get_mut(&(key.commit_id.clone(), key.request_id.clone())).unwrap();
            record.task_failure += 1;
            Ok(record.clone())
        }

        async fn try_complete(&self, key: &RequestKey, report_s3key: &str, report_url: &str) -> OrchestratorResult<bool> {
            let mut guard = self.records.write().await;
            let Some(record) = guard.get_mut(&(key.commit_id.clone(), key.request_id.clone())) else {
                return Ok(false);
            };
            if record.task_status == TaskStatus::Complete {
                return Ok(false);
            }
            record.task_status = TaskStatus::Complete;
            record.report_s3key = Some(report_s3key.to_string());
            record.report_url = Some(report_url.to_string());
            Ok(true)
        }

        async fn scan_incomplete_since(&self, _since: DateTime<Utc>) -> OrchestratorResult<Vec<RequestRecord>> {
            Ok(self.records.read().await.values().cloned().collect())
        }
    }

    #[derive(Default)]
    struct FakeTaskStore {
        tasks: RwLock<HashMap<String, Vec<TaskRecord>>>,
    }

    #[async_trait]
    impl TaskStore for FakeTaskStore {
        async fn put(&self, record: TaskRecord) -> OrchestratorResult<()> {
            self.tasks.write().await.entry(record.request_id.clone()).or_default().push(record);
            Ok(())
        }

        async fn list_by_request(&self, request_id: &str) -> OrchestratorResult<Vec<TaskRecord>> {
            Ok(self.tasks.read().await.get(request_id).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct FakeBlobStore {
        blobs: RwLock<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl BlobStore for FakeBlobStore {
        async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> OrchestratorResult<()> {
            self.blobs.write().await.insert(key.to_string(), bytes);
            Ok(())
        }

        async fn get(&self, key: &str) -> OrchestratorResult<Option<Vec<u8>>> {
            Ok(self.blobs.read().await.get(key).cloned())
        }

        async fn signed_url(&self, key: &str, _ttl_secs: u64) -> OrchestratorResult<String> {
            Ok(format!("file://{key}"))
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        published: Mutex<Vec<NotificationMessage>>,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn publish(&self, message: NotificationMessage) -> OrchestratorResult<()> {
            self.published.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn make_record(request_id: &str, commit_id: &str, total: u32, complete: u32, failure: u32) -> RequestRecord {
        let mut record = RequestRecord::new(
            commit_id.to_string(),
            request_id.to_string(),
            Source::GitLab,
            "proj-1".to_string(),
            "Demo Project".to_string(),
            "https://example.com/demo.git".to_string(),
            EventType::Push,
            "main".to_string(),
            "".to_string(),
            Utc::now(),
        );
        record.task_status = TaskStatus::Processing;
        record.task_total = total;
        record.task_complete = complete;
        record.task_failure = failure;
        record
    }

    fn test_reconciler(
        request_store: Arc<FakeRequestStore>,
        task_store: Arc<FakeTaskStore>,
        blob_store: Arc<FakeBlobStore>,
        notifier: Arc<FakeNotifier>,
    ) -> Reconciler {
        let sc_client = SourceControlClient::new(ProviderKind::GitLab, &SourceControlConfig::default(), "token".to_string());
        Reconciler::new(request_store, task_store, blob_store, notifier, sc_client, DEFAULT_TEMPLATE.to_string())
    }

    #[tokio::test]
    async fn progress_check_is_a_no_op_while_work_remains() {
        let request_store = Arc::new(FakeRequestStore::default());
        let key = RequestKey { commit_id: "c1".to_string(), request_id: "r1".to_string() };
        request_store.put(make_record("r1", "c1", 3, 1, 0)).await.unwrap();
        let reconciler = test_reconciler(
            request_store.clone(),
            Arc::new(FakeTaskStore::default()),
            Arc::new(FakeBlobStore::default()),
            Arc::new(FakeNotifier::default()),
        );

        reconciler.check_and_maybe_report(&key).await.unwrap();

        let record = request_store.get(&key).await.unwrap().unwrap();
        assert_eq!(record.task_status, TaskStatus::Processing);
        assert!(record.report_url.is_none());
    }

    #[tokio::test]
    async fn completing_the_last_task_generates_a_report_and_notifies() {
        let request_store = Arc::new(FakeRequestStore::default());
        let task_store = Arc::new(FakeTaskStore::default());
        let blob_store = Arc::new(FakeBlobStore::default());
        let notifier = Arc::new(FakeNotifier::default());
        let key = RequestKey { commit_id: "c1".to_string(), request_id: "r1".to_string() };

        request_store.put(make_record("r1", "c1", 1, 1, 0)).await.unwrap();

        let mut task = TaskRecord::new("r1".to_string(), 1, "all".to_string(), "claude-3".to_string(), Utc::now());
        task.succ = Some(true);
        task.data = Some("result/r1/1.json".to_string());
        task_store.put(task).await.unwrap();

        let result = ResultObject {
            rule: "style".to_string(),
            model: "claude-3".to_string(),
            content: vec![Finding { title: "t".to_string(), content: "c".to_string(), filepath: None }],
            prompt_system: "sys".to_string(),
            prompt_user: vec!["hi".to_string()],
            payload: serde_json::json!({}),
            reasoning: None,
            start_time: Utc::now(),
            end_time: Utc::now(),
            timecost_secs: 0.1,
        };
        blob_store
            .put("result/r1/1.json", serde_json::to_vec(&result).unwrap(), "application/json")
            .await
            .unwrap();

        let reconciler = test_reconciler(request_store.clone(), task_store, blob_store, notifier.clone());
        reconciler.check_and_maybe_report(&key).await.unwrap();

        let record = request_store.get(&key).await.unwrap().unwrap();
        assert_eq!(record.task_status, TaskStatus::Complete);
        assert!(record.report_url.is_some());
        assert_eq!(notifier.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reconciling_an_already_complete_request_is_idempotent() {
        let request_store = Arc::new(FakeRequestStore::default());
        let key = RequestKey { commit_id: "c1".to_string(), request_id: "r1".to_string() };
        let mut record = make_record("r1", "c1", 1, 1, 0);
        record.task_status = TaskStatus::Complete;
        request_store.put(record).await.unwrap();
        let notifier = Arc::new(FakeNotifier::default());

        let reconciler = test_reconciler(
            request_store.clone(),
            Arc::new(FakeTaskStore::default()),
            Arc::new(FakeBlobStore::default()),
            notifier.clone(),
        );

        reconciler.check_and_maybe_report(&key).await.unwrap();
        assert!(notifier.published.lock().unwrap().is_empty());
    }
}
