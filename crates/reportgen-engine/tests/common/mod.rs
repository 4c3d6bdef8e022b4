#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reportgen_core::error::CoreError;
use reportgen_core::generator::{BoxFuture, ReportGenerator};
use reportgen_core::models::artifact::Artifact;
use reportgen_core::models::report::{FileInfo, NotificationFormat, Report, ReportStatus, ReportType};
use reportgen_core::models::request::TypedRequest;
use reportgen_core::models::team::TeamInfo;
use reportgen_engine::{
    GenerateUseCase, LifecycleUseCase, Metric, MetricsSink, ReportProcessor, ReportTypeRegistry,
};
use reportgen_notify::Notifier;
use reportgen_notify::error::NotifyError;
use reportgen_storage::error::{StorageError, UploadError};
use reportgen_storage::{MemoryReportRepository, ReportRepository, Uploader};

pub const SCAN_REQUEST: &str = r#"{
    "type": "scan",
    "team_info": { "id": "1", "name": "Ops", "recipients": ["ops@example.com"] },
    "data": { "scan_id": "9", "program_name": "p" },
    "auto_send": true
}"#;

/// Memory repository that records every stored report.
#[derive(Default)]
pub struct RecordingRepository {
    pub inner: MemoryReportRepository,
    saves: Mutex<Vec<Report>>,
    attempts: AtomicUsize,
    fail_attempt: Option<usize>,
}

impl RecordingRepository {
    /// Fails the `attempt`-th save (1-based) with a put error.
    pub fn failing_save(attempt: usize) -> Self {
        Self {
            fail_attempt: Some(attempt),
            ..Self::default()
        }
    }

    pub fn statuses(&self) -> Vec<ReportStatus> {
        self.saves.lock().unwrap().iter().map(|r| r.status).collect()
    }

    pub fn saved_ids(&self) -> Vec<String> {
        self.saves.lock().unwrap().iter().map(|r| r.id.clone()).collect()
    }

    /// Current row of the most recently saved report.
    pub async fn latest(&self) -> Report {
        let id = self.saved_ids().pop().expect("nothing saved");
        self.inner.get_report(&id).await.unwrap()
    }

    pub fn terminal_writes(&self) -> usize {
        self.statuses().iter().filter(|s| s.is_terminal()).count()
    }
}

impl ReportRepository for RecordingRepository {
    fn save_report<'a>(&'a self, report: &'a Report) -> BoxFuture<'a, Result<Report, StorageError>> {
        Box::pin(async move {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_attempt == Some(attempt) {
                return Err(StorageError::PutObject("bucket unavailable".to_string()));
            }
            let stored = self.inner.save_report(report).await?;
            self.saves.lock().unwrap().push(stored.clone());
            Ok(stored)
        })
    }

    fn get_report<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Report, StorageError>> {
        self.inner.get_report(id)
    }
}

pub struct FakeGenerator {
    pub artifact: Result<Artifact, String>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn succeeding() -> Self {
        Self::with_result(Ok(artifact(Vec::new())))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_result(Err(message.to_string()))
    }

    pub fn with_result(artifact: Result<Artifact, String>) -> Self {
        Self {
            artifact,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReportGenerator for FakeGenerator {
    fn generate<'a>(
        &'a self,
        _team: &'a TeamInfo,
        _request: &'a TypedRequest,
    ) -> BoxFuture<'a, Result<Artifact, CoreError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.artifact.clone().map_err(CoreError::Generation)
        })
    }
}

pub fn artifact(files: Vec<FileInfo>) -> Artifact {
    Artifact {
        files,
        email_subject: "Scan report".to_string(),
        email_body: "<p>done</p>".to_string(),
        format: NotificationFormat::Html,
        report_url: Some("https://reports.example.com/9/report.html".to_string()),
        report_json_url: None,
        risk: Some(3),
    }
}

#[derive(Default)]
pub struct FakeUploader {
    pub fail: bool,
    pub uploaded: Mutex<Vec<FileInfo>>,
}

impl Uploader for FakeUploader {
    fn upload<'a>(&'a self, files: &'a [FileInfo]) -> BoxFuture<'a, Result<(), UploadError>> {
        Box::pin(async move {
            if self.fail {
                return Err(UploadError::OpenFile {
                    path: "missing.html".to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            self.uploaded.lock().unwrap().extend_from_slice(files);
            Ok(())
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub subject: String,
    pub body: String,
    pub format: NotificationFormat,
    pub recipients: Vec<String>,
}

#[derive(Default)]
pub struct FakeNotifier {
    pub fail: bool,
    pub sent: Mutex<Vec<SentEmail>>,
}

impl Notifier for FakeNotifier {
    fn notify<'a>(
        &'a self,
        subject: &'a str,
        body: &'a str,
        format: NotificationFormat,
        recipients: &'a [String],
    ) -> BoxFuture<'a, Result<(), NotifyError>> {
        Box::pin(async move {
            if self.fail {
                return Err(NotifyError::Send("mailbox unavailable".to_string()));
            }
            self.sent.lock().unwrap().push(SentEmail {
                subject: subject.to_string(),
                body: body.to_string(),
                format,
                recipients: recipients.to_vec(),
            });
            Ok(())
        })
    }
}

#[derive(Default)]
pub struct RecordingMetrics {
    pub pushed: Mutex<Vec<Metric>>,
}

impl RecordingMetrics {
    pub fn names(&self) -> Vec<String> {
        self.pushed.lock().unwrap().iter().map(|m| m.name.clone()).collect()
    }
}

impl MetricsSink for RecordingMetrics {
    fn push(&self, metric: Metric) {
        self.pushed.lock().unwrap().push(metric);
    }
}

pub struct Harness {
    pub processor: ReportProcessor,
    pub repository: Arc<RecordingRepository>,
    pub generator: Arc<FakeGenerator>,
    pub uploader: Arc<FakeUploader>,
    pub notifier: Arc<FakeNotifier>,
    pub metrics: Arc<RecordingMetrics>,
}

impl Harness {
    pub fn new(generator: FakeGenerator, uploader: FakeUploader, notifier: FakeNotifier) -> Self {
        let repository = Arc::new(RecordingRepository::default());
        let generator = Arc::new(generator);
        let uploader = Arc::new(uploader);
        let notifier = Arc::new(notifier);
        let metrics = Arc::new(RecordingMetrics::default());

        let use_cases = ReportType::ALL.map(|report_type| {
            Arc::new(LifecycleUseCase::new(
                report_type,
                generator.clone(),
                repository.clone(),
            )) as Arc<dyn GenerateUseCase>
        });
        let processor = ReportProcessor::new(
            Arc::new(ReportTypeRegistry::new(use_cases)),
            uploader.clone(),
            notifier.clone(),
            metrics.clone(),
        );

        Self {
            processor,
            repository,
            generator,
            uploader,
            notifier,
            metrics,
        }
    }

    pub fn succeeding() -> Self {
        Self::new(FakeGenerator::succeeding(), FakeUploader::default(), FakeNotifier::default())
    }
}
