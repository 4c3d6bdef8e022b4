mod common;

use std::sync::Arc;
use std::sync::Mutex;

use common::{FakeGenerator, FakeNotifier, FakeUploader, Harness, SCAN_REQUEST, artifact};
use reportgen_core::generator::BoxFuture;
use reportgen_core::models::report::{FileInfo, NotificationFormat, ReportStatus};
use reportgen_engine::EngineError;
use reportgen_engine::metrics::{REPORT_GENERATED, REPORT_NOTIFIED};
use reportgen_queue::error::QueueError;
use reportgen_queue::{ConsumerConfig, MessageQueue, QueueMessage, ReceiveOptions, Worker};

#[tokio::test]
async fn scan_request_is_generated_notified_and_finished() {
    let harness = Harness::succeeding();

    harness.processor.process(SCAN_REQUEST).await.unwrap();

    let report = harness.repository.latest().await;
    assert_eq!(report.status, ReportStatus::Finished);
    assert_eq!(harness.repository.terminal_writes(), 1);

    assert_eq!(harness.metrics.names(), vec![REPORT_GENERATED, REPORT_NOTIFIED]);
    let pushed = harness.metrics.pushed.lock().unwrap().clone();
    assert!(pushed.iter().all(|m| m.tags == vec!["reporttype:scan"] && m.value == 1.0));

    let sent = harness.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Scan report");
    assert_eq!(sent[0].format, NotificationFormat::Html);
    assert_eq!(sent[0].recipients, vec!["ops@example.com"]);
}

#[tokio::test]
async fn without_auto_send_nothing_is_notified() {
    let harness = Harness::succeeding();
    let payload = SCAN_REQUEST.replace(r#""auto_send": true"#, r#""auto_send": false"#);

    harness.processor.process(&payload).await.unwrap();

    assert_eq!(harness.repository.latest().await.status, ReportStatus::Finished);
    assert_eq!(harness.metrics.names(), vec![REPORT_GENERATED]);
    assert!(harness.notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn notify_failure_marks_report_failed() {
    let harness = Harness::new(
        FakeGenerator::succeeding(),
        FakeUploader::default(),
        FakeNotifier {
            fail: true,
            ..Default::default()
        },
    );

    let err = harness.processor.process(SCAN_REQUEST).await.unwrap_err();

    assert!(matches!(err, EngineError::Notify(_)));
    assert!(err.is_transient());
    assert_eq!(harness.repository.latest().await.status, ReportStatus::Failed);
    assert_eq!(harness.repository.terminal_writes(), 1);
    assert_eq!(harness.metrics.names(), vec![REPORT_GENERATED]);
}

#[tokio::test]
async fn upload_failure_marks_report_failed_before_any_metric() {
    let harness = Harness::new(
        FakeGenerator::succeeding(),
        FakeUploader {
            fail: true,
            ..Default::default()
        },
        FakeNotifier::default(),
    );

    let err = harness.processor.process(SCAN_REQUEST).await.unwrap_err();

    assert!(matches!(err, EngineError::Upload(_)));
    assert_eq!(harness.repository.latest().await.status, ReportStatus::Failed);
    assert!(harness.metrics.names().is_empty());
    assert!(harness.notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn generation_failure_returns_error_without_metrics() {
    let harness = Harness::new(
        FakeGenerator::failing("template exploded"),
        FakeUploader::default(),
        FakeNotifier::default(),
    );

    let err = harness.processor.process(SCAN_REQUEST).await.unwrap_err();

    assert!(matches!(err, EngineError::Generation(_)));
    assert_eq!(harness.repository.latest().await.status, ReportStatus::Failed);
    assert_eq!(harness.repository.terminal_writes(), 1);
    assert!(harness.metrics.names().is_empty());
    assert!(harness.uploader.uploaded.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_team_id_is_rejected_before_side_effects() {
    let harness = Harness::succeeding();
    let payload = r#"{"type":"scan","team_info":{"name":"Ops"},"data":{"scan_id":"9","program_name":"p"},"auto_send":true}"#;

    let err = harness.processor.process(payload).await.unwrap_err();

    assert!(matches!(err, EngineError::InvalidRequest(_)));
    assert!(!err.is_transient());
    assert!(harness.repository.inner.is_empty().await);
    assert!(harness.metrics.names().is_empty());
    assert_eq!(harness.generator.calls(), 0);
}

#[tokio::test]
async fn unknown_type_is_unsupported() {
    let harness = Harness::succeeding();
    let payload = SCAN_REQUEST.replace(r#""type": "scan""#, r#""type": "invoice""#);

    let err = harness.processor.process(&payload).await.unwrap_err();

    assert!(matches!(err, EngineError::UnsupportedReportType(ref t) if t == "invoice"));
    assert!(!err.is_transient());
    assert!(harness.repository.inner.is_empty().await);
}

#[tokio::test]
async fn local_files_are_removed_after_delivery() {
    let output = tempfile::tempdir().unwrap();
    let job_dir = output.path().join("job-1");
    std::fs::create_dir_all(&job_dir).unwrap();
    let report_path = job_dir.join("report.html");
    std::fs::write(&report_path, "<html></html>").unwrap();

    let files = vec![FileInfo {
        local_path: report_path.clone(),
        dest_bucket: "reports".to_string(),
        dest_path: "scan/9/report.html".to_string(),
    }];
    let harness = Harness::new(
        FakeGenerator::with_result(Ok(artifact(files.clone()))),
        FakeUploader::default(),
        FakeNotifier {
            fail: true,
            ..Default::default()
        },
    );

    harness.processor.process(SCAN_REQUEST).await.unwrap_err();

    assert_eq!(*harness.uploader.uploaded.lock().unwrap(), files);
    assert!(!report_path.exists());
    assert!(!job_dir.exists());
    assert!(output.path().exists());
}

/// One-shot queue holding a single message.
struct SingleMessageQueue {
    message: Mutex<Option<QueueMessage>>,
    deleted: Mutex<Vec<String>>,
}

impl MessageQueue for SingleMessageQueue {
    fn receive(&self, _options: ReceiveOptions) -> BoxFuture<'_, Result<Vec<QueueMessage>, QueueError>> {
        Box::pin(async move { Ok(self.message.lock().unwrap().take().into_iter().collect()) })
    }

    fn delete<'a>(&'a self, message: &'a QueueMessage) -> BoxFuture<'a, Result<(), QueueError>> {
        Box::pin(async move {
            self.deleted.lock().unwrap().push(message.receipt_handle.clone());
            Ok(())
        })
    }
}

#[tokio::test]
async fn queue_message_is_processed_and_deleted_once() {
    let harness = Harness::succeeding();
    let body = serde_json::json!({ "Type": "Notification", "Message": SCAN_REQUEST }).to_string();
    let queue = Arc::new(SingleMessageQueue {
        message: Mutex::new(Some(QueueMessage {
            message_id: Some("m-1".to_string()),
            receipt_handle: "rh-1".to_string(),
            body: Some(body),
            ..Default::default()
        })),
        deleted: Mutex::new(Vec::new()),
    });

    let Harness {
        processor,
        repository,
        metrics,
        ..
    } = harness;
    let mut worker = Worker::new(0, queue.clone(), Arc::new(processor), ConsumerConfig::default());
    assert_eq!(worker.poll_once().await, Some(1));
    assert_eq!(worker.poll_once().await, Some(0));

    assert_eq!(*queue.deleted.lock().unwrap(), vec!["rh-1"]);
    assert_eq!(repository.latest().await.status, ReportStatus::Finished);
    assert_eq!(metrics.names(), vec![REPORT_GENERATED, REPORT_NOTIFIED]);
}
