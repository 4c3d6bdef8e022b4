use std::sync::Arc;

use tracing::{error, info, warn};

use reportgen_core::generator::BoxFuture;
use reportgen_core::models::report::{Report, ReportStatus};
use reportgen_core::models::request::GenerationRequest;
use reportgen_notify::Notifier;
use reportgen_queue::MessageProcessor;
use reportgen_storage::Uploader;

use crate::cleanup::remove_local_files;
use crate::error::EngineError;
use crate::metrics::{self, Metric, MetricsSink};
use crate::request;
use crate::usecase::{GenerateUseCase, ReportTypeRegistry};

/// Runs the report pipeline for one queue payload:
/// generate, upload, notify (when requested) and finish.
pub struct ReportProcessor {
    registry: Arc<ReportTypeRegistry>,
    uploader: Arc<dyn Uploader>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<dyn MetricsSink>,
}

impl ReportProcessor {
    pub fn new(
        registry: Arc<ReportTypeRegistry>,
        uploader: Arc<dyn Uploader>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            registry,
            uploader,
            notifier,
            metrics,
        }
    }

    pub async fn process(&self, payload: &str) -> Result<(), EngineError> {
        let request = request::parse(payload)?;
        let use_case = self.registry.resolve(&request.report_type)?;

        let report = use_case.generate(&request.team_info, &request.data).await?;
        let result = self.deliver(use_case.as_ref(), &request, &report).await;
        remove_local_files(&report.files).await;

        if result.is_ok() {
            info!(
                report_id = %report.id,
                report_type = %report.report_type(),
                notified = request.auto_send,
                "report processed"
            );
        }
        result
    }

    async fn deliver(
        &self,
        use_case: &dyn GenerateUseCase,
        request: &GenerationRequest,
        report: &Report,
    ) -> Result<(), EngineError> {
        let tags = vec![metrics::report_type_tag(report.report_type())];

        if let Err(e) = self.uploader.upload(&report.files).await {
            error!(report_id = %report.id, error = %e, "error uploading report files");
            mark_failed(use_case, &report.id).await;
            return Err(e.into());
        }
        self.metrics.push(Metric::count(metrics::REPORT_GENERATED, tags.clone()));

        if request.auto_send {
            let notification = &report.notification;
            if let Err(e) = self
                .notifier
                .notify(
                    &notification.subject,
                    &notification.body,
                    notification.format,
                    &request.team_info.recipients,
                )
                .await
            {
                error!(report_id = %report.id, error = %e, "error sending report notification");
                mark_failed(use_case, &report.id).await;
                return Err(e.into());
            }
            self.metrics.push(Metric::count(metrics::REPORT_NOTIFIED, tags));
        }

        use_case.finish(&report.id, ReportStatus::Finished).await
    }
}

impl MessageProcessor for ReportProcessor {
    type Error = EngineError;

    fn process_message<'a>(&'a self, payload: &'a str) -> BoxFuture<'a, Result<(), EngineError>> {
        Box::pin(self.process(payload))
    }

    fn is_transient(&self, err: &EngineError) -> bool {
        err.is_transient()
    }
}

async fn mark_failed(use_case: &dyn GenerateUseCase, id: &str) {
    if let Err(e) = use_case.finish(id, ReportStatus::Failed).await {
        warn!(report_id = %id, error = %e, "error marking report as failed");
    }
}
