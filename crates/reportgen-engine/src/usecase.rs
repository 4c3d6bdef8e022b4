use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use reportgen_core::generator::{BoxFuture, ReportGenerator};
use reportgen_core::models::report::{Report, ReportStatus, ReportType};
use reportgen_core::models::request::TypedRequest;
use reportgen_core::models::team::TeamInfo;
use reportgen_storage::ReportRepository;

use crate::cleanup;
use crate::error::EngineError;
use crate::heartbeat;

/// The generate / finish capability of one report type.
pub trait GenerateUseCase: Send + Sync {
    fn report_type(&self) -> ReportType;

    /// Decode `data`, persist a `GENERATING` report, run the generator and
    /// store its output. Returns the stored report.
    fn generate<'a>(
        &'a self,
        team: &'a TeamInfo,
        data: &'a serde_json::Value,
    ) -> BoxFuture<'a, Result<Report, EngineError>>;

    /// Move a report to a terminal status. Idempotent for the same status.
    fn finish<'a>(&'a self, id: &'a str, status: ReportStatus) -> BoxFuture<'a, Result<(), EngineError>>;
}

/// Report lifecycle backed by a generator and a repository.
pub struct LifecycleUseCase {
    report_type: ReportType,
    generator: Arc<dyn ReportGenerator>,
    repository: Arc<dyn ReportRepository>,
    heartbeat: Duration,
}

impl LifecycleUseCase {
    pub fn new(
        report_type: ReportType,
        generator: Arc<dyn ReportGenerator>,
        repository: Arc<dyn ReportRepository>,
    ) -> Self {
        Self {
            report_type,
            generator,
            repository,
            heartbeat: heartbeat::DEFAULT_INTERVAL,
        }
    }

    pub fn with_heartbeat(mut self, interval: Duration) -> Self {
        self.heartbeat = interval;
        self
    }

    async fn run_generation(
        &self,
        team: &TeamInfo,
        data: &serde_json::Value,
    ) -> Result<Report, EngineError> {
        let request = TypedRequest::decode(self.report_type, data)
            .map_err(|e| EngineError::InvalidRequest(e.to_string()))?;

        let mut report = self.repository.save_report(&Report::for_request(&request)).await?;
        info!(
            report_id = %report.id,
            report_type = %self.report_type,
            natural_key = %report.natural_key(),
            team_id = %team.id,
            "report generation started"
        );

        let generated = heartbeat::while_running(
            self.repository.as_ref(),
            &report,
            self.heartbeat,
            self.generator.generate(team, &request),
        )
        .await;

        let artifact = match generated {
            Ok(artifact) => artifact,
            Err(e) => {
                error!(report_id = %report.id, error = %e, "report generation failed");
                self.fail(&report.id).await;
                return Err(EngineError::Generation(e.to_string()));
            }
        };

        report.apply_artifact(&artifact, &team.recipients);
        match self.repository.save_report(&report).await {
            Ok(saved) => Ok(saved),
            Err(e) => {
                error!(report_id = %report.id, error = %e, "error saving generated report");
                cleanup::remove_local_files(&artifact.files).await;
                self.fail(&report.id).await;
                Err(e.into())
            }
        }
    }

    async fn finish_report(&self, id: &str, status: ReportStatus) -> Result<(), EngineError> {
        let mut report = self.repository.get_report(id).await?;

        if !status.is_terminal() || !report.status.can_transition_to(status) {
            return Err(EngineError::InvalidTransition {
                id: id.to_string(),
                from: report.status,
                to: status,
            });
        }
        if report.status == status {
            return Ok(());
        }

        report.status = status;
        self.repository.save_report(&report).await?;
        info!(report_id = %id, status = %status, "report finished");
        Ok(())
    }

    /// Best-effort `FAILED` transition on an error path.
    async fn fail(&self, id: &str) {
        if let Err(e) = self.finish_report(id, ReportStatus::Failed).await {
            warn!(report_id = %id, error = %e, "error marking report as failed");
        }
    }
}

impl GenerateUseCase for LifecycleUseCase {
    fn report_type(&self) -> ReportType {
        self.report_type
    }

    fn generate<'a>(
        &'a self,
        team: &'a TeamInfo,
        data: &'a serde_json::Value,
    ) -> BoxFuture<'a, Result<Report, EngineError>> {
        Box::pin(self.run_generation(team, data))
    }

    fn finish<'a>(&'a self, id: &'a str, status: ReportStatus) -> BoxFuture<'a, Result<(), EngineError>> {
        Box::pin(self.finish_report(id, status))
    }
}

/// Use cases keyed by report type. Built once at startup.
#[derive(Default)]
pub struct ReportTypeRegistry {
    use_cases: HashMap<ReportType, Arc<dyn GenerateUseCase>>,
}

impl ReportTypeRegistry {
    /// Later entries replace earlier ones for the same type.
    pub fn new(use_cases: impl IntoIterator<Item = Arc<dyn GenerateUseCase>>) -> Self {
        let use_cases = use_cases
            .into_iter()
            .map(|use_case| (use_case.report_type(), use_case))
            .collect();
        Self { use_cases }
    }

    /// Resolve the use case for a request's type tag.
    pub fn resolve(&self, report_type: &str) -> Result<&Arc<dyn GenerateUseCase>, EngineError> {
        report_type
            .parse::<ReportType>()
            .ok()
            .and_then(|report_type| self.use_cases.get(&report_type))
            .ok_or_else(|| EngineError::UnsupportedReportType(report_type.to_string()))
    }

    pub fn report_types(&self) -> Vec<ReportType> {
        let mut types: Vec<ReportType> = self.use_cases.keys().copied().collect();
        types.sort_by_key(|t| t.as_str());
        types
    }
}
