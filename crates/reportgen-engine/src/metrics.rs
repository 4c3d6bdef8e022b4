use serde::Serialize;
use tracing::info;

use reportgen_core::models::report::ReportType;

pub const REPORT_GENERATED: &str = "reportgen.report.generated";
pub const REPORT_NOTIFIED: &str = "reportgen.report.notified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Count,
}

/// An operational counter sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    pub kind: MetricKind,
    pub value: f64,
    pub tags: Vec<String>,
}

impl Metric {
    pub fn count(name: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: MetricKind::Count,
            value: 1.0,
            tags,
        }
    }
}

pub fn report_type_tag(report_type: ReportType) -> String {
    format!("reporttype:{report_type}")
}

/// Fire-and-forget metrics destination.
pub trait MetricsSink: Send + Sync {
    fn push(&self, metric: Metric);
}

/// Emits metrics as structured log events so the log pipeline can turn
/// them into counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    fn push(&self, metric: Metric) {
        info!(
            metric.name = %metric.name,
            metric.kind = ?metric.kind,
            metric.value = metric.value,
            metric.tags = ?metric.tags,
            "metric"
        );
    }
}
