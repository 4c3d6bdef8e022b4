use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tera::Tera;
use tracing::{debug, warn};
use uuid::Uuid;

use reportgen_core::error::CoreError;
use reportgen_core::generator::{BoxFuture, ReportGenerator};
use reportgen_core::models::artifact::Artifact;
use reportgen_core::models::report::{FileInfo, NotificationFormat, Report};
use reportgen_core::models::request::TypedRequest;
use reportgen_core::models::team::TeamInfo;
use reportgen_core::s3_keys;

use crate::error::ExportError;
use crate::render;

const REPORT_FILE: &str = "report.html";
const REQUEST_FILE: &str = "report.json";

/// A template given inline or as a path to a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateSource {
    File { path: PathBuf },
    Inline(String),
}

impl TemplateSource {
    fn load(&self) -> Result<String, ExportError> {
        match self {
            TemplateSource::Inline(content) => Ok(content.clone()),
            TemplateSource::File { path } => {
                std::fs::read_to_string(path).map_err(|source| ExportError::TemplateRead {
                    path: path.display().to_string(),
                    source,
                })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateGeneratorConfig {
    pub subject_template: TemplateSource,
    pub body_template: TemplateSource,
    pub report_template: TemplateSource,
    #[serde(default)]
    pub format: NotificationFormat,
    /// Destination bucket for the artifacts.
    pub bucket: String,
    #[serde(default)]
    pub key_prefix: String,
    /// Public base URL the bucket is served from, used for report links.
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Also ship the decoded request as JSON next to the report.
    #[serde(default)]
    pub emit_json: bool,
}

fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join("reportgen")
}

/// Renders a report file plus its email with Tera.
///
/// Template context: `team`, `request`, `report_type`, `generated_at`, and
/// `report_url` / `report_json_url` when a public URL is configured.
pub struct TemplateGenerator {
    config: TemplateGeneratorConfig,
    tera: Tera,
}

impl TemplateGenerator {
    /// Load and compile all templates. Fails on the first bad template.
    pub fn new(config: TemplateGeneratorConfig) -> Result<Self, ExportError> {
        let subject = config.subject_template.load()?;
        let body = config.body_template.load()?;
        let report = config.report_template.load()?;

        let autoescape = match config.format {
            NotificationFormat::Html => vec![render::BODY, render::REPORT],
            NotificationFormat::Text => vec![render::REPORT],
        };
        let tera = render::compile(
            &[
                (render::SUBJECT, subject.as_str()),
                (render::BODY, body.as_str()),
                (render::REPORT, report.as_str()),
            ],
            autoescape,
        )?;

        Ok(Self { config, tera })
    }

    fn public_link(&self, key: &str) -> Option<String> {
        self.config
            .public_url
            .as_ref()
            .map(|base| format!("{}/{key}", base.trim_end_matches('/')))
    }

    fn destination(&self, natural_key: &str, filename: &str, local_path: PathBuf) -> FileInfo {
        FileInfo {
            local_path,
            dest_bucket: self.config.bucket.clone(),
            dest_path: s3_keys::artifact(&self.config.key_prefix, natural_key, filename),
        }
    }

    /// Render into a fresh job directory, removed again if rendering fails.
    async fn render_artifact(
        &self,
        team: &TeamInfo,
        request: &TypedRequest,
    ) -> Result<Artifact, ExportError> {
        let job_dir = self.config.output_dir.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&job_dir).await?;

        let rendered = self.render_into(&job_dir, team, request).await;
        if rendered.is_err() {
            if let Err(e) = tokio::fs::remove_dir_all(&job_dir).await {
                warn!(path = %job_dir.display(), error = %e, "error removing job directory");
            }
        }
        rendered
    }

    async fn render_into(
        &self,
        job_dir: &Path,
        team: &TeamInfo,
        request: &TypedRequest,
    ) -> Result<Artifact, ExportError> {
        let natural_key = Report::for_request(request).natural_key();

        let report_file = self.destination(&natural_key, REPORT_FILE, job_dir.join(REPORT_FILE));
        let report_url = self.public_link(&report_file.dest_path);

        let mut files = Vec::new();
        let mut report_json_url = None;
        if self.config.emit_json {
            let json_file =
                self.destination(&natural_key, REQUEST_FILE, job_dir.join(REQUEST_FILE));
            write_file(&json_file.local_path, &serde_json::to_vec_pretty(request)?).await?;
            report_json_url = self.public_link(&json_file.dest_path);
            files.push(json_file);
        }

        let context = json!({
            "team": team,
            "request": request,
            "report_type": request.report_type().as_str(),
            "generated_at": jiff::Timestamp::now().to_string(),
            "report_url": report_url,
            "report_json_url": report_json_url,
        });

        let html = render::render(&self.tera, render::REPORT, &context)?;
        write_file(&report_file.local_path, html.as_bytes()).await?;
        files.insert(0, report_file);

        let email_subject = render::render(&self.tera, render::SUBJECT, &context)?
            .trim()
            .to_string();
        let email_body = render::render(&self.tera, render::BODY, &context)?;

        debug!(
            report_type = %request.report_type(),
            natural_key = %natural_key,
            files = files.len(),
            "artifact rendered"
        );

        Ok(Artifact {
            files,
            email_subject,
            email_body,
            format: self.config.format,
            report_url,
            report_json_url,
            risk: None,
        })
    }
}

impl ReportGenerator for TemplateGenerator {
    fn generate<'a>(
        &'a self,
        team: &'a TeamInfo,
        request: &'a TypedRequest,
    ) -> BoxFuture<'a, Result<Artifact, CoreError>> {
        Box::pin(async move {
            self.render_artifact(team, request)
                .await
                .map_err(|e| CoreError::Generation(e.to_string()))
        })
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    tokio::fs::write(path, contents).await?;
    Ok(())
}
