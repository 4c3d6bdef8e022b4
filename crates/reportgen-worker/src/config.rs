use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use reportgen_core::models::report::ReportType;
use reportgen_export::TemplateGeneratorConfig;
use reportgen_notify::SesConfig;
use reportgen_queue::{QueueArn, SqsConfig};

use crate::error::ConfigError;

const CONFIG_ENV: &str = "REPORTGEN_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub aws: AwsConfig,
    pub sqs: SqsConfig,
    pub ses: SesConfig,
    #[serde(default)]
    pub s3: S3Config,
    pub storage: StorageConfig,
    /// Seconds between liveness re-saves of a generating report. 0 disables.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
    pub generators: BTreeMap<ReportType, TemplateGeneratorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Config {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    S3,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub prefix: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_heartbeat_secs() -> u64 {
    10
}

/// Config file location: first CLI argument, else `$REPORTGEN_CONFIG`, else
/// `./config.json`.
pub fn config_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.or(env)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Resolve the config path from the process arguments and environment.
pub fn config_path_from_env() -> PathBuf {
    config_path(std::env::args().nth(1), std::env::var(CONFIG_ENV).ok())
}

pub fn load(path: &Path) -> Result<WorkerConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: WorkerConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

impl WorkerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        QueueArn::parse(&self.sqs.queue_arn).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.sqs.number_of_processors == 0 {
            return Err(ConfigError::Invalid(
                "sqs.number_of_processors must be at least 1".to_string(),
            ));
        }

        self.ses
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.is_empty() {
            return Err(ConfigError::Invalid(
                "storage.bucket is required for the s3 backend".to_string(),
            ));
        }

        if self.generators.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one report generator must be configured".to_string(),
            ));
        }
        if let Some((report_type, _)) = self.generators.iter().find(|(_, g)| g.bucket.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "generators.{report_type}.bucket is required"
            )));
        }

        Ok(())
    }
}
