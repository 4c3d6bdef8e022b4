use serde::{Deserialize, Serialize};

use super::report::{FileInfo, NotificationFormat};

/// What a generator hands back once the report files exist locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub files: Vec<FileInfo>,
    pub email_subject: String,
    pub email_body: String,
    #[serde(default)]
    pub format: NotificationFormat,
    #[serde(default)]
    pub report_url: Option<String>,
    #[serde(default)]
    pub report_json_url: Option<String>,
    #[serde(default)]
    pub risk: Option<i32>,
}
