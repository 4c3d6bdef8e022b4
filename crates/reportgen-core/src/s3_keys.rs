//! S3 key/path conventions.
//!
//! Pure string functions with no AWS SDK dependency. These define the canonical
//! layout of report rows and report artifacts in their buckets.

use crate::models::report::ReportType;

/// A report row, addressed by its natural key.
pub fn report(prefix: &str, report_type: ReportType, natural_key: &str) -> String {
    format!("{}{report_type}/{natural_key}.json", normalize(prefix))
}

/// Pointer from a report id to the row holding it.
pub fn report_id_index(prefix: &str, id: &str) -> String {
    format!("{}_ids/{id}.json", normalize(prefix))
}

/// Destination of an uploaded report artifact.
pub fn artifact(key_prefix: &str, natural_key: &str, filename: &str) -> String {
    format!("{}{natural_key}/{filename}", normalize(key_prefix))
}

fn normalize(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}
