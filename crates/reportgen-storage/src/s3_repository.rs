use aws_sdk_s3::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reportgen_core::generator::BoxFuture;
use reportgen_core::models::report::Report;
use reportgen_core::s3_keys;

use crate::error::StorageError;
use crate::objects;
use crate::repository::ReportRepository;

/// Reports stored as JSON objects, one per natural key, plus an id index.
///
/// Layout:
/// - `<prefix>/<type>/<natural key>.json`: the report row
/// - `<prefix>/_ids/<id>.json`: `{ "key": "<row key>" }`
#[derive(Clone)]
pub struct S3ReportRepository {
    client: Client,
    bucket: String,
    prefix: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct IdIndexEntry {
    key: String,
}

impl S3ReportRepository {
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    async fn load_row(&self, key: &str) -> Result<Option<Report>, StorageError> {
        objects::load_json(&self.client, &self.bucket, key).await
    }

    async fn upsert(&self, report: &Report) -> Result<Report, StorageError> {
        let row_key = s3_keys::report(&self.prefix, report.report_type(), &report.natural_key());
        let now = jiff::Timestamp::now();
        let mut stored = report.clone();

        match self.load_row(&row_key).await? {
            Some(existing) => {
                stored.id = existing.id;
                stored.created_at = existing.created_at;
            }
            None => {
                if stored.id.is_empty() {
                    stored.id = Uuid::new_v4().to_string();
                }
                stored.created_at = Some(now);

                // Index before row.
                let index_key = s3_keys::report_id_index(&self.prefix, &stored.id);
                objects::save_json(
                    &self.client,
                    &self.bucket,
                    &index_key,
                    &IdIndexEntry {
                        key: row_key.clone(),
                    },
                )
                .await?;
                tracing::debug!(report_id = %stored.id, key = %row_key, "inserted report");
            }
        }
        stored.updated_at = Some(now);

        objects::save_json(&self.client, &self.bucket, &row_key, &stored).await?;
        Ok(stored)
    }

    async fn load_by_id(&self, id: &str) -> Result<Report, StorageError> {
        let index_key = s3_keys::report_id_index(&self.prefix, id);
        let not_found = || StorageError::ReportNotFound { id: id.to_string() };

        let entry: IdIndexEntry = objects::load_json(&self.client, &self.bucket, &index_key)
            .await?
            .ok_or_else(not_found)?;

        match self.load_row(&entry.key).await? {
            // The row may have been re-inserted under a new id.
            Some(report) if report.id == id => Ok(report),
            _ => Err(not_found()),
        }
    }
}

impl ReportRepository for S3ReportRepository {
    fn save_report<'a>(&'a self, report: &'a Report) -> BoxFuture<'a, Result<Report, StorageError>> {
        Box::pin(self.upsert(report))
    }

    fn get_report<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Report, StorageError>> {
        Box::pin(self.load_by_id(id))
    }
}
