use std::collections::HashMap;

use tokio::sync::Mutex;
use uuid::Uuid;

use reportgen_core::generator::BoxFuture;
use reportgen_core::models::report::{Report, ReportType};

use crate::error::StorageError;
use crate::repository::ReportRepository;

/// In-process report repository with the same upsert semantics as the S3 one.
#[derive(Default)]
pub struct MemoryReportRepository {
    inner: Mutex<Rows>,
}

#[derive(Default)]
struct Rows {
    by_id: HashMap<String, Report>,
    by_key: HashMap<(ReportType, String), String>,
}

impl MemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct report rows stored.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl ReportRepository for MemoryReportRepository {
    fn save_report<'a>(&'a self, report: &'a Report) -> BoxFuture<'a, Result<Report, StorageError>> {
        Box::pin(async move {
            let mut rows = self.inner.lock().await;
            let now = jiff::Timestamp::now();
            let key = (report.report_type(), report.natural_key());

            let mut stored = report.clone();
            let existing = rows
                .by_key
                .get(&key)
                .and_then(|id| rows.by_id.get(id))
                .map(|row| (row.id.clone(), row.created_at));

            match existing {
                Some((id, created_at)) => {
                    stored.id = id;
                    stored.created_at = created_at;
                }
                None => {
                    if stored.id.is_empty() {
                        stored.id = Uuid::new_v4().to_string();
                    }
                    stored.created_at = Some(now);
                    rows.by_key.insert(key, stored.id.clone());
                }
            }
            stored.updated_at = Some(now);

            rows.by_id.insert(stored.id.clone(), stored.clone());
            Ok(stored)
        })
    }

    fn get_report<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Report, StorageError>> {
        Box::pin(async move {
            self.inner
                .lock()
                .await
                .by_id
                .get(id)
                .cloned()
                .ok_or_else(|| StorageError::ReportNotFound { id: id.to_string() })
        })
    }
}
