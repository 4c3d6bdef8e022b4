use reportgen_core::generator::BoxFuture;
use reportgen_core::models::report::Report;

use crate::error::StorageError;

/// Persistence contract the report lifecycle relies on.
///
/// Implementations must be safe to share between workers; a given report id
/// is only ever written by one pipeline at a time.
pub trait ReportRepository: Send + Sync {
    /// Upsert by natural key.
    ///
    /// Inserts and assigns `id`/`created_at` when no row holds the report's
    /// natural key, otherwise overwrites that row keeping its `id` and
    /// `created_at`. Always stamps `updated_at`. Returns the stored report.
    fn save_report<'a>(&'a self, report: &'a Report) -> BoxFuture<'a, Result<Report, StorageError>>;

    /// Load a report by id. `StorageError::ReportNotFound` if absent.
    fn get_report<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Report, StorageError>>;
}
