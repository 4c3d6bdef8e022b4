use reportgen_core::generator::BoxFuture;
use reportgen_core::models::report::NotificationFormat;

use crate::error::NotifyError;

/// Delivers a report notification to its recipients.
pub trait Notifier: Send + Sync {
    fn notify<'a>(
        &'a self,
        subject: &'a str,
        body: &'a str,
        format: NotificationFormat,
        recipients: &'a [String],
    ) -> BoxFuture<'a, Result<(), NotifyError>>;
}
