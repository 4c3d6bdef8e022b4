use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use reportgen_core::models::report::Report;
use reportgen_storage::ReportRepository;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Drive `work` to completion while re-saving `snapshot` every `period`.
///
/// The heartbeat stops as soon as `work` finishes and is awaited before
/// this returns, so no heartbeat write lands after it. Save errors are
/// logged and ignored. A zero period disables the heartbeat.
pub async fn while_running<F, T>(
    repository: &dyn ReportRepository,
    snapshot: &Report,
    period: Duration,
    work: F,
) -> T
where
    F: Future<Output = T>,
{
    if period.is_zero() {
        return work.await;
    }

    let stop = CancellationToken::new();
    let work = async {
        let output = work.await;
        stop.cancel();
        output
    };

    let (output, beats) = tokio::join!(work, beat(repository, snapshot, period, &stop));
    debug!(report_id = %snapshot.id, beats, "heartbeat stopped");
    output
}

async fn beat(
    repository: &dyn ReportRepository,
    snapshot: &Report,
    period: Duration,
    stop: &CancellationToken,
) -> usize {
    let mut ticker = interval_at(Instant::now() + period, period);
    let mut beats = 0;

    loop {
        tokio::select! {
            _ = stop.cancelled() => return beats,
            _ = ticker.tick() => {
                beats += 1;
                if let Err(e) = repository.save_report(snapshot).await {
                    warn!(report_id = %snapshot.id, error = %e, "heartbeat save failed");
                }
            }
        }
    }
}
