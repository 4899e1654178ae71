use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use super::registry::RefreshTokenRegistry;

/// Every ten minutes.
const SWEEP_SCHEDULE: &str = "0 */10 * * * *";

/// Periodically evict expired refresh tokens so the registry stays bounded.
pub async fn start_token_sweeper(
    registry: Arc<dyn RefreshTokenRegistry>,
) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(SWEEP_SCHEDULE, move |_uuid, _l| {
        let registry = registry.clone();

        Box::pin(async move {
            match registry.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => info!("Purged {} expired refresh tokens", purged),
                Err(e) => error!("Error purging refresh tokens: {:?}", e),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Refresh token sweeper started");
    Ok(scheduler)
}
