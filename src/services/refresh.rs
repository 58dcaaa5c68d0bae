use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

use crate::schedule::groups::GroupDirectory;
use crate::utils::datetime::daily_cron;

/// Rebuilds the group tree once a day so new groups appear without a
/// restart. A failed rebuild keeps the previous tree (the directory
/// guarantees that) and is retried on the next tick.
pub struct GroupRefreshService {
    groups: GroupDirectory,
    refresh_time: String,
    scheduler: JobScheduler,
}

impl GroupRefreshService {
    pub async fn new(
        groups: GroupDirectory,
        refresh_time: &str,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self {
            groups,
            refresh_time: refresh_time.to_string(),
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let cron = daily_cron(&self.refresh_time)
            .ok_or_else(|| format!("invalid refresh time: {}", self.refresh_time))?;

        let groups = self.groups.clone();
        let refresh_job = Job::new_async(cron.as_str(), move |_uuid, _l| {
            let groups = groups.clone();
            Box::pin(async move {
                info!("starting scheduled groups refresh");
                if !groups.refresh().await {
                    warn!("groups refresh failed, keeping previous tree");
                }
            })
        })?;

        self.scheduler.add(refresh_job).await?;
        self.scheduler.start().await?;

        info!(
            "group refresh service started - rebuilding daily at {}",
            self.refresh_time
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}
