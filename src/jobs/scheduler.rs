use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler as TokioCronScheduler};

use crate::config::RetrySweepConfig;
use crate::error::{AppError, AppResult};
use crate::services::NotificationDispatcher;

/// Runs `retry_failed` on a cron schedule
pub struct RetrySweepScheduler {
    scheduler: Arc<Mutex<TokioCronScheduler>>,
    dispatcher: Arc<NotificationDispatcher>,
    config: RetrySweepConfig,
}

impl RetrySweepScheduler {
    pub async fn new(
        dispatcher: Arc<NotificationDispatcher>,
        config: RetrySweepConfig,
    ) -> AppResult<Self> {
        let scheduler = TokioCronScheduler::new()
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })?;

        Ok(Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            dispatcher,
            config,
        })
    }

    /// Schedules the sweep and starts the scheduler.
    ///
    /// Returns `false` without starting anything when the sweep is disabled.
    pub async fn start(&self) -> AppResult<bool> {
        if !self.config.enabled {
            tracing::info!("Retry sweep disabled");
            return Ok(false);
        }

        self.schedule_sweep().await?;
        self.scheduler
            .lock()
            .await
            .start()
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })?;

        tracing::info!(cron = %self.config.cron, "Retry sweep scheduled");
        Ok(true)
    }

    /// Stop the scheduler gracefully
    pub async fn stop(&self) -> AppResult<()> {
        self.scheduler
            .lock()
            .await
            .shutdown()
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })?;
        Ok(())
    }

    async fn schedule_sweep(&self) -> AppResult<()> {
        let dispatcher = Arc::clone(&self.dispatcher);

        let cron_job = Job::new_async(self.config.cron.as_str(), move |_uuid, _lock| {
            let dispatcher = Arc::clone(&dispatcher);

            Box::pin(async move {
                let max_retries = dispatcher.max_retries();
                match dispatcher.retry_failed(max_retries).await {
                    Ok(report) if report.selected > 0 => tracing::info!(
                        selected = report.selected,
                        sent = report.sent,
                        failed = report.failed,
                        skipped = report.skipped,
                        "Retry sweep finished"
                    ),
                    Ok(_) => tracing::debug!("Retry sweep found nothing to retry"),
                    Err(e) => tracing::error!(error = %e, "Retry sweep failed"),
                }
            })
        })
        .map_err(|e| AppError::BadRequest {
            message: format!("Invalid cron expression: {}", e),
        })?;

        self.scheduler
            .lock()
            .await
            .add(cron_job)
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::db::Store;
    use crate::state::AppState;

    fn dispatcher() -> Arc<NotificationDispatcher> {
        AppState::with_store(Settings::default(), Store::in_memory())
            .unwrap()
            .dispatcher
    }

    #[tokio::test]
    async fn test_disabled_sweep_does_not_start() {
        let scheduler = RetrySweepScheduler::new(dispatcher(), RetrySweepConfig::default())
            .await
            .unwrap();
        assert!(!scheduler.start().await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_cron_is_rejected() {
        let config = RetrySweepConfig {
            enabled: true,
            cron: "not a cron".to_string(),
        };
        let scheduler = RetrySweepScheduler::new(dispatcher(), config).await.unwrap();

        let err = scheduler.start().await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_enabled_sweep_starts_and_stops() {
        let config = RetrySweepConfig {
            enabled: true,
            cron: "0 0 * * * *".to_string(),
        };
        let scheduler = RetrySweepScheduler::new(dispatcher(), config).await.unwrap();

        assert!(scheduler.start().await.unwrap());
        scheduler.stop().await.unwrap();
    }
}
