//! Retry command handler
//!
//! Runs a single retry sweep against the configured store.

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::services::RetryReport;
use crate::state::AppState;

/// Handler for the retry command
pub struct RetryCommandHandler {
    config: Settings,
}

impl RetryCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Re-attempts every FAILED notification below `notifications.max_retries`
    ///
    /// # Errors
    /// - the store snapshot cannot be loaded
    /// - the channel configuration is unusable
    pub async fn execute(self) -> AppResult<RetryReport> {
        let max_retries = self.config.notifications.max_retries;
        let state = AppState::new(self.config).await?;

        let report = state.dispatcher.retry_failed(max_retries).await?;

        println!(
            "Retried {} notification(s): {} sent, {} failed, {} skipped",
            report.selected, report.sent, report.failed, report.skipped
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use crate::models::{ChannelKind, DeliveryOutcome, NewNotification, NotificationStatus};
    use crate::repositories::NotificationRepository;

    #[tokio::test]
    async fn test_retry_sweeps_persisted_failures() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Settings::default();
        config.store.persist = true;
        config.store.path = dir
            .path()
            .join("notifications.json")
            .to_string_lossy()
            .into_owned();

        // Seed one FAILED record with attempts left.
        {
            let store = Store::open(&config.store).await.unwrap();
            let repo = NotificationRepository::new(store);
            let record = repo
                .add(NewNotification::new(
                    3,
                    ChannelKind::Log,
                    "Back in stock",
                    "Widget is available again",
                ))
                .await
                .unwrap();
            repo.begin_attempt(record.id, 3).await.unwrap();
            repo.record_outcome(
                record.id,
                &DeliveryOutcome::Failed("gateway timeout".to_string()),
            )
            .await
            .unwrap();
        }

        let report = RetryCommandHandler::new(config.clone())
            .execute()
            .await
            .unwrap();
        assert_eq!(report.selected, 1);
        assert_eq!(report.sent, 1);

        let store = Store::open(&config.store).await.unwrap();
        let repo = NotificationRepository::new(store);
        let sent = repo.find_by_status(NotificationStatus::Sent).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].attempts, 2);
    }

    #[tokio::test]
    async fn test_retry_with_empty_store() {
        let report = RetryCommandHandler::new(Settings::default())
            .execute()
            .await
            .unwrap();
        assert_eq!(report, RetryReport::default());
    }
}
