//! Check command handler
//!
//! Validates configuration, then builds every channel the policy can route to
//! and runs its own configuration check.

use crate::config::settings::Settings;
use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::ChannelKind;
use crate::state::AppState;

/// Handler for the check command
pub struct CheckCommandHandler {
    config: Settings,
}

impl CheckCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Returns the kinds that were checked, sorted
    ///
    /// The store is never opened, so a check has no side effects.
    ///
    /// # Errors
    /// The first channel that cannot be built or rejects its configuration,
    /// reported as a `Validation` error on `notifications.channels.<kind>`.
    pub async fn execute(&self) -> AppResult<Vec<ChannelKind>> {
        self.config.validate()?;
        println!("✓ Configuration is valid");

        let state = AppState::with_store(self.config.clone(), Store::in_memory())?;
        let dispatcher = &state.dispatcher;

        let mut kinds = dispatcher.policy().referenced_kinds();
        for key in self.config.notifications.channels.keys() {
            let kind: ChannelKind = key.parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds.sort();

        for kind in &kinds {
            let field = format!("notifications.channels.{}", kind);
            let strategy = dispatcher
                .resolve(kind)
                .map_err(|e| AppError::validation(&field, e.to_string()))?;
            strategy
                .validate_config()
                .await
                .map_err(|e| AppError::validation(&field, e.to_string()))?;
            println!("✓ Channel '{}' is ready", kind);
        }

        println!(
            "Check completed successfully - {} channel(s) verified",
            kinds.len()
        );
        Ok(kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_check_default_settings() {
        let kinds = CheckCommandHandler::new(Settings::default())
            .execute()
            .await
            .unwrap();
        assert_eq!(kinds, vec![ChannelKind::Email]);
    }

    #[tokio::test]
    async fn test_check_includes_configured_channels() {
        let mut config = Settings::default();
        config.notifications.channels.insert(
            "webhook".to_string(),
            json!({"url": "https://hooks.example.com/notify"}),
        );
        config
            .notifications
            .event_channels
            .insert("favorite_added".to_string(), vec!["log".to_string()]);

        let kinds = CheckCommandHandler::new(config).execute().await.unwrap();
        assert_eq!(
            kinds,
            vec![ChannelKind::Email, ChannelKind::Log, ChannelKind::Webhook]
        );
    }

    #[tokio::test]
    async fn test_check_rejects_plain_http_webhook() {
        let mut config = Settings::default();
        config.notifications.channels.insert(
            "webhook".to_string(),
            json!({"url": "http://hooks.example.com/notify"}),
        );

        match CheckCommandHandler::new(config).execute().await {
            Err(AppError::Validation { field, .. }) => {
                assert_eq!(field, "notifications.channels.webhook")
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_check_reports_unregistered_kind() {
        let mut config = Settings::default();
        config.notifications.default_channels = vec!["pigeon".to_string()];

        match CheckCommandHandler::new(config).execute().await {
            Err(AppError::Validation { field, reason }) => {
                assert_eq!(field, "notifications.channels.pigeon");
                assert!(reason.contains("pigeon"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }
}
