//! Application state for Axum web framework.
//!
//! Wires the store, repository, channel factory, dispatcher and event bus
//! together once at startup. Handlers and the CLI share the same graph.

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::db::Store;
use crate::error::AppResult;
use crate::events::EventBus;
use crate::models::ChannelKind;
use crate::repositories::NotificationRepository;
use crate::services::{ChannelFactory, ChannelPolicy, NotificationDispatcher};

/// Application state containing all shared services and resources.
///
/// Cloning is cheap: every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Store,
    pub repository: NotificationRepository,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub events: Arc<EventBus>,
}

impl AppState {
    /// Opens the configured store and builds the dispatch graph on top of it.
    ///
    /// # Errors
    /// - the snapshot file exists but cannot be read or parsed
    /// - a channel key or policy entry is not a valid channel kind
    pub async fn new(settings: Settings) -> AppResult<Self> {
        let store = Store::open(&settings.store).await?;
        Self::with_store(settings, store)
    }

    /// Builds the state on an already opened store.
    pub fn with_store(settings: Settings, store: Store) -> AppResult<Self> {
        let repository = NotificationRepository::new(store.clone());
        let factory = Arc::new(ChannelFactory::new());
        let policy = ChannelPolicy::from_config(&settings.notifications)?;

        let mut dispatcher = NotificationDispatcher::new(
            repository.clone(),
            factory,
            policy,
            settings.notifications.max_retries,
        );
        for (kind, config) in &settings.notifications.channels {
            let kind: ChannelKind = kind.parse()?;
            dispatcher = dispatcher.with_channel_config(kind, config.clone());
        }
        let dispatcher = Arc::new(dispatcher);

        let events = Arc::new(EventBus::new());
        dispatcher.subscribe_to(&events);

        tracing::debug!(
            channels = ?settings.notifications.channels.keys().collect::<Vec<_>>(),
            max_retries = settings.notifications.max_retries,
            "Notification dispatcher wired"
        );

        Ok(Self {
            settings: Arc::new(settings),
            store,
            repository,
            dispatcher,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DomainEvent;
    use serde_json::json;

    #[tokio::test]
    async fn test_state_subscribes_dispatcher() {
        let state = AppState::with_store(Settings::default(), Store::in_memory()).unwrap();

        for event in NotificationDispatcher::HANDLED_EVENTS {
            assert_eq!(state.events.subscriber_count(event), 1);
        }

        let report = state
            .events
            .publish_raw(
                DomainEvent::FAVORITE_ADDED,
                json!({"user_id": 9, "product_id": 3}),
            )
            .await
            .unwrap();
        assert_eq!(report.notified, 1);
        assert_eq!(state.repository.find_by_user(9).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_state_rejects_malformed_channel_key() {
        let mut settings = Settings::default();
        settings
            .notifications
            .channels
            .insert("not a kind".to_string(), json!({}));

        assert!(AppState::with_store(settings, Store::in_memory()).is_err());
    }
}
