//! Channel selection for event-driven notifications.

use std::collections::HashMap;

use crate::config::settings::NotificationsConfig;
use crate::error::{AppError, AppResult};
use crate::models::ChannelKind;

/// Decides which channels an event fans out to.
///
/// Resolution order: per-user override, then per-event default, then the
/// global default set.
#[derive(Debug, Clone, Default)]
pub struct ChannelPolicy {
    default_channels: Vec<ChannelKind>,
    event_channels: HashMap<String, Vec<ChannelKind>>,
    user_channels: HashMap<i64, Vec<ChannelKind>>,
}

impl ChannelPolicy {
    pub fn new(default_channels: Vec<ChannelKind>) -> Self {
        Self {
            default_channels: dedup(default_channels),
            ..Default::default()
        }
    }

    pub fn with_event_channels(mut self, event: &str, channels: Vec<ChannelKind>) -> Self {
        self.event_channels.insert(event.to_string(), dedup(channels));
        self
    }

    pub fn with_user_channels(mut self, user_id: i64, channels: Vec<ChannelKind>) -> Self {
        self.user_channels.insert(user_id, dedup(channels));
        self
    }

    /// Builds the policy from the `[notifications]` section.
    pub fn from_config(config: &NotificationsConfig) -> AppResult<Self> {
        let mut policy = Self::new(parse_kinds(&config.default_channels)?);

        for (event, channels) in &config.event_channels {
            policy = policy.with_event_channels(event, parse_kinds(channels)?);
        }
        for (user, channels) in &config.user_channels {
            let user_id = user.trim().parse::<i64>().map_err(|_| {
                AppError::validation(
                    "notifications.user_channels",
                    format!("Invalid user id key '{}'", user),
                )
            })?;
            policy = policy.with_user_channels(user_id, parse_kinds(channels)?);
        }

        Ok(policy)
    }

    /// Channels for one event addressed to `user_id`
    pub fn channels_for(&self, event: &str, user_id: i64) -> &[ChannelKind] {
        self.user_channels
            .get(&user_id)
            .or_else(|| self.event_channels.get(event))
            .unwrap_or(&self.default_channels)
    }

    /// Every kind the policy can route to, without duplicates
    pub fn referenced_kinds(&self) -> Vec<ChannelKind> {
        let all = self
            .default_channels
            .iter()
            .chain(self.event_channels.values().flatten())
            .chain(self.user_channels.values().flatten())
            .cloned()
            .collect();
        dedup(all)
    }
}

fn parse_kinds(names: &[String]) -> AppResult<Vec<ChannelKind>> {
    names.iter().map(|name| name.parse()).collect()
}

fn dedup(channels: Vec<ChannelKind>) -> Vec<ChannelKind> {
    let mut seen = Vec::with_capacity(channels.len());
    for channel in channels {
        if !seen.contains(&channel) {
            seen.push(channel);
        }
    }
    seen
}
