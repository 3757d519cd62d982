//! Channel factory.
//!
//! Maps a channel kind to a constructor and caches the strategies it builds.
//! The factory is plain instance state: the composition root builds one and
//! hands it to the dispatcher.

use dashmap::DashMap;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::email::EmailStrategy;
use super::log_channel::LogStrategy;
use super::push::PushStrategy;
use super::sms::SmsStrategy;
use super::strategy::ChannelStrategy;
use super::webhook::WebhookStrategy;
use crate::error::{AppError, AppResult};
use crate::models::{ChannelKind, EmailConfig, PushConfig, SmsConfig, WebhookConfig};

/// Builds a strategy from its JSON configuration
pub type ChannelConstructor =
    Arc<dyn Fn(&JsonValue) -> AppResult<Arc<dyn ChannelStrategy>> + Send + Sync>;

/// Registry of channel constructors plus a per-configuration instance cache
pub struct ChannelFactory {
    constructors: DashMap<ChannelKind, ChannelConstructor>,
    instances: DashMap<(ChannelKind, String), Arc<dyn ChannelStrategy>>,
}

impl Default for ChannelFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelFactory {
    /// Creates a factory with the built-in channels registered.
    pub fn new() -> Self {
        let factory = Self::empty();

        factory.register(ChannelKind::Email, |config| {
            let config = EmailConfig::from_json(config).map_err(|e| invalid_config("email", e))?;
            Ok(Arc::new(EmailStrategy::new(config)))
        });
        factory.register(ChannelKind::Sms, |config| {
            let config = SmsConfig::from_json(config).map_err(|e| invalid_config("sms", e))?;
            Ok(Arc::new(SmsStrategy::new(config)))
        });
        factory.register(ChannelKind::Push, |config| {
            let config = PushConfig::from_json(config).map_err(|e| invalid_config("push", e))?;
            Ok(Arc::new(PushStrategy::new(config)))
        });
        factory.register(ChannelKind::Log, |_| Ok(Arc::new(LogStrategy)));
        factory.register(ChannelKind::Webhook, |config| {
            let config =
                WebhookConfig::from_json(config).map_err(|e| invalid_config("webhook", e))?;
            Ok(Arc::new(WebhookStrategy::new(config)?))
        });

        factory
    }

    /// Creates a factory with nothing registered.
    pub fn empty() -> Self {
        Self {
            constructors: DashMap::new(),
            instances: DashMap::new(),
        }
    }

    /// Adds or replaces the constructor for `kind`.
    ///
    /// Cached instances built by a replaced constructor are evicted.
    pub fn register<F>(&self, kind: ChannelKind, constructor: F)
    where
        F: Fn(&JsonValue) -> AppResult<Arc<dyn ChannelStrategy>> + Send + Sync + 'static,
    {
        let replaced = self
            .constructors
            .insert(kind.clone(), Arc::new(constructor))
            .is_some();

        if replaced {
            self.instances.retain(|(cached, _), _| cached != &kind);
            tracing::info!(channel = %kind, "Channel constructor replaced");
        } else {
            tracing::debug!(channel = %kind, "Channel constructor registered");
        }
    }

    pub fn is_registered(&self, kind: &ChannelKind) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Resolves a strategy for `kind` configured with `config`.
    ///
    /// Identical `(kind, config)` pairs return the same shared instance. The
    /// constructor runs without any cache lock held, so it may itself resolve
    /// other channels; when two callers race, the first instance stored wins.
    ///
    /// # Errors
    /// * `UnknownChannelKind` when no constructor is registered
    /// * whatever the constructor returns for an unusable configuration
    pub fn create(&self, kind: &ChannelKind, config: &JsonValue) -> AppResult<Arc<dyn ChannelStrategy>> {
        let constructor = self
            .constructors
            .get(kind)
            .map(|c| Arc::clone(c.value()))
            .ok_or_else(|| AppError::UnknownChannelKind {
                kind: kind.to_string(),
            })?;

        let key = (kind.clone(), canonical_json(config));
        if let Some(cached) = self.instances.get(&key) {
            return Ok(Arc::clone(cached.value()));
        }

        let built = constructor(config)?;
        let instance = self.instances.entry(key).or_insert(built);
        Ok(Arc::clone(instance.value()))
    }

    /// Drops every cached instance. Registrations are kept.
    pub fn reset(&self) {
        self.instances.clear();
    }

    /// Registered kinds, sorted by name
    pub fn supported_kinds(&self) -> Vec<ChannelKind> {
        let mut kinds: Vec<ChannelKind> = self.constructors.iter().map(|e| e.key().clone()).collect();
        kinds.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        kinds
    }

    pub fn cached_instances(&self) -> usize {
        self.instances.len()
    }
}

fn invalid_config(channel: &str, error: serde_json::Error) -> AppError {
    AppError::validation("config", format!("Invalid {} channel configuration: {}", channel, error))
}

/// Serializes a JSON value with object keys sorted at every level.
fn canonical_json(value: &JsonValue) -> String {
    fn write(value: &JsonValue, out: &mut String) {
        match value {
            JsonValue::Object(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                out.push('{');
                for (i, (key, value)) in entries.into_iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&JsonValue::String(key.clone()).to_string());
                    out.push(':');
                    write(value, out);
                }
                out.push('}');
            }
            JsonValue::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write(item, out);
                }
                out.push(']');
            }
            scalar => out.push_str(&scalar.to_string()),
        }
    }

    let mut out = String::new();
    write(value, &mut out);
    out
}
