//! Subject side of the observer pattern.
//!
//! The bus keeps only weak references: an observer lives as long as its owner
//! keeps it alive, and dead registrations are pruned on the next touch.

use async_trait::async_trait;
use dashmap::DashMap;
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use super::DomainEvent;
use crate::error::AppResult;

/// Receiver of domain events
#[async_trait]
pub trait EventObserver: Send + Sync {
    /// Label used in logs and publish reports
    fn name(&self) -> &str;

    /// Handles one event. An error is reported by the bus and does not stop
    /// delivery to the remaining observers.
    async fn on_event(&self, event: &DomainEvent) -> AppResult<()>;
}

/// One observer that returned an error or panicked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObserverFailure {
    pub observer: String,
    pub reason: String,
}

/// Outcome of a single `publish` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub event: String,
    /// Observers invoked, successful or not
    pub notified: usize,
    pub failures: Vec<ObserverFailure>,
}

impl PublishReport {
    pub fn succeeded(&self) -> usize {
        self.notified - self.failures.len()
    }
}

/// Named-event subject
#[derive(Default)]
pub struct EventBus {
    subscriptions: DashMap<String, Vec<Weak<dyn EventObserver>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer` for `event_name`.
    ///
    /// Subscribing the same observer instance twice is a single subscription.
    /// Returns whether a new registration was added.
    pub fn subscribe<O>(&self, event_name: &str, observer: &Arc<O>) -> bool
    where
        O: EventObserver + 'static,
    {
        let weak = downgrade(observer);
        let mut observers = self.subscriptions.entry(event_name.to_string()).or_default();
        observers.retain(|w| w.strong_count() > 0);

        if observers.iter().any(|w| Weak::ptr_eq(w, &weak)) {
            return false;
        }
        observers.push(weak);
        tracing::debug!(
            event = event_name,
            observer = observer.name(),
            "Observer subscribed"
        );
        true
    }

    /// Removes a registration. No-op when absent.
    pub fn unsubscribe<O>(&self, event_name: &str, observer: &Arc<O>)
    where
        O: EventObserver + 'static,
    {
        let weak = downgrade(observer);
        if let Some(mut observers) = self.subscriptions.get_mut(event_name) {
            observers.retain(|w| w.strong_count() > 0 && !Weak::ptr_eq(w, &weak));
        }
        self.subscriptions.remove_if(event_name, |_, v| v.is_empty());
    }

    /// Number of live observers for an event
    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.subscriptions
            .get(event_name)
            .map(|observers| observers.iter().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0)
    }

    /// Delivers `event` to every subscribed observer, one after another, in
    /// subscription order. Never fails: observer errors and panics end up in
    /// the report.
    pub async fn publish(&self, event: &DomainEvent) -> PublishReport {
        let observers = self.snapshot(event.name());
        let mut report = PublishReport {
            event: event.name().to_string(),
            notified: observers.len(),
            failures: Vec::new(),
        };

        tracing::debug!(
            event = event.name(),
            observers = observers.len(),
            "Publishing event"
        );

        for observer in observers {
            let result = AssertUnwindSafe(observer.on_event(event))
                .catch_unwind()
                .await;

            let reason = match result {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => format!("observer panicked: {}", panic_message(panic.as_ref())),
            };

            tracing::error!(
                event = event.name(),
                observer = observer.name(),
                error = %reason,
                "Observer failed to handle event"
            );
            report.failures.push(ObserverFailure {
                observer: observer.name().to_string(),
                reason,
            });
        }

        report
    }

    /// Publishes a loosely-typed event.
    ///
    /// # Errors
    /// `Validation` when a known event name carries a malformed payload.
    pub async fn publish_raw(&self, name: &str, payload: JsonValue) -> AppResult<PublishReport> {
        let event = DomainEvent::from_raw(name, payload)?;
        Ok(self.publish(&event).await)
    }

    /// Upgrades live observers and drops dead ones. The map guard is released
    /// before any observer runs.
    fn snapshot(&self, event_name: &str) -> Vec<Arc<dyn EventObserver>> {
        let Some(mut observers) = self.subscriptions.get_mut(event_name) else {
            return Vec::new();
        };
        observers.retain(|w| w.strong_count() > 0);
        observers.iter().filter_map(Weak::upgrade).collect()
    }
}

fn downgrade<O>(observer: &Arc<O>) -> Weak<dyn EventObserver>
where
    O: EventObserver + 'static,
{
    let observer: Arc<dyn EventObserver> = observer.clone();
    Arc::downgrade(&observer)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;
    use std::sync::Mutex;

    type CallLog = Arc<Mutex<Vec<String>>>;

    enum Behaviour {
        Succeed,
        Fail,
        Panic,
    }

    struct Recorder {
        label: String,
        behaviour: Behaviour,
        calls: CallLog,
    }

    impl Recorder {
        fn new(label: &str, behaviour: Behaviour, calls: &CallLog) -> Arc<Self> {
            Arc::new(Self {
                label: label.to_string(),
                behaviour,
                calls: calls.clone(),
            })
        }
    }

    #[async_trait]
    impl EventObserver for Recorder {
        fn name(&self) -> &str {
            &self.label
        }

        async fn on_event(&self, _event: &DomainEvent) -> AppResult<()> {
            self.calls.lock().unwrap().push(self.label.clone());
            match self.behaviour {
                Behaviour::Succeed => Ok(()),
                Behaviour::Fail => Err(AppError::BadRequest {
                    message: "boom".to_string(),
                }),
                Behaviour::Panic => panic!("observer exploded"),
            }
        }
    }

    fn favorite() -> DomainEvent {
        DomainEvent::from_raw("favorite_added", json!({"user_id": 1, "product_id": 100})).unwrap()
    }

    #[tokio::test]
    async fn test_failing_observer_does_not_short_circuit() {
        let bus = EventBus::new();
        let calls = CallLog::default();
        let first = Recorder::new("first", Behaviour::Succeed, &calls);
        let second = Recorder::new("second", Behaviour::Fail, &calls);
        let third = Recorder::new("third", Behaviour::Panic, &calls);
        let fourth = Recorder::new("fourth", Behaviour::Succeed, &calls);

        for observer in [&first, &second, &third, &fourth] {
            bus.subscribe("favorite_added", observer);
        }

        let report = bus.publish(&favorite()).await;

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["first", "second", "third", "fourth"]
        );
        assert_eq!(report.notified, 4);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].observer, "second");
        assert!(report.failures[1].reason.contains("observer exploded"));
    }

    #[tokio::test]
    async fn test_subscribe_is_idempotent() {
        let bus = EventBus::new();
        let calls = CallLog::default();
        let observer = Recorder::new("once", Behaviour::Succeed, &calls);

        assert!(bus.subscribe("favorite_added", &observer));
        assert!(!bus.subscribe("favorite_added", &observer));
        assert_eq!(bus.subscriber_count("favorite_added"), 1);

        bus.publish(&favorite()).await;
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_and_unknown_event() {
        let bus = EventBus::new();
        let calls = CallLog::default();
        let observer = Recorder::new("gone", Behaviour::Succeed, &calls);

        bus.subscribe("favorite_added", &observer);
        bus.unsubscribe("favorite_added", &observer);
        bus.unsubscribe("never_subscribed", &observer);
        assert_eq!(bus.subscriber_count("favorite_added"), 0);

        let report = bus.publish(&favorite()).await;
        assert_eq!(report.notified, 0);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_observer_is_pruned() {
        let bus = EventBus::new();
        let calls = CallLog::default();
        let observer = Recorder::new("short-lived", Behaviour::Succeed, &calls);
        bus.subscribe("favorite_added", &observer);
        drop(observer);

        assert_eq!(bus.subscriber_count("favorite_added"), 0);
        assert_eq!(bus.publish(&favorite()).await.notified, 0);
    }

    #[tokio::test]
    async fn test_publish_raw_routes_by_name() {
        let bus = EventBus::new();
        let calls = CallLog::default();
        let observer = Recorder::new("custom", Behaviour::Succeed, &calls);
        bus.subscribe("cart_abandoned", &observer);

        let report = bus
            .publish_raw("cart_abandoned", json!({"user_id": 4}))
            .await
            .unwrap();
        assert_eq!(report.event, "cart_abandoned");
        assert_eq!(report.notified, 1);

        assert!(bus
            .publish_raw("favorite_added", json!({"product_id": 1}))
            .await
            .is_err());
    }
}
