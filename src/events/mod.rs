//! Domain events and the in-process publish/subscribe bus.
//!
//! Domain services raise a [`DomainEvent`] on the [`EventBus`]; any number of
//! [`EventObserver`]s react to it without knowing about each other.

mod bus;
mod event;

pub use bus::{EventBus, EventObserver, ObserverFailure, PublishReport};
pub use event::{DomainEvent, FavoriteAdded, ProductBackInStock, ProductPriceChanged};
