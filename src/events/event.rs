//! Typed domain events.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{AppError, AppResult};

/// A product was added to a user's favorites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FavoriteAdded {
    pub user_id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub product_name: Option<String>,
}

/// The price of a product a user follows changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPriceChanged {
    pub user_id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    pub old_price: f64,
    pub new_price: f64,
}

/// A product a user follows is available again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductBackInStock {
    pub user_id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub product_name: Option<String>,
}

/// Event raised by a domain service once a business action completes.
///
/// Names outside the known set are kept as `Unrecognized` so that newer
/// producers do not break older observers.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    FavoriteAdded(FavoriteAdded),
    ProductPriceChanged(ProductPriceChanged),
    ProductBackInStock(ProductBackInStock),
    Unrecognized { name: String, payload: JsonValue },
}

impl DomainEvent {
    pub const FAVORITE_ADDED: &'static str = "favorite_added";
    pub const PRODUCT_PRICE_CHANGED: &'static str = "product_price_changed";
    pub const PRODUCT_BACK_IN_STOCK: &'static str = "product_back_in_stock";

    /// Wire name the bus routes on.
    pub fn name(&self) -> &str {
        match self {
            DomainEvent::FavoriteAdded(_) => Self::FAVORITE_ADDED,
            DomainEvent::ProductPriceChanged(_) => Self::PRODUCT_PRICE_CHANGED,
            DomainEvent::ProductBackInStock(_) => Self::PRODUCT_BACK_IN_STOCK,
            DomainEvent::Unrecognized { name, .. } => name,
        }
    }

    /// Builds an event from a loosely-typed `(name, payload)` pair.
    ///
    /// # Errors
    /// `Validation` when a known event name carries a payload of the wrong shape.
    pub fn from_raw(name: &str, payload: JsonValue) -> AppResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name", "Event name cannot be empty"));
        }

        match name {
            Self::FAVORITE_ADDED => parse(name, payload).map(DomainEvent::FavoriteAdded),
            Self::PRODUCT_PRICE_CHANGED => {
                parse(name, payload).map(DomainEvent::ProductPriceChanged)
            }
            Self::PRODUCT_BACK_IN_STOCK => {
                parse(name, payload).map(DomainEvent::ProductBackInStock)
            }
            other => Ok(DomainEvent::Unrecognized {
                name: other.to_string(),
                payload,
            }),
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(name: &str, payload: JsonValue) -> AppResult<T> {
    serde_json::from_value(payload)
        .map_err(|e| AppError::validation("payload", format!("Invalid '{}' payload: {}", name, e)))
}
