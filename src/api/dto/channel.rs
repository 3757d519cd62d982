//! Channel listing DTO.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Channel kinds the factory can build
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChannelListResponse {
    #[schema(example = json!(["email", "log", "push", "sms", "webhook"]))]
    pub channels: Vec<String>,
    /// Channels used when no event or user override applies
    #[schema(example = json!(["email"]))]
    pub default_channels: Vec<String>,
}
