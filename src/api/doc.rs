use utoipa::OpenApi;

pub const HEALTH_TAG: &str = "Health";
pub const NOTIFICATION_TAG: &str = "Notifications";
pub const CHANNEL_TAG: &str = "Channels";
pub const EVENT_TAG: &str = "Events";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Herald",
        description = "Event-driven notification dispatch API",
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::models::NotificationStatus,
        )
    ),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = NOTIFICATION_TAG, description = "Notification creation, query and retry endpoints"),
        (name = CHANNEL_TAG, description = "Delivery channel registry"),
        (name = EVENT_TAG, description = "Domain event ingestion"),
    )
)]
pub struct ApiDoc;
