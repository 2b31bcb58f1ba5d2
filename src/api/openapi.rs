//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{copies, health, notifications, punishments, requests, transfers};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Circulation API",
        version = "0.3.0",
        description = "Physical copies, borrow requests, transfers between libraries, punishments and notifications"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Copies
        copies::create_copy,
        copies::get_copy,
        copies::delete_copy,
        copies::set_copy_status,
        copies::receive_copy,
        copies::list_library_copies,
        copies::get_availability,
        copies::get_available_copy,
        // Requests
        requests::create_request,
        requests::get_request,
        requests::update_request_status,
        requests::extend_request,
        requests::delete_request,
        requests::list_user_requests,
        requests::get_waiting_list,
        // Transfers
        transfers::create_transfer,
        transfers::get_transfer,
        transfers::accept_transfer,
        transfers::reject_transfer,
        transfers::cancel_transfer,
        transfers::delete_transfer,
        transfers::list_library_transfers,
        // Punishments
        punishments::issue_punishment,
        punishments::get_punishment,
        punishments::update_punishment_level,
        punishments::list_user_punishments,
        // Notifications
        notifications::create_broadcast,
        notifications::delete_notification,
        notifications::list_user_notifications,
        notifications::list_library_notifications,
        notifications::stream_notifications,
    ),
    components(
        schemas(
            health::HealthResponse,
            crate::error::ErrorResponse,
            // Enums
            crate::models::enums::PhysicalCopyStatus,
            crate::models::enums::RequestStatus,
            crate::models::enums::TransferStatus,
            // Copies
            crate::models::physical_copy::PhysicalCopy,
            crate::models::physical_copy::CreatePhysicalCopy,
            crate::models::physical_copy::ReceiveCopy,
            crate::models::physical_copy::LibraryAvailability,
            copies::SetCopyStatusRequest,
            copies::AvailableCopyResponse,
            // Requests
            crate::models::request::BorrowRequest,
            crate::models::request::CreateRequest,
            crate::models::request::UpdateRequestStatus,
            crate::models::request::ExtendRequest,
            // Transfers
            crate::models::transfer::Transfer,
            crate::models::transfer::CreateTransfer,
            // Punishments
            crate::models::punishment::Punishment,
            crate::models::punishment::IssuePunishment,
            crate::models::punishment::UpdatePunishmentLevel,
            // Notifications
            crate::models::notification::Notification,
            crate::models::notification::NotificationEvent,
            crate::models::notification::CreateBroadcast,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "copies", description = "Physical copy registry"),
        (name = "requests", description = "Borrow request lifecycle"),
        (name = "transfers", description = "Transfers between libraries"),
        (name = "punishments", description = "Punishments attached to requests"),
        (name = "notifications", description = "Notifications and live stream")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
