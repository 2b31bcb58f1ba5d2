//! API handlers for the circulation REST endpoints

pub mod copies;
pub mod health;
pub mod notifications;
pub mod openapi;
pub mod punishments;
pub mod requests;
pub mod transfers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Physical copies
        .route("/copies", post(copies::create_copy))
        .route("/copies/:id", get(copies::get_copy))
        .route("/copies/:id", delete(copies::delete_copy))
        .route("/copies/:id/status", put(copies::set_copy_status))
        .route("/copies/:id/receive", post(copies::receive_copy))
        .route("/libraries/:id/copies", get(copies::list_library_copies))
        .route("/books/:isbn/availability", get(copies::get_availability))
        .route(
            "/books/:isbn/libraries/:library_id/available",
            get(copies::get_available_copy),
        )
        // Requests
        .route("/requests", post(requests::create_request))
        .route("/requests/:id", get(requests::get_request))
        .route("/requests/:id", delete(requests::delete_request))
        .route("/requests/:id/status", put(requests::update_request_status))
        .route("/requests/:id/extend", put(requests::extend_request))
        .route("/users/:id/requests", get(requests::list_user_requests))
        .route(
            "/books/:isbn/libraries/:library_id/waiting",
            get(requests::get_waiting_list),
        )
        // Transfers
        .route("/transfers", post(transfers::create_transfer))
        .route("/transfers/:id", get(transfers::get_transfer))
        .route("/transfers/:id", delete(transfers::delete_transfer))
        .route("/transfers/:id/accept", post(transfers::accept_transfer))
        .route("/transfers/:id/reject", post(transfers::reject_transfer))
        .route("/transfers/:id/cancel", post(transfers::cancel_transfer))
        .route("/libraries/:id/transfers", get(transfers::list_library_transfers))
        // Punishments
        .route("/punishments", post(punishments::issue_punishment))
        .route("/punishments/:id", get(punishments::get_punishment))
        .route("/punishments/:id/level", put(punishments::update_punishment_level))
        .route("/users/:id/punishments", get(punishments::list_user_punishments))
        // Notifications
        .route("/notifications/broadcast", post(notifications::create_broadcast))
        .route("/notifications/stream", get(notifications::stream_notifications))
        .route("/notifications/:id", delete(notifications::delete_notification))
        .route("/users/:id/notifications", get(notifications::list_user_notifications))
        .route(
            "/libraries/:id/notifications",
            get(notifications::list_library_notifications),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
