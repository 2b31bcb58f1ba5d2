//! Notification endpoints and live stream

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    Stream, StreamExt,
};

use crate::{
    error::AppResult,
    models::notification::{CreateBroadcast, Notification},
    AppState,
};

/// Send a notification to every user
#[utoipa::path(
    post,
    path = "/notifications/broadcast",
    tag = "notifications",
    request_body = CreateBroadcast,
    responses(
        (status = 201, description = "Broadcast created", body = Notification),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_broadcast(
    State(state): State<AppState>,
    Json(request): Json<CreateBroadcast>,
) -> AppResult<(StatusCode, Json<Notification>)> {
    let notification = state.services.notifications.broadcast(request).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

/// Delete a notification
#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "notifications",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.notifications.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Active notifications of a user, broadcasts included
#[utoipa::path(
    get,
    path = "/users/{id}/notifications",
    tag = "notifications",
    params(("id" = i32, Path, description = "User ID")),
    responses((status = 200, description = "Unexpired notifications", body = Vec<Notification>))
)]
pub async fn list_user_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = state.services.notifications.active_for_user(user_id).await?;
    Ok(Json(notifications))
}

/// Active notifications of a library
#[utoipa::path(
    get,
    path = "/libraries/{id}/notifications",
    tag = "notifications",
    params(("id" = i32, Path, description = "Library ID")),
    responses((status = 200, description = "Unexpired notifications", body = Vec<Notification>))
)]
pub async fn list_library_notifications(
    State(state): State<AppState>,
    Path(library_id): Path<i32>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = state
        .services
        .notifications
        .active_for_library(library_id)
        .await?;
    Ok(Json(notifications))
}

/// Server-sent events carrying every notification emitted from now on
#[utoipa::path(
    get,
    path = "/notifications/stream",
    tag = "notifications",
    responses((status = 200, description = "text/event-stream of NotificationEvent JSON payloads"))
)]
pub async fn stream_notifications(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = BroadcastStream::new(state.live.subscribe()).filter_map(|message| match message {
        Ok(event) => Some(Event::default().event("notification").json_data(&event)),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("Notification stream subscriber lagged, {} events dropped", skipped);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
