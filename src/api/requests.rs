//! Borrow request endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::request::{BorrowRequest, CreateRequest, ExtendRequest, UpdateRequestStatus},
    AppState,
};

/// Create a borrow request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created", body = BorrowRequest),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Duplicate request or availability precondition violated"),
        (status = 422, description = "Borrowing limit reached")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    Json(request): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<BorrowRequest>)> {
    let created = state.services.requests.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a borrow request
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = BorrowRequest),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRequest>> {
    let request = state.services.requests.get(id).await?;
    Ok(Json(request))
}

/// Change the status of a borrow request
#[utoipa::path(
    put,
    path = "/requests/{id}/status",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    request_body = UpdateRequestStatus,
    responses(
        (status = 200, description = "Status changed", body = BorrowRequest),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Transition not allowed or no copy available")
    )
)]
pub async fn update_request_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateRequestStatus>,
) -> AppResult<Json<BorrowRequest>> {
    let updated = state.services.requests.change_status(id, request).await?;
    Ok(Json(updated))
}

/// Extend the end date of a Requested request
#[utoipa::path(
    put,
    path = "/requests/{id}/extend",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    request_body = ExtendRequest,
    responses(
        (status = 200, description = "End date updated", body = BorrowRequest),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not Requested")
    )
)]
pub async fn extend_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<ExtendRequest>,
) -> AppResult<Json<BorrowRequest>> {
    let updated = state.services.requests.extend_time(id, request.end_date).await?;
    Ok(Json(updated))
}

/// Delete a Returned or Canceled request
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request still active")
    )
)]
pub async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.requests.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the requests of a user
#[utoipa::path(
    get,
    path = "/users/{id}/requests",
    tag = "requests",
    params(("id" = i32, Path, description = "User ID")),
    responses((status = 200, description = "User's requests", body = Vec<BorrowRequest>))
)]
pub async fn list_user_requests(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<BorrowRequest>>> {
    let requests = state.services.requests.list_by_user(user_id).await?;
    Ok(Json(requests))
}

/// Waiting list of a title at a library
#[utoipa::path(
    get,
    path = "/books/{isbn}/libraries/{library_id}/waiting",
    tag = "requests",
    params(
        ("isbn" = String, Path, description = "ISBN"),
        ("library_id" = i32, Path, description = "Library ID")
    ),
    responses((status = 200, description = "Waiting requests, oldest first", body = Vec<BorrowRequest>))
)]
pub async fn get_waiting_list(
    State(state): State<AppState>,
    Path((isbn, library_id)): Path<(String, i32)>,
) -> AppResult<Json<Vec<BorrowRequest>>> {
    let requests = state.services.requests.waiting_list(&isbn, library_id).await?;
    Ok(Json(requests))
}
