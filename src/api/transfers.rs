//! Transfer endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::transfer::{CreateTransfer, Transfer},
    AppState,
};

/// Request a transfer of a copy between two libraries
#[utoipa::path(
    post,
    path = "/transfers",
    tag = "transfers",
    request_body = CreateTransfer,
    responses(
        (status = 201, description = "Transfer created", body = Transfer),
        (status = 400, description = "Source and destination are the same library"),
        (status = 404, description = "Copy not found"),
        (status = 409, description = "Copy not AtLibrary"),
        (status = 422, description = "Copy not at the source library")
    )
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(request): Json<CreateTransfer>,
) -> AppResult<(StatusCode, Json<Transfer>)> {
    let transfer = state.services.transfers.create(request).await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

/// Get a transfer
#[utoipa::path(
    get,
    path = "/transfers/{id}",
    tag = "transfers",
    params(("id" = i32, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Transfer details", body = Transfer),
        (status = 404, description = "Transfer not found")
    )
)]
pub async fn get_transfer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Transfer>> {
    let transfer = state.services.transfers.get(id).await?;
    Ok(Json(transfer))
}

/// Accept a pending transfer
#[utoipa::path(
    post,
    path = "/transfers/{id}/accept",
    tag = "transfers",
    params(("id" = i32, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Transfer accepted, copy in transfer", body = Transfer),
        (status = 404, description = "Transfer not found"),
        (status = 409, description = "Transfer not pending or copy not AtLibrary")
    )
)]
pub async fn accept_transfer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Transfer>> {
    let transfer = state.services.transfers.accept(id).await?;
    Ok(Json(transfer))
}

/// Reject a pending transfer
#[utoipa::path(
    post,
    path = "/transfers/{id}/reject",
    tag = "transfers",
    params(("id" = i32, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Transfer rejected", body = Transfer),
        (status = 404, description = "Transfer not found"),
        (status = 409, description = "Transfer not pending")
    )
)]
pub async fn reject_transfer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Transfer>> {
    let transfer = state.services.transfers.reject(id).await?;
    Ok(Json(transfer))
}

/// Cancel a pending transfer
#[utoipa::path(
    post,
    path = "/transfers/{id}/cancel",
    tag = "transfers",
    params(("id" = i32, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Transfer canceled", body = Transfer),
        (status = 404, description = "Transfer not found"),
        (status = 409, description = "Transfer not pending")
    )
)]
pub async fn cancel_transfer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Transfer>> {
    let transfer = state.services.transfers.cancel(id).await?;
    Ok(Json(transfer))
}

/// Delete a transfer that is no longer pending
#[utoipa::path(
    delete,
    path = "/transfers/{id}",
    tag = "transfers",
    params(("id" = i32, Path, description = "Transfer ID")),
    responses(
        (status = 204, description = "Transfer deleted"),
        (status = 404, description = "Transfer not found"),
        (status = 409, description = "Transfer still pending")
    )
)]
pub async fn delete_transfer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.transfers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Transfers leaving or reaching a library
#[utoipa::path(
    get,
    path = "/libraries/{id}/transfers",
    tag = "transfers",
    params(("id" = i32, Path, description = "Library ID")),
    responses((status = 200, description = "Library transfers", body = Vec<Transfer>))
)]
pub async fn list_library_transfers(
    State(state): State<AppState>,
    Path(library_id): Path<i32>,
) -> AppResult<Json<Vec<Transfer>>> {
    let transfers = state.services.transfers.list_by_library(library_id).await?;
    Ok(Json(transfers))
}
