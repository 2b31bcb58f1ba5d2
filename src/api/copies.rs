//! Physical copy endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        enums::PhysicalCopyStatus,
        physical_copy::{CreatePhysicalCopy, LibraryAvailability, PhysicalCopy, ReceiveCopy},
    },
    AppState,
};

/// Direct status change request
#[derive(Deserialize, ToSchema)]
pub struct SetCopyStatusRequest {
    pub status: PhysicalCopyStatus,
}

/// Availability of a title at one library
#[derive(Serialize, ToSchema)]
pub struct AvailableCopyResponse {
    /// Number of AtLibrary copies
    pub available: i64,
    /// One of them, if any
    pub copy: Option<PhysicalCopy>,
}

/// Register a physical copy
#[utoipa::path(
    post,
    path = "/copies",
    tag = "copies",
    request_body = CreatePhysicalCopy,
    responses(
        (status = 201, description = "Copy registered", body = PhysicalCopy),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_copy(
    State(state): State<AppState>,
    Json(request): Json<CreatePhysicalCopy>,
) -> AppResult<(StatusCode, Json<PhysicalCopy>)> {
    let copy = state.services.copies.register(request).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Get a physical copy
#[utoipa::path(
    get,
    path = "/copies/{id}",
    tag = "copies",
    params(("id" = i32, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy details", body = PhysicalCopy),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_copy(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<PhysicalCopy>> {
    let copy = state.services.copies.get(id).await?;
    Ok(Json(copy))
}

/// Delete a physical copy (AtLibrary and unreferenced only)
#[utoipa::path(
    delete,
    path = "/copies/{id}",
    tag = "copies",
    params(("id" = i32, Path, description = "Copy ID")),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found"),
        (status = 409, description = "Copy not AtLibrary or still referenced")
    )
)]
pub async fn delete_copy(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.copies.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Force the status of a physical copy
#[utoipa::path(
    put,
    path = "/copies/{id}/status",
    tag = "copies",
    params(("id" = i32, Path, description = "Copy ID")),
    request_body = SetCopyStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = PhysicalCopy),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn set_copy_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<SetCopyStatusRequest>,
) -> AppResult<Json<PhysicalCopy>> {
    let copy = state.services.copies.set_status(id, request.status).await?;
    Ok(Json(copy))
}

/// Confirm the arrival of a copy at a library
#[utoipa::path(
    post,
    path = "/copies/{id}/receive",
    tag = "copies",
    params(("id" = i32, Path, description = "Copy ID")),
    request_body = ReceiveCopy,
    responses(
        (status = 200, description = "Copy is AtLibrary at the given library", body = PhysicalCopy),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn receive_copy(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<ReceiveCopy>,
) -> AppResult<Json<PhysicalCopy>> {
    let copy = state.services.copies.receive_copy(id, request.library_id).await?;
    Ok(Json(copy))
}

/// List the copies located at a library
#[utoipa::path(
    get,
    path = "/libraries/{id}/copies",
    tag = "copies",
    params(("id" = i32, Path, description = "Library ID")),
    responses((status = 200, description = "Copies at the library", body = Vec<PhysicalCopy>))
)]
pub async fn list_library_copies(
    State(state): State<AppState>,
    Path(library_id): Path<i32>,
) -> AppResult<Json<Vec<PhysicalCopy>>> {
    let copies = state.services.copies.list_by_library(library_id).await?;
    Ok(Json(copies))
}

/// Available copies of a title grouped by library
#[utoipa::path(
    get,
    path = "/books/{isbn}/availability",
    tag = "copies",
    params(("isbn" = String, Path, description = "ISBN")),
    responses((status = 200, description = "Available copies per library", body = Vec<LibraryAvailability>))
)]
pub async fn get_availability(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<Vec<LibraryAvailability>>> {
    let availability = state.services.copies.availability(&isbn).await?;
    Ok(Json(availability))
}

/// Availability of a title at one library
#[utoipa::path(
    get,
    path = "/books/{isbn}/libraries/{library_id}/available",
    tag = "copies",
    params(
        ("isbn" = String, Path, description = "ISBN"),
        ("library_id" = i32, Path, description = "Library ID")
    ),
    responses((status = 200, description = "Available copies", body = AvailableCopyResponse))
)]
pub async fn get_available_copy(
    State(state): State<AppState>,
    Path((isbn, library_id)): Path<(String, i32)>,
) -> AppResult<Json<AvailableCopyResponse>> {
    let available = state.services.copies.count_available(&isbn, library_id).await?;
    let copy = state
        .services
        .copies
        .find_available_copy(&isbn, library_id)
        .await?;
    Ok(Json(AvailableCopyResponse { available, copy }))
}
