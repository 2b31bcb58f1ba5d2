//! Punishment endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::punishment::{IssuePunishment, Punishment, UpdatePunishmentLevel},
    AppState,
};

/// Issue a punishment for a request
#[utoipa::path(
    post,
    path = "/punishments",
    tag = "punishments",
    request_body = IssuePunishment,
    responses(
        (status = 201, description = "Punishment issued at level 1", body = Punishment),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already punished")
    )
)]
pub async fn issue_punishment(
    State(state): State<AppState>,
    Json(request): Json<IssuePunishment>,
) -> AppResult<(StatusCode, Json<Punishment>)> {
    let punishment = state.services.punishments.issue(request).await?;
    Ok((StatusCode::CREATED, Json(punishment)))
}

/// Get a punishment
#[utoipa::path(
    get,
    path = "/punishments/{id}",
    tag = "punishments",
    params(("id" = i32, Path, description = "Punishment ID")),
    responses(
        (status = 200, description = "Punishment details", body = Punishment),
        (status = 404, description = "Punishment not found")
    )
)]
pub async fn get_punishment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Punishment>> {
    let punishment = state.services.punishments.get(id).await?;
    Ok(Json(punishment))
}

/// Change the level of a punishment
#[utoipa::path(
    put,
    path = "/punishments/{id}/level",
    tag = "punishments",
    params(("id" = i32, Path, description = "Punishment ID")),
    request_body = UpdatePunishmentLevel,
    responses(
        (status = 200, description = "Level updated", body = Punishment),
        (status = 400, description = "Level outside 1..5"),
        (status = 404, description = "Punishment not found")
    )
)]
pub async fn update_punishment_level(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdatePunishmentLevel>,
) -> AppResult<Json<Punishment>> {
    let punishment = state
        .services
        .punishments
        .update_level(id, request.level)
        .await?;
    Ok(Json(punishment))
}

/// Punishments attached to the requests of a user
#[utoipa::path(
    get,
    path = "/users/{id}/punishments",
    tag = "punishments",
    params(("id" = i32, Path, description = "User ID")),
    responses((status = 200, description = "User's punishments", body = Vec<Punishment>))
)]
pub async fn list_user_punishments(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<Punishment>>> {
    let punishments = state.services.punishments.list_by_user(user_id).await?;
    Ok(Json(punishments))
}
