//! Punishment model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::PunishmentLevel;

/// Sanction attached to exactly one borrow request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Punishment {
    pub id: i32,
    pub request_id: i32,
    pub reason: String,
    #[schema(value_type = i16, minimum = 1, maximum = 5)]
    pub level: PunishmentLevel,
    pub emitted_date: DateTime<Utc>,
}

/// Issue punishment payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct IssuePunishment {
    pub request_id: i32,
    #[validate(length(min = 1, max = 500, message = "Reason must be between 1 and 500 characters"))]
    pub reason: String,
}

/// Level update payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdatePunishmentLevel {
    #[schema(value_type = i16, minimum = 1, maximum = 5)]
    pub level: PunishmentLevel,
}
