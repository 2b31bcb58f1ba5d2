//! Physical copy model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::PhysicalCopyStatus;

/// One tangible copy of a title, located at a library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PhysicalCopy {
    pub id: i32,
    pub isbn: String,
    /// Current location
    pub library_id: i32,
    pub status: PhysicalCopyStatus,
    pub crea_date: DateTime<Utc>,
}

/// Register copy request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePhysicalCopy {
    #[validate(length(min = 1, max = 20, message = "ISBN must be between 1 and 20 characters"))]
    pub isbn: String,
    pub library_id: i32,
}

/// Staff-confirmed location/status change (arrival after a transfer)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReceiveCopy {
    pub library_id: i32,
}

/// Available copies of a title at one library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LibraryAvailability {
    pub library_id: i32,
    pub available: i64,
}
