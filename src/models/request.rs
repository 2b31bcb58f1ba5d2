//! Borrow request model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::RequestStatus;

/// A user's claim on a title at a library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequest {
    pub id: i32,
    pub user_id: i32,
    pub isbn: String,
    pub library_id: i32,
    /// Assigned copy, none while waiting
    pub physical_copy_id: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: RequestStatus,
}

/// Create request payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    pub user_id: i32,
    #[validate(length(min = 1, max = 20, message = "ISBN must be between 1 and 20 characters"))]
    pub isbn: String,
    pub library_id: i32,
    /// Copy to assign when creating a Pending request
    pub physical_copy_id: Option<i32>,
    /// Initial status: Pending, Requested or Waiting
    pub status: RequestStatus,
    /// Defaults to now
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Status change payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRequestStatus {
    pub status: RequestStatus,
    /// End date for transitions that set one (Requested, Pending)
    pub end_date: Option<DateTime<Utc>>,
}

/// Extend time payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExtendRequest {
    pub end_date: DateTime<Utc>,
}

/// Fields written when a request row is inserted
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub user_id: i32,
    pub isbn: String,
    pub library_id: i32,
    pub physical_copy_id: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: RequestStatus,
}
