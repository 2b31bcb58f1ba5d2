//! Transfer model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::TransferStatus;

/// Relocation of a physical copy between two libraries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transfer {
    pub id: i32,
    pub physical_copy_id: i32,
    pub source_library_id: i32,
    pub destination_library_id: i32,
    pub start_date: DateTime<Utc>,
    /// Set when the transfer leaves Pending
    pub end_date: Option<DateTime<Utc>>,
    pub status: TransferStatus,
}

/// Create transfer payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTransfer {
    pub physical_copy_id: i32,
    pub source_library_id: i32,
    pub destination_library_id: i32,
}

/// Fields written when a transfer row is inserted
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub physical_copy_id: i32,
    pub source_library_id: i32,
    pub destination_library_id: i32,
    pub start_date: DateTime<Utc>,
}
