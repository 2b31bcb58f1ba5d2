//! Notification model and the events that produce notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Informational message addressed to a user, a library, or everyone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub emitted_date: DateTime<Utc>,
    /// Expiry; none means the notification never expires
    pub end_date: Option<DateTime<Utc>>,
    pub for_all: bool,
    pub user_id: Option<i32>,
    pub request_id: Option<i32>,
    pub library_id: Option<i32>,
}

impl Notification {
    /// Expired notifications are hidden from active listings
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date.map_or(true, |end| end >= now)
    }
}

/// Trigger that produces a notification
///
/// Each variant carries only the addressing fields relevant to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum NotificationEvent {
    /// A copy was handed to a user
    RequestIssued {
        user_id: i32,
        request_id: i32,
        isbn: String,
    },
    /// A user joined the waiting list; suggests a transfer to the library
    WaitingListEntered {
        library_id: i32,
        request_id: i32,
        isbn: String,
    },
    /// Another library asked for one of the source library's copies
    TransferRequested {
        source_library_id: i32,
        transfer_id: i32,
        physical_copy_id: i32,
    },
    /// An accepted transfer is on its way to the destination library
    TransferArriving {
        destination_library_id: i32,
        transfer_id: i32,
        physical_copy_id: i32,
    },
    PunishmentIssued {
        user_id: i32,
        request_id: i32,
        reason: String,
    },
    /// Manual message to every user
    Broadcast {
        title: String,
        description: String,
        end_date: Option<DateTime<Utc>>,
    },
}

impl NotificationEvent {
    /// Build the row persisted for this event
    pub fn to_new_notification(&self, now: DateTime<Utc>) -> NewNotification {
        let base = NewNotification {
            title: String::new(),
            description: String::new(),
            emitted_date: now,
            end_date: None,
            for_all: false,
            user_id: None,
            request_id: None,
            library_id: None,
        };

        match self {
            NotificationEvent::RequestIssued {
                user_id,
                request_id,
                isbn,
            } => NewNotification {
                title: "Request".to_string(),
                description: format!("Your request for {} has been accepted", isbn),
                user_id: Some(*user_id),
                request_id: Some(*request_id),
                ..base
            },
            NotificationEvent::WaitingListEntered {
                library_id,
                request_id,
                isbn,
            } => NewNotification {
                title: "Transfer suggestion".to_string(),
                description: format!(
                    "A user is waiting for {}; consider requesting a copy from another library",
                    isbn
                ),
                library_id: Some(*library_id),
                request_id: Some(*request_id),
                ..base
            },
            NotificationEvent::TransferRequested {
                source_library_id,
                transfer_id,
                physical_copy_id,
            } => NewNotification {
                title: "Transfer requested".to_string(),
                description: format!(
                    "Transfer {} asks for physical copy {}",
                    transfer_id, physical_copy_id
                ),
                library_id: Some(*source_library_id),
                ..base
            },
            NotificationEvent::TransferArriving {
                destination_library_id,
                transfer_id,
                physical_copy_id,
            } => NewNotification {
                title: "Book arriving".to_string(),
                description: format!(
                    "Physical copy {} is on its way (transfer {})",
                    physical_copy_id, transfer_id
                ),
                library_id: Some(*destination_library_id),
                ..base
            },
            NotificationEvent::PunishmentIssued {
                user_id,
                request_id,
                reason,
            } => NewNotification {
                title: "Punishment".to_string(),
                description: reason.clone(),
                user_id: Some(*user_id),
                request_id: Some(*request_id),
                ..base
            },
            NotificationEvent::Broadcast {
                title,
                description,
                end_date,
            } => NewNotification {
                title: title.clone(),
                description: description.clone(),
                end_date: *end_date,
                for_all: true,
                ..base
            },
        }
    }
}

/// Fields written when a notification row is inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub title: String,
    pub description: String,
    pub emitted_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub for_all: bool,
    pub user_id: Option<i32>,
    pub request_id: Option<i32>,
    pub library_id: Option<i32>,
}

/// Manual broadcast payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBroadcast {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,
    pub end_date: Option<DateTime<Utc>>,
}
