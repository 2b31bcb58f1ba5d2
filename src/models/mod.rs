//! Data models for the circulation engine

pub mod enums;
pub mod notification;
pub mod physical_copy;
pub mod punishment;
pub mod request;
pub mod transfer;

// Re-export commonly used types
pub use enums::{PhysicalCopyStatus, PunishmentLevel, RequestStatus, TransferStatus};
pub use notification::{Notification, NotificationEvent};
pub use physical_copy::{LibraryAvailability, PhysicalCopy};
pub use punishment::Punishment;
pub use request::BorrowRequest;
pub use transfer::Transfer;
