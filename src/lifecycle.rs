//! Transition tables for borrow requests and transfers
//!
//! Every state change goes through [`next_request_status`] or
//! [`next_transfer_status`]. Both match every (state, event) pair without a
//! wildcard arm, so adding a status or an event forces the table to be
//! revisited.

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::enums::{RequestStatus, TransferStatus},
};

/// Event applied to an existing borrow request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestEvent {
    /// Pending or Waiting to Canceled
    Cancel,
    /// Pending or Waiting to Requested
    Grant,
    /// Waiting to Pending, once a copy can be set aside
    Reserve,
    /// Requested or NotReturned to Returned
    Return,
    /// Requested to NotReturned
    MarkNotReturned,
    /// Requested stays Requested with a new end date
    ExtendTime,
}

impl RequestEvent {
    /// Event that leads to `target`, if a client may ask for that status
    pub fn toward(target: RequestStatus) -> Option<Self> {
        match target {
            RequestStatus::Canceled => Some(RequestEvent::Cancel),
            RequestStatus::Requested => Some(RequestEvent::Grant),
            RequestStatus::Pending => Some(RequestEvent::Reserve),
            RequestStatus::Returned => Some(RequestEvent::Return),
            RequestStatus::NotReturned => Some(RequestEvent::MarkNotReturned),
            RequestStatus::Waiting => None,
        }
    }
}

impl std::fmt::Display for RequestEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RequestEvent::Cancel => "Canceled",
            RequestEvent::Grant => "Requested",
            RequestEvent::Reserve => "Pending",
            RequestEvent::Return => "Returned",
            RequestEvent::MarkNotReturned => "NotReturned",
            RequestEvent::ExtendTime => "ExtendTime",
        };
        write!(f, "{}", label)
    }
}

/// Resolve the status a request moves to, or `InvalidTransition`
pub fn next_request_status(
    current: RequestStatus,
    event: RequestEvent,
) -> AppResult<RequestStatus> {
    use RequestStatus::*;

    let next = match event {
        RequestEvent::Cancel => match current {
            Pending | Waiting => Some(Canceled),
            Requested | Returned | NotReturned | Canceled => None,
        },
        RequestEvent::Grant => match current {
            Pending | Waiting => Some(Requested),
            Requested | Returned | NotReturned | Canceled => None,
        },
        RequestEvent::Reserve => match current {
            Waiting => Some(Pending),
            Pending | Requested | Returned | NotReturned | Canceled => None,
        },
        RequestEvent::Return => match current {
            Requested | NotReturned => Some(Returned),
            Pending | Waiting | Returned | Canceled => None,
        },
        RequestEvent::MarkNotReturned => match current {
            Requested => Some(NotReturned),
            Pending | Waiting | Returned | NotReturned | Canceled => None,
        },
        RequestEvent::ExtendTime => match current {
            Requested => Some(Requested),
            Pending | Waiting | Returned | NotReturned | Canceled => None,
        },
    };

    next.ok_or_else(|| AppError::invalid_transition(current, event))
}

/// Only closed requests may be deleted
pub fn ensure_request_deletable(current: RequestStatus) -> AppResult<()> {
    match current {
        RequestStatus::Returned | RequestStatus::Canceled => Ok(()),
        RequestStatus::Pending
        | RequestStatus::Waiting
        | RequestStatus::Requested
        | RequestStatus::NotReturned => Err(AppError::invalid_transition(current, "Deleted")),
    }
}

/// Event applied to a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferEvent {
    Accept,
    Reject,
    Cancel,
}

impl std::fmt::Display for TransferEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TransferEvent::Accept => "Accepted",
            TransferEvent::Reject => "Rejected",
            TransferEvent::Cancel => "Canceled",
        };
        write!(f, "{}", label)
    }
}

/// Resolve the status a transfer moves to; every transition is one-shot out of Pending
pub fn next_transfer_status(
    current: TransferStatus,
    event: TransferEvent,
) -> AppResult<TransferStatus> {
    use TransferStatus::*;

    match current {
        Pending => Ok(match event {
            TransferEvent::Accept => Accepted,
            TransferEvent::Reject => Rejected,
            TransferEvent::Cancel => Canceled,
        }),
        Accepted | Rejected | Canceled => Err(AppError::invalid_transition(current, event)),
    }
}

/// A transfer may be deleted once it has left Pending
pub fn ensure_transfer_deletable(current: TransferStatus) -> AppResult<()> {
    match current {
        TransferStatus::Pending => Err(AppError::invalid_transition(current, "Deleted")),
        TransferStatus::Accepted | TransferStatus::Rejected | TransferStatus::Canceled => Ok(()),
    }
}
