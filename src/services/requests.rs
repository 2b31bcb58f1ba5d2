//! Borrow request lifecycle

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use validator::Validate;

use super::{copies::require_copy, notifications::NotificationIssuer};
use crate::{
    clock::Clock,
    config::CirculationConfig,
    error::{AppError, AppResult},
    lifecycle::{ensure_request_deletable, next_request_status, RequestEvent},
    models::{
        enums::{PhysicalCopyStatus, RequestStatus},
        notification::NotificationEvent,
        physical_copy::PhysicalCopy,
        request::{BorrowRequest, CreateRequest, NewRequest, UpdateRequestStatus},
    },
    repository::{Repository, StoreTx},
};

#[derive(Clone)]
pub struct RequestService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    issuer: NotificationIssuer,
    policy: CirculationConfig,
}

impl RequestService {
    pub fn new(
        repository: Repository,
        clock: Arc<dyn Clock>,
        issuer: NotificationIssuer,
        policy: CirculationConfig,
    ) -> Self {
        Self {
            repository,
            clock,
            issuer,
            policy,
        }
    }

    /// Create a request as Pending, Requested or Waiting
    ///
    /// Checks run in a fixed order: duplicate request, borrowing limit, then
    /// availability. Requested and Pending need an AtLibrary copy, which is
    /// assigned immediately; Waiting needs the opposite, no copy available.
    pub async fn create(&self, data: CreateRequest) -> AppResult<BorrowRequest> {
        data.validate()?;

        if !matches!(
            data.status,
            RequestStatus::Pending | RequestStatus::Requested | RequestStatus::Waiting
        ) {
            return Err(AppError::Validation(format!(
                "A request cannot be created as {}",
                data.status
            )));
        }
        if data.physical_copy_id.is_some() && data.status != RequestStatus::Pending {
            return Err(AppError::Validation(format!(
                "A physical copy can only be named when creating a Pending request, not {}",
                data.status
            )));
        }

        let now = self.clock.now();
        let start_date = data.start_date.unwrap_or(now);
        if let Some(end_date) = data.end_date {
            ensure_end_after_start(start_date, end_date)?;
        }

        let mut tx = self.repository.begin().await?;
        tx.lock_user_requests(data.user_id).await?;

        if tx.has_active_request(data.user_id, &data.isbn).await? {
            return Err(AppError::DuplicateActiveRequest {
                user_id: data.user_id,
                isbn: data.isbn,
            });
        }

        let active = tx.count_active_requests(data.user_id).await?;
        if active >= self.policy.max_active_requests {
            return Err(AppError::BorrowLimitExceeded {
                user_id: data.user_id,
                limit: self.policy.max_active_requests,
            });
        }

        let (physical_copy_id, end_date) = match data.status {
            RequestStatus::Requested => {
                let copy = claim_any_copy(tx.as_mut(), &data.isbn, data.library_id).await?;
                (Some(copy.id), Some(data.end_date.unwrap_or(self.loan_end(start_date))))
            }
            RequestStatus::Pending => {
                let copy = match data.physical_copy_id {
                    Some(copy_id) => {
                        claim_given_copy(tx.as_mut(), copy_id, &data.isbn, data.library_id).await?
                    }
                    None => claim_any_copy(tx.as_mut(), &data.isbn, data.library_id).await?,
                };
                (Some(copy.id), Some(data.end_date.unwrap_or(self.loan_end(start_date))))
            }
            _ => {
                if tx
                    .find_available_copy(&data.isbn, data.library_id)
                    .await?
                    .is_some()
                {
                    return Err(AppError::CopyAvailable {
                        isbn: data.isbn,
                        library_id: data.library_id,
                    });
                }
                (None, data.end_date)
            }
        };

        let request = tx
            .insert_request(&NewRequest {
                user_id: data.user_id,
                isbn: data.isbn,
                library_id: data.library_id,
                physical_copy_id,
                start_date,
                end_date,
                status: data.status,
            })
            .await?;

        let event = match request.status {
            RequestStatus::Requested => Some(NotificationEvent::RequestIssued {
                user_id: request.user_id,
                request_id: request.id,
                isbn: request.isbn.clone(),
            }),
            RequestStatus::Waiting => Some(NotificationEvent::WaitingListEntered {
                library_id: request.library_id,
                request_id: request.id,
                isbn: request.isbn.clone(),
            }),
            _ => None,
        };
        if let Some(ref event) = event {
            self.issuer.record(tx.as_mut(), event).await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Request {} created as {} for user {} ({} at library {})",
            request.id,
            request.status,
            request.user_id,
            request.isbn,
            request.library_id
        );
        self.issuer.publish(event.as_slice());
        Ok(request)
    }

    /// Move a request to the given status
    pub async fn change_status(
        &self,
        id: i32,
        data: UpdateRequestStatus,
    ) -> AppResult<BorrowRequest> {
        let mut tx = self.repository.begin().await?;
        let mut request = require_request(tx.as_mut(), id).await?;

        let event = RequestEvent::toward(data.status)
            .ok_or_else(|| AppError::invalid_transition(request.status, data.status))?;
        let next = next_request_status(request.status, event)?;

        let now = self.clock.now();
        let mut notification = None;

        match event {
            RequestEvent::Cancel | RequestEvent::Return => {
                if let Some(copy_id) = request.physical_copy_id {
                    release_copy(tx.as_mut(), copy_id).await?;
                }
            }
            RequestEvent::Grant | RequestEvent::Reserve => {
                if request.physical_copy_id.is_none() {
                    let claimed = claim_any_copy(tx.as_mut(), &request.isbn, request.library_id).await;
                    let copy = match claimed {
                        // Reserving needs a copy on the shelf now
                        Err(AppError::NoCopyAvailable { .. }) if event == RequestEvent::Reserve => {
                            return Err(AppError::invalid_transition(request.status, data.status));
                        }
                        other => other?,
                    };
                    request.physical_copy_id = Some(copy.id);
                }
                let end_date = data
                    .end_date
                    .unwrap_or_else(|| self.loan_end(now.max(request.start_date)));
                ensure_end_after_start(request.start_date, end_date)?;
                request.end_date = Some(end_date);

                if event == RequestEvent::Grant {
                    notification = Some(NotificationEvent::RequestIssued {
                        user_id: request.user_id,
                        request_id: request.id,
                        isbn: request.isbn.clone(),
                    });
                }
            }
            RequestEvent::MarkNotReturned | RequestEvent::ExtendTime => {}
        }

        let previous = request.status;
        request.status = next;
        tx.update_request(&request).await?;

        if let Some(ref event) = notification {
            self.issuer.record(tx.as_mut(), event).await?;
        }

        tx.commit().await?;

        tracing::info!("Request {} moved from {} to {}", id, previous, next);
        self.issuer.publish(notification.as_slice());
        Ok(request)
    }

    /// Push back the end date of a Requested request
    pub async fn extend_time(&self, id: i32, end_date: DateTime<Utc>) -> AppResult<BorrowRequest> {
        let mut tx = self.repository.begin().await?;
        let mut request = require_request(tx.as_mut(), id).await?;

        next_request_status(request.status, RequestEvent::ExtendTime)?;
        ensure_end_after_start(request.start_date, end_date)?;

        request.end_date = Some(end_date);
        tx.update_request(&request).await?;
        tx.commit().await?;

        tracing::info!("Request {} extended until {}", id, end_date);
        Ok(request)
    }

    /// Delete a Returned or Canceled request with its punishment and notifications
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.repository.begin().await?;
        let request = require_request(tx.as_mut(), id).await?;

        ensure_request_deletable(request.status)?;

        let punishments = tx.delete_punishment_by_request(id).await?;
        let notifications = tx.delete_notifications_by_request(id).await?;
        tx.delete_request(id).await?;
        tx.commit().await?;

        tracing::info!(
            "Request {} deleted with {} punishments and {} notifications",
            id,
            punishments,
            notifications
        );
        Ok(())
    }

    pub async fn get(&self, id: i32) -> AppResult<BorrowRequest> {
        let mut tx = self.repository.begin().await?;
        require_request(tx.as_mut(), id).await
    }

    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<BorrowRequest>> {
        let mut tx = self.repository.begin().await?;
        tx.list_requests_by_user(user_id).await
    }

    /// Waiting list of a title at a library, oldest first
    pub async fn waiting_list(&self, isbn: &str, library_id: i32) -> AppResult<Vec<BorrowRequest>> {
        let mut tx = self.repository.begin().await?;
        tx.list_waiting(isbn, library_id).await
    }

    fn loan_end(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        from + Duration::days(self.policy.default_loan_days)
    }
}

fn ensure_end_after_start(start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> AppResult<()> {
    if end_date < start_date {
        return Err(AppError::Validation(format!(
            "End date {} is before start date {}",
            end_date, start_date
        )));
    }
    Ok(())
}

/// Assign any AtLibrary copy of the title at the library
async fn claim_any_copy(
    tx: &mut dyn StoreTx,
    isbn: &str,
    library_id: i32,
) -> AppResult<PhysicalCopy> {
    tx.claim_available_copy(isbn, library_id)
        .await?
        .ok_or_else(|| AppError::NoCopyAvailable {
            isbn: isbn.to_string(),
            library_id,
        })
}

/// Assign a specific copy, which must be an AtLibrary copy of the title at the library
async fn claim_given_copy(
    tx: &mut dyn StoreTx,
    copy_id: i32,
    isbn: &str,
    library_id: i32,
) -> AppResult<PhysicalCopy> {
    let copy = require_copy(tx, copy_id).await?;
    if copy.isbn != isbn || copy.library_id != library_id {
        return Err(AppError::BadRequest(format!(
            "Physical copy {} is not a copy of {} at library {}",
            copy_id, isbn, library_id
        )));
    }

    tx.compare_and_set_copy_status(
        copy_id,
        PhysicalCopyStatus::AtLibrary,
        PhysicalCopyStatus::Requested,
    )
    .await?
    .ok_or_else(|| AppError::NoCopyAvailable {
        isbn: isbn.to_string(),
        library_id,
    })
}

/// Put an assigned copy back on the shelf
async fn release_copy(tx: &mut dyn StoreTx, copy_id: i32) -> AppResult<()> {
    let released = tx
        .compare_and_set_copy_status(
            copy_id,
            PhysicalCopyStatus::Requested,
            PhysicalCopyStatus::AtLibrary,
        )
        .await?;

    if released.is_none() {
        let copy = require_copy(tx, copy_id).await?;
        tracing::warn!(
            "Physical copy {} released while {}; forcing AtLibrary",
            copy_id,
            copy.status
        );
        tx.set_copy_status(copy_id, PhysicalCopyStatus::AtLibrary)
            .await?;
    }
    Ok(())
}

/// Load a request inside an open transaction
pub(crate) async fn require_request(tx: &mut dyn StoreTx, id: i32) -> AppResult<BorrowRequest> {
    tx.get_request(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))
}
