//! Circulation workflows over the in-memory store

use chrono::{Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use library_circulation::{
    clock::{Clock, ManualClock},
    config::CirculationConfig,
    error::AppError,
    models::{
        enums::{PhysicalCopyStatus, PunishmentLevel, RequestStatus, TransferStatus},
        notification::{CreateBroadcast, NotificationEvent},
        physical_copy::{CreatePhysicalCopy, PhysicalCopy},
        punishment::IssuePunishment,
        request::{BorrowRequest, CreateRequest, UpdateRequestStatus},
        transfer::CreateTransfer,
    },
    repository::MemoryStore,
    services::{notifications::NotificationSink, Services},
};

/// Sink keeping every emitted event
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn emit(&self, event: &NotificationEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

struct Harness {
    services: Services,
    clock: ManualClock,
    sink: Arc<RecordingSink>,
}

fn harness() -> Harness {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    let sink = Arc::new(RecordingSink::default());
    let services = Services::new(
        Arc::new(MemoryStore::new()),
        Arc::new(clock.clone()),
        sink.clone(),
        CirculationConfig::default(),
    );
    Harness {
        services,
        clock,
        sink,
    }
}

impl Harness {
    async fn copy(&self, isbn: &str, library_id: i32) -> PhysicalCopy {
        self.services
            .copies
            .register(CreatePhysicalCopy {
                isbn: isbn.to_string(),
                library_id,
            })
            .await
            .unwrap()
    }

    async fn request(
        &self,
        user_id: i32,
        isbn: &str,
        library_id: i32,
        status: RequestStatus,
    ) -> Result<BorrowRequest, AppError> {
        self.services
            .requests
            .create(CreateRequest {
                user_id,
                isbn: isbn.to_string(),
                library_id,
                physical_copy_id: None,
                status,
                start_date: None,
                end_date: None,
            })
            .await
    }

    async fn move_to(&self, id: i32, status: RequestStatus) -> Result<BorrowRequest, AppError> {
        self.services
            .requests
            .change_status(
                id,
                UpdateRequestStatus {
                    status,
                    end_date: None,
                },
            )
            .await
    }

    async fn copy_status(&self, id: i32) -> PhysicalCopyStatus {
        self.services.copies.get(id).await.unwrap().status
    }
}

#[tokio::test]
async fn test_requested_creation_claims_copy() {
    let h = harness();
    let copy = h.copy("111", 1).await;

    let request = h.request(1, "111", 1, RequestStatus::Requested).await.unwrap();

    assert_eq!(request.status, RequestStatus::Requested);
    assert_eq!(request.physical_copy_id, Some(copy.id));
    assert_eq!(request.start_date, h.clock.now());
    assert_eq!(request.end_date, Some(request.start_date + Duration::days(14)));
    assert_eq!(h.copy_status(copy.id).await, PhysicalCopyStatus::Requested);
    assert!(matches!(
        h.sink.events().as_slice(),
        [NotificationEvent::RequestIssued { user_id: 1, .. }]
    ));

    let notifications = h.services.notifications.active_for_user(1).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Request");
    assert_eq!(notifications[0].request_id, Some(request.id));
}

#[tokio::test]
async fn test_fourth_active_request_exceeds_limit() {
    let h = harness();
    for isbn in ["111", "222", "333", "444"] {
        h.copy(isbn, 1).await;
    }
    for isbn in ["111", "222", "333"] {
        h.request(1, isbn, 1, RequestStatus::Requested).await.unwrap();
    }

    let result = h.request(1, "444", 1, RequestStatus::Requested).await;
    assert!(matches!(
        result,
        Err(AppError::BorrowLimitExceeded { user_id: 1, limit: 3 })
    ));
    assert_eq!(
        h.services.copies.count_available("444", 1).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_terminal_requests_do_not_count_toward_limit() {
    let h = harness();
    for isbn in ["111", "222", "333", "444"] {
        h.copy(isbn, 1).await;
    }
    let first = h.request(1, "111", 1, RequestStatus::Requested).await.unwrap();
    h.request(1, "222", 1, RequestStatus::Requested).await.unwrap();
    h.request(1, "333", 1, RequestStatus::Requested).await.unwrap();

    h.move_to(first.id, RequestStatus::Returned).await.unwrap();

    assert!(h.request(1, "444", 1, RequestStatus::Requested).await.is_ok());
}

#[tokio::test]
async fn test_duplicate_is_checked_before_limit() {
    let h = harness();
    for isbn in ["111", "222", "333"] {
        h.copy(isbn, 1).await;
        h.request(1, isbn, 1, RequestStatus::Requested).await.unwrap();
    }

    let result = h.request(1, "111", 1, RequestStatus::Waiting).await;
    assert!(matches!(
        result,
        Err(AppError::DuplicateActiveRequest { user_id: 1, .. })
    ));
}

#[tokio::test]
async fn test_limit_is_checked_before_availability() {
    let h = harness();
    for isbn in ["111", "222", "333"] {
        h.copy(isbn, 1).await;
        h.request(1, isbn, 1, RequestStatus::Requested).await.unwrap();
    }

    // No copy of 999 exists, yet the limit is what fails
    let result = h.request(1, "999", 1, RequestStatus::Requested).await;
    assert!(matches!(result, Err(AppError::BorrowLimitExceeded { .. })));
}

#[tokio::test]
async fn test_waiting_requires_no_available_copy() {
    let h = harness();

    let waiting = h.request(2, "222", 1, RequestStatus::Waiting).await.unwrap();
    assert_eq!(waiting.status, RequestStatus::Waiting);
    assert_eq!(waiting.physical_copy_id, None);

    let result = h.request(3, "222", 1, RequestStatus::Requested).await;
    assert!(matches!(result, Err(AppError::NoCopyAvailable { .. })));

    let library = h.services.notifications.active_for_library(1).await.unwrap();
    assert_eq!(library.len(), 1);
    assert_eq!(library[0].title, "Transfer suggestion");

    h.copy("222", 1).await;
    let result = h.request(3, "222", 1, RequestStatus::Waiting).await;
    assert!(matches!(result, Err(AppError::CopyAvailable { .. })));
}

#[tokio::test]
async fn test_pending_with_given_copy() {
    let h = harness();
    h.copy("111", 1).await;
    let wanted = h.copy("111", 1).await;
    let other_title = h.copy("555", 1).await;

    let request = h
        .services
        .requests
        .create(CreateRequest {
            user_id: 1,
            isbn: "111".to_string(),
            library_id: 1,
            physical_copy_id: Some(wanted.id),
            status: RequestStatus::Pending,
            start_date: None,
            end_date: None,
        })
        .await
        .unwrap();

    assert_eq!(request.physical_copy_id, Some(wanted.id));
    assert_eq!(h.copy_status(wanted.id).await, PhysicalCopyStatus::Requested);
    assert!(h.sink.events().is_empty());

    let mismatch = h
        .services
        .requests
        .create(CreateRequest {
            user_id: 2,
            isbn: "111".to_string(),
            library_id: 1,
            physical_copy_id: Some(other_title.id),
            status: RequestStatus::Pending,
            start_date: None,
            end_date: None,
        })
        .await;
    assert!(matches!(mismatch, Err(AppError::BadRequest(_))));

    let taken = h
        .services
        .requests
        .create(CreateRequest {
            user_id: 2,
            isbn: "111".to_string(),
            library_id: 1,
            physical_copy_id: Some(wanted.id),
            status: RequestStatus::Pending,
            start_date: None,
            end_date: None,
        })
        .await;
    assert!(matches!(taken, Err(AppError::NoCopyAvailable { .. })));
}

#[tokio::test]
async fn test_cannot_create_in_terminal_status() {
    let h = harness();
    h.copy("111", 1).await;
    let result = h.request(1, "111", 1, RequestStatus::Returned).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_return_restores_copy() {
    let h = harness();
    let copy = h.copy("111", 1).await;
    let request = h.request(1, "111", 1, RequestStatus::Requested).await.unwrap();

    let returned = h.move_to(request.id, RequestStatus::Returned).await.unwrap();

    assert_eq!(returned.status, RequestStatus::Returned);
    assert_eq!(h.copy_status(copy.id).await, PhysicalCopyStatus::AtLibrary);
}

#[tokio::test]
async fn test_not_returned_then_returned() {
    let h = harness();
    let copy = h.copy("111", 1).await;
    let request = h.request(1, "111", 1, RequestStatus::Requested).await.unwrap();

    h.move_to(request.id, RequestStatus::NotReturned).await.unwrap();
    assert_eq!(h.copy_status(copy.id).await, PhysicalCopyStatus::Requested);

    h.move_to(request.id, RequestStatus::Returned).await.unwrap();
    assert_eq!(h.copy_status(copy.id).await, PhysicalCopyStatus::AtLibrary);
}

#[tokio::test]
async fn test_cancel_pending_releases_copy() {
    let h = harness();
    let copy = h.copy("111", 1).await;
    let request = h.request(1, "111", 1, RequestStatus::Pending).await.unwrap();

    h.move_to(request.id, RequestStatus::Canceled).await.unwrap();
    assert_eq!(h.copy_status(copy.id).await, PhysicalCopyStatus::AtLibrary);
}

#[tokio::test]
async fn test_requested_cannot_be_canceled() {
    let h = harness();
    h.copy("111", 1).await;
    let request = h.request(1, "111", 1, RequestStatus::Requested).await.unwrap();

    let result = h.move_to(request.id, RequestStatus::Canceled).await;
    assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_waiting_promoted_once_copy_arrives() {
    let h = harness();
    let waiting = h.request(1, "111", 1, RequestStatus::Waiting).await.unwrap();

    let result = h.move_to(waiting.id, RequestStatus::Requested).await;
    assert!(matches!(result, Err(AppError::NoCopyAvailable { .. })));

    let copy = h.copy("111", 1).await;
    h.clock.advance(Duration::days(2));
    let granted = h.move_to(waiting.id, RequestStatus::Requested).await.unwrap();

    assert_eq!(granted.physical_copy_id, Some(copy.id));
    assert_eq!(granted.end_date, Some(h.clock.now() + Duration::days(14)));
    assert_eq!(h.copy_status(copy.id).await, PhysicalCopyStatus::Requested);
}

#[tokio::test]
async fn test_waiting_reserved_as_pending() {
    let h = harness();
    let waiting = h.request(1, "111", 1, RequestStatus::Waiting).await.unwrap();
    let copy = h.copy("111", 1).await;

    let pending = h.move_to(waiting.id, RequestStatus::Pending).await.unwrap();
    assert_eq!(pending.status, RequestStatus::Pending);
    assert_eq!(pending.physical_copy_id, Some(copy.id));
    assert!(pending.end_date.is_some());

    // Pending only comes from Waiting
    let again = h.move_to(pending.id, RequestStatus::Pending).await;
    assert!(matches!(again, Err(AppError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_waiting_list_is_oldest_first() {
    let h = harness();
    let first = h.request(1, "111", 1, RequestStatus::Waiting).await.unwrap();
    h.clock.advance(Duration::hours(1));
    let second = h.request(2, "111", 1, RequestStatus::Waiting).await.unwrap();
    h.request(3, "111", 2, RequestStatus::Waiting).await.unwrap();

    let list = h.services.requests.waiting_list("111", 1).await.unwrap();
    let ids: Vec<i32> = list.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn test_transfer_accept_once() {
    let h = harness();
    let copy = h.copy("333", 1).await;

    let transfer = h
        .services
        .transfers
        .create(CreateTransfer {
            physical_copy_id: copy.id,
            source_library_id: 1,
            destination_library_id: 2,
        })
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::Pending);

    let accepted = h.services.transfers.accept(transfer.id).await.unwrap();
    assert_eq!(accepted.status, TransferStatus::Accepted);
    assert!(accepted.end_date.is_some());

    let moved = h.services.copies.get(copy.id).await.unwrap();
    assert_eq!(moved.status, PhysicalCopyStatus::InTransfer);
    assert_eq!(moved.library_id, 1);

    let again = h.services.transfers.accept(transfer.id).await;
    assert!(matches!(again, Err(AppError::InvalidTransition { .. })));

    let events = h.sink.events();
    assert!(matches!(
        events.as_slice(),
        [
            NotificationEvent::TransferRequested { source_library_id: 1, .. },
            NotificationEvent::TransferArriving { destination_library_id: 2, .. }
        ]
    ));
}

#[tokio::test]
async fn test_transfer_preconditions() {
    let h = harness();
    let copy = h.copy("333", 1).await;

    let wrong_source = h
        .services
        .transfers
        .create(CreateTransfer {
            physical_copy_id: copy.id,
            source_library_id: 3,
            destination_library_id: 2,
        })
        .await;
    assert!(matches!(wrong_source, Err(AppError::WrongSourceLibrary { .. })));

    let same_library = h
        .services
        .transfers
        .create(CreateTransfer {
            physical_copy_id: copy.id,
            source_library_id: 1,
            destination_library_id: 1,
        })
        .await;
    assert!(matches!(same_library, Err(AppError::Validation(_))));

    h.request(1, "333", 1, RequestStatus::Requested).await.unwrap();
    let borrowed = h
        .services
        .transfers
        .create(CreateTransfer {
            physical_copy_id: copy.id,
            source_library_id: 1,
            destination_library_id: 2,
        })
        .await;
    assert!(matches!(borrowed, Err(AppError::InvalidCopyState { .. })));

    let missing = h
        .services
        .transfers
        .create(CreateTransfer {
            physical_copy_id: 999,
            source_library_id: 1,
            destination_library_id: 2,
        })
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_transfer_reject_and_delete() {
    let h = harness();
    let copy = h.copy("333", 1).await;
    let transfer = h
        .services
        .transfers
        .create(CreateTransfer {
            physical_copy_id: copy.id,
            source_library_id: 1,
            destination_library_id: 2,
        })
        .await
        .unwrap();

    let pending_delete = h.services.transfers.delete(transfer.id).await;
    assert!(matches!(pending_delete, Err(AppError::InvalidTransition { .. })));

    let rejected = h.services.transfers.reject(transfer.id).await.unwrap();
    assert_eq!(rejected.status, TransferStatus::Rejected);
    assert_eq!(h.copy_status(copy.id).await, PhysicalCopyStatus::AtLibrary);

    let cancel = h.services.transfers.cancel(transfer.id).await;
    assert!(matches!(cancel, Err(AppError::InvalidTransition { .. })));

    h.services.transfers.delete(transfer.id).await.unwrap();
    assert!(matches!(
        h.services.transfers.get(transfer.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_receive_copy_moves_it() {
    let h = harness();
    let copy = h.copy("333", 1).await;
    let transfer = h
        .services
        .transfers
        .create(CreateTransfer {
            physical_copy_id: copy.id,
            source_library_id: 1,
            destination_library_id: 2,
        })
        .await
        .unwrap();
    h.services.transfers.accept(transfer.id).await.unwrap();

    let received = h.services.copies.receive_copy(copy.id, 2).await.unwrap();
    assert_eq!(received.library_id, 2);
    assert_eq!(received.status, PhysicalCopyStatus::AtLibrary);

    // Now borrowable at the destination
    assert!(h.request(1, "333", 2, RequestStatus::Requested).await.is_ok());
}

#[tokio::test]
async fn test_extend_time_only_when_requested() {
    let h = harness();
    h.copy("111", 1).await;
    h.copy("222", 1).await;
    let requested = h.request(1, "111", 1, RequestStatus::Requested).await.unwrap();
    let pending = h.request(1, "222", 1, RequestStatus::Pending).await.unwrap();

    let new_end = requested.start_date + Duration::days(30);
    let extended = h
        .services
        .requests
        .extend_time(requested.id, new_end)
        .await
        .unwrap();
    assert_eq!(extended.end_date, Some(new_end));
    assert_eq!(extended.status, RequestStatus::Requested);

    let result = h.services.requests.extend_time(pending.id, new_end).await;
    assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_delete_only_closed_requests_and_cascade() {
    let h = harness();
    h.copy("111", 1).await;
    let request = h.request(1, "111", 1, RequestStatus::Requested).await.unwrap();
    h.services
        .punishments
        .issue(IssuePunishment {
            request_id: request.id,
            reason: "Damaged cover".to_string(),
        })
        .await
        .unwrap();

    let result = h.services.requests.delete(request.id).await;
    assert!(matches!(result, Err(AppError::InvalidTransition { .. })));

    h.move_to(request.id, RequestStatus::Returned).await.unwrap();
    h.services.requests.delete(request.id).await.unwrap();

    assert!(matches!(
        h.services.requests.get(request.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(h.services.punishments.list_by_user(1).await.unwrap().is_empty());
    assert!(h.services.notifications.active_for_user(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_punishment_issued_once() {
    let h = harness();
    h.copy("111", 1).await;
    let request = h.request(7, "111", 1, RequestStatus::Requested).await.unwrap();

    let punishment = h
        .services
        .punishments
        .issue(IssuePunishment {
            request_id: request.id,
            reason: "Late".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(punishment.level, PunishmentLevel::One);

    let again = h
        .services
        .punishments
        .issue(IssuePunishment {
            request_id: request.id,
            reason: "Late again".to_string(),
        })
        .await;
    assert!(matches!(again, Err(AppError::DuplicatePunishment(id)) if id == request.id));

    let raised = h
        .services
        .punishments
        .update_level(punishment.id, PunishmentLevel::Four)
        .await
        .unwrap();
    assert_eq!(raised.level, PunishmentLevel::Four);

    let listed = h.services.punishments.list_by_user(7).await.unwrap();
    assert_eq!(listed.len(), 1);

    let titles: Vec<String> = h
        .services
        .notifications
        .active_for_user(7)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert!(titles.contains(&"Punishment".to_string()));
}

#[tokio::test]
async fn test_punishment_for_unknown_request() {
    let h = harness();
    let result = h
        .services
        .punishments
        .issue(IssuePunishment {
            request_id: 42,
            reason: "Late".to_string(),
        })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_copy_delete_rules() {
    let h = harness();
    let loose = h.copy("111", 1).await;
    let borrowed = h.copy("222", 1).await;
    let request = h.request(1, "222", 1, RequestStatus::Requested).await.unwrap();

    let in_use = h.services.copies.delete(borrowed.id).await;
    assert!(matches!(in_use, Err(AppError::InvalidCopyState { .. })));

    h.move_to(request.id, RequestStatus::Returned).await.unwrap();
    let referenced = h.services.copies.delete(borrowed.id).await;
    assert!(matches!(referenced, Err(AppError::DependentRecordsExist(_))));

    h.services.copies.delete(loose.id).await.unwrap();
    assert!(matches!(
        h.services.copies.get(loose.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_availability_grouped_by_library() {
    let h = harness();
    h.copy("111", 1).await;
    h.copy("111", 1).await;
    h.copy("111", 2).await;
    h.copy("222", 2).await;
    h.request(1, "111", 2, RequestStatus::Requested).await.unwrap();

    let availability = h.services.copies.availability("111").await.unwrap();
    assert_eq!(availability.len(), 1);
    assert_eq!(availability[0].library_id, 1);
    assert_eq!(availability[0].available, 2);

    assert_eq!(h.services.copies.count_available("111", 2).await.unwrap(), 0);
    assert!(h
        .services
        .copies
        .find_available_copy("111", 2)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_expired_notifications_are_hidden() {
    let h = harness();
    let now = h.clock.now();
    h.services
        .notifications
        .broadcast(CreateBroadcast {
            title: "Closed".to_string(),
            description: "Closed tomorrow".to_string(),
            end_date: Some(now + Duration::days(1)),
        })
        .await
        .unwrap();

    assert_eq!(h.services.notifications.active_for_user(5).await.unwrap().len(), 1);

    h.clock.advance(Duration::days(2));
    assert!(h.services.notifications.active_for_user(5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_requests_claim_last_copy_once() {
    let h = harness();
    let copy = h.copy("111", 1).await;

    let requests = h.services.requests.clone();
    let attempts = (1..=8).map(|user_id| {
        let requests = requests.clone();
        tokio::spawn(async move {
            requests
                .create(CreateRequest {
                    user_id,
                    isbn: "111".to_string(),
                    library_id: 1,
                    physical_copy_id: None,
                    status: RequestStatus::Requested,
                    start_date: None,
                    end_date: None,
                })
                .await
        })
    });

    let mut granted = 0;
    for attempt in attempts.collect::<Vec<_>>() {
        match attempt.await.unwrap() {
            Ok(request) => {
                assert_eq!(request.physical_copy_id, Some(copy.id));
                granted += 1;
            }
            Err(AppError::NoCopyAvailable { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(granted, 1);
}

#[tokio::test]
async fn test_reserve_without_copy_is_invalid_transition() {
    let h = harness();
    let waiting = h.request(1, "111", 1, RequestStatus::Waiting).await.unwrap();

    let result = h.move_to(waiting.id, RequestStatus::Pending).await;
    assert!(matches!(result, Err(AppError::InvalidTransition { .. })));

    let unchanged = h.services.requests.get(waiting.id).await.unwrap();
    assert_eq!(unchanged.status, RequestStatus::Waiting);
    assert_eq!(unchanged.physical_copy_id, None);
}

#[tokio::test]
async fn test_grant_future_request_defaults_end_from_start() {
    let h = harness();
    h.copy("111", 1).await;
    let start = h.clock.now() + Duration::days(30);
    let pending = h
        .services
        .requests
        .create(CreateRequest {
            user_id: 1,
            isbn: "111".to_string(),
            library_id: 1,
            physical_copy_id: None,
            status: RequestStatus::Pending,
            start_date: Some(start),
            end_date: None,
        })
        .await
        .unwrap();

    let granted = h.move_to(pending.id, RequestStatus::Requested).await.unwrap();
    assert_eq!(granted.status, RequestStatus::Requested);
    assert_eq!(granted.end_date, Some(start + Duration::days(14)));
}

#[tokio::test]
async fn test_cancel_waiting_without_copy() {
    let h = harness();
    let other = h.copy("999", 1).await;
    let waiting = h.request(1, "111", 1, RequestStatus::Waiting).await.unwrap();

    let canceled = h.move_to(waiting.id, RequestStatus::Canceled).await.unwrap();
    assert_eq!(canceled.status, RequestStatus::Canceled);
    assert_eq!(canceled.physical_copy_id, None);
    assert_eq!(h.copy_status(other.id).await, PhysicalCopyStatus::AtLibrary);

    // No longer active, so the user may ask again
    assert!(h.request(1, "111", 1, RequestStatus::Waiting).await.is_ok());
}

#[tokio::test]
async fn test_accept_after_copy_borrowed_fails() {
    let h = harness();
    let copy = h.copy("333", 1).await;
    let transfer = h
        .services
        .transfers
        .create(CreateTransfer {
            physical_copy_id: copy.id,
            source_library_id: 1,
            destination_library_id: 2,
        })
        .await
        .unwrap();
    h.request(1, "333", 1, RequestStatus::Requested).await.unwrap();

    let result = h.services.transfers.accept(transfer.id).await;
    assert!(matches!(result, Err(AppError::InvalidCopyState { copy_id, .. }) if copy_id == copy.id));

    let still_pending = h.services.transfers.get(transfer.id).await.unwrap();
    assert_eq!(still_pending.status, TransferStatus::Pending);
    assert_eq!(h.copy_status(copy.id).await, PhysicalCopyStatus::Requested);
}

#[tokio::test]
async fn test_named_copy_only_for_pending_creation() {
    let h = harness();
    let copy = h.copy("111", 1).await;

    for status in [RequestStatus::Requested, RequestStatus::Waiting] {
        let result = h
            .services
            .requests
            .create(CreateRequest {
                user_id: 1,
                isbn: "111".to_string(),
                library_id: 1,
                physical_copy_id: Some(copy.id),
                status,
                start_date: None,
                end_date: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
    assert_eq!(h.copy_status(copy.id).await, PhysicalCopyStatus::AtLibrary);
}
