//! In-memory backend
//!
//! A transaction holds the store lock for its whole lifetime and works on a
//! private copy of the state, written back on commit. Transactions are
//! therefore fully serialized.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    CopyStore, NotificationStore, PunishmentStore, RequestStore, Store, StoreTx, TransferStore,
};
use crate::{
    error::AppResult,
    models::{
        enums::{PhysicalCopyStatus, PunishmentLevel, RequestStatus, TransferStatus},
        notification::{NewNotification, Notification},
        physical_copy::{LibraryAvailability, PhysicalCopy},
        punishment::Punishment,
        request::{BorrowRequest, NewRequest},
        transfer::{NewTransfer, Transfer},
    },
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    copies: BTreeMap<i32, PhysicalCopy>,
    requests: BTreeMap<i32, BorrowRequest>,
    transfers: BTreeMap<i32, Transfer>,
    punishments: BTreeMap<i32, Punishment>,
    notifications: BTreeMap<i32, Notification>,
    copy_seq: i32,
    request_seq: i32,
    transfer_seq: i32,
    punishment_seq: i32,
    notification_seq: i32,
}

fn next_id(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

/// Store kept in process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>> {
        let guard = self.state.clone().lock_owned().await;
        let work = (*guard).clone();
        Ok(Box::new(MemoryTx { guard, work }))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Open in-memory transaction
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

impl MemoryTx {
    fn update_copy(
        &mut self,
        id: i32,
        change: impl FnOnce(&mut PhysicalCopy) -> bool,
    ) -> Option<PhysicalCopy> {
        let copy = self.work.copies.get_mut(&id)?;
        if change(copy) {
            Some(copy.clone())
        } else {
            None
        }
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn commit(&mut self) -> AppResult<()> {
        *self.guard = self.work.clone();
        Ok(())
    }
}

#[async_trait]
impl CopyStore for MemoryTx {
    async fn insert_copy(
        &mut self,
        isbn: &str,
        library_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<PhysicalCopy> {
        let copy = PhysicalCopy {
            id: next_id(&mut self.work.copy_seq),
            isbn: isbn.to_string(),
            library_id,
            status: PhysicalCopyStatus::AtLibrary,
            crea_date: now,
        };
        self.work.copies.insert(copy.id, copy.clone());
        Ok(copy)
    }

    async fn get_copy(&mut self, id: i32) -> AppResult<Option<PhysicalCopy>> {
        Ok(self.work.copies.get(&id).cloned())
    }

    async fn list_copies_by_library(&mut self, library_id: i32) -> AppResult<Vec<PhysicalCopy>> {
        let mut copies: Vec<PhysicalCopy> = self
            .work
            .copies
            .values()
            .filter(|c| c.library_id == library_id)
            .cloned()
            .collect();
        copies.sort_by(|a, b| a.isbn.cmp(&b.isbn).then(a.id.cmp(&b.id)));
        Ok(copies)
    }

    async fn find_available_copy(
        &mut self,
        isbn: &str,
        library_id: i32,
    ) -> AppResult<Option<PhysicalCopy>> {
        Ok(self
            .work
            .copies
            .values()
            .find(|c| {
                c.isbn == isbn
                    && c.library_id == library_id
                    && c.status == PhysicalCopyStatus::AtLibrary
            })
            .cloned())
    }

    async fn claim_available_copy(
        &mut self,
        isbn: &str,
        library_id: i32,
    ) -> AppResult<Option<PhysicalCopy>> {
        let Some(copy) = self.find_available_copy(isbn, library_id).await? else {
            return Ok(None);
        };
        Ok(self.update_copy(copy.id, |c| {
            c.status = PhysicalCopyStatus::Requested;
            true
        }))
    }

    async fn compare_and_set_copy_status(
        &mut self,
        id: i32,
        from: PhysicalCopyStatus,
        to: PhysicalCopyStatus,
    ) -> AppResult<Option<PhysicalCopy>> {
        Ok(self.update_copy(id, |c| {
            if c.status != from {
                return false;
            }
            c.status = to;
            true
        }))
    }

    async fn set_copy_status(
        &mut self,
        id: i32,
        status: PhysicalCopyStatus,
    ) -> AppResult<Option<PhysicalCopy>> {
        Ok(self.update_copy(id, |c| {
            c.status = status;
            true
        }))
    }

    async fn set_copy_location(
        &mut self,
        id: i32,
        library_id: i32,
        status: PhysicalCopyStatus,
    ) -> AppResult<Option<PhysicalCopy>> {
        Ok(self.update_copy(id, |c| {
            c.library_id = library_id;
            c.status = status;
            true
        }))
    }

    async fn count_available(&mut self, isbn: &str, library_id: i32) -> AppResult<i64> {
        Ok(self
            .work
            .copies
            .values()
            .filter(|c| {
                c.isbn == isbn
                    && c.library_id == library_id
                    && c.status == PhysicalCopyStatus::AtLibrary
            })
            .count() as i64)
    }

    async fn availability_by_library(&mut self, isbn: &str) -> AppResult<Vec<LibraryAvailability>> {
        let mut counts: BTreeMap<i32, i64> = BTreeMap::new();
        for copy in self.work.copies.values() {
            if copy.isbn == isbn && copy.status == PhysicalCopyStatus::AtLibrary {
                *counts.entry(copy.library_id).or_default() += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(library_id, available)| LibraryAvailability {
                library_id,
                available,
            })
            .collect())
    }

    async fn count_copy_references(&mut self, id: i32) -> AppResult<i64> {
        let requests = self
            .work
            .requests
            .values()
            .filter(|r| r.physical_copy_id == Some(id))
            .count();
        let transfers = self
            .work
            .transfers
            .values()
            .filter(|t| t.physical_copy_id == id)
            .count();
        Ok((requests + transfers) as i64)
    }

    async fn delete_copy(&mut self, id: i32) -> AppResult<bool> {
        Ok(self.work.copies.remove(&id).is_some())
    }
}

#[async_trait]
impl RequestStore for MemoryTx {
    async fn lock_user_requests(&mut self, _user_id: i32) -> AppResult<()> {
        // The transaction already holds the store lock
        Ok(())
    }

    async fn insert_request(&mut self, request: &NewRequest) -> AppResult<BorrowRequest> {
        let row = BorrowRequest {
            id: next_id(&mut self.work.request_seq),
            user_id: request.user_id,
            isbn: request.isbn.clone(),
            library_id: request.library_id,
            physical_copy_id: request.physical_copy_id,
            start_date: request.start_date,
            end_date: request.end_date,
            status: request.status,
        };
        self.work.requests.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_request(&mut self, id: i32) -> AppResult<Option<BorrowRequest>> {
        Ok(self.work.requests.get(&id).cloned())
    }

    async fn update_request(&mut self, request: &BorrowRequest) -> AppResult<()> {
        if let Some(row) = self.work.requests.get_mut(&request.id) {
            row.status = request.status;
            row.physical_copy_id = request.physical_copy_id;
            row.end_date = request.end_date;
        }
        Ok(())
    }

    async fn delete_request(&mut self, id: i32) -> AppResult<bool> {
        Ok(self.work.requests.remove(&id).is_some())
    }

    async fn count_active_requests(&mut self, user_id: i32) -> AppResult<i64> {
        Ok(self
            .work
            .requests
            .values()
            .filter(|r| r.user_id == user_id && !r.status.is_terminal())
            .count() as i64)
    }

    async fn has_active_request(&mut self, user_id: i32, isbn: &str) -> AppResult<bool> {
        Ok(self
            .work
            .requests
            .values()
            .any(|r| r.user_id == user_id && r.isbn == isbn && !r.status.is_terminal()))
    }

    async fn list_requests_by_user(&mut self, user_id: i32) -> AppResult<Vec<BorrowRequest>> {
        let mut rows: Vec<BorrowRequest> = self
            .work
            .requests
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn list_waiting(&mut self, isbn: &str, library_id: i32) -> AppResult<Vec<BorrowRequest>> {
        let mut rows: Vec<BorrowRequest> = self
            .work
            .requests
            .values()
            .filter(|r| {
                r.isbn == isbn && r.library_id == library_id && r.status == RequestStatus::Waiting
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        Ok(rows)
    }
}

#[async_trait]
impl TransferStore for MemoryTx {
    async fn insert_transfer(&mut self, transfer: &NewTransfer) -> AppResult<Transfer> {
        let row = Transfer {
            id: next_id(&mut self.work.transfer_seq),
            physical_copy_id: transfer.physical_copy_id,
            source_library_id: transfer.source_library_id,
            destination_library_id: transfer.destination_library_id,
            start_date: transfer.start_date,
            end_date: None,
            status: TransferStatus::Pending,
        };
        self.work.transfers.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_transfer(&mut self, id: i32) -> AppResult<Option<Transfer>> {
        Ok(self.work.transfers.get(&id).cloned())
    }

    async fn update_transfer(&mut self, transfer: &Transfer) -> AppResult<()> {
        if let Some(row) = self.work.transfers.get_mut(&transfer.id) {
            row.status = transfer.status;
            row.end_date = transfer.end_date;
        }
        Ok(())
    }

    async fn delete_transfer(&mut self, id: i32) -> AppResult<bool> {
        Ok(self.work.transfers.remove(&id).is_some())
    }

    async fn list_transfers_by_library(&mut self, library_id: i32) -> AppResult<Vec<Transfer>> {
        let mut rows: Vec<Transfer> = self
            .work
            .transfers
            .values()
            .filter(|t| t.source_library_id == library_id || t.destination_library_id == library_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn has_accepted_transfer_to(&mut self, copy_id: i32, library_id: i32) -> AppResult<bool> {
        Ok(self.work.transfers.values().any(|t| {
            t.physical_copy_id == copy_id
                && t.destination_library_id == library_id
                && t.status == TransferStatus::Accepted
        }))
    }
}

#[async_trait]
impl PunishmentStore for MemoryTx {
    async fn insert_punishment(
        &mut self,
        request_id: i32,
        reason: &str,
        level: PunishmentLevel,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Punishment>> {
        if self.get_punishment_by_request(request_id).await?.is_some() {
            return Ok(None);
        }
        let row = Punishment {
            id: next_id(&mut self.work.punishment_seq),
            request_id,
            reason: reason.to_string(),
            level,
            emitted_date: now,
        };
        self.work.punishments.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn get_punishment(&mut self, id: i32) -> AppResult<Option<Punishment>> {
        Ok(self.work.punishments.get(&id).cloned())
    }

    async fn get_punishment_by_request(&mut self, request_id: i32) -> AppResult<Option<Punishment>> {
        Ok(self
            .work
            .punishments
            .values()
            .find(|p| p.request_id == request_id)
            .cloned())
    }

    async fn update_punishment_level(
        &mut self,
        id: i32,
        level: PunishmentLevel,
    ) -> AppResult<Option<Punishment>> {
        Ok(self.work.punishments.get_mut(&id).map(|p| {
            p.level = level;
            p.clone()
        }))
    }

    async fn delete_punishment_by_request(&mut self, request_id: i32) -> AppResult<u64> {
        let before = self.work.punishments.len();
        self.work.punishments.retain(|_, p| p.request_id != request_id);
        Ok((before - self.work.punishments.len()) as u64)
    }

    async fn list_punishments_by_user(&mut self, user_id: i32) -> AppResult<Vec<Punishment>> {
        let requests = &self.work.requests;
        let mut rows: Vec<Punishment> = self
            .work
            .punishments
            .values()
            .filter(|p| {
                requests
                    .get(&p.request_id)
                    .map_or(false, |r| r.user_id == user_id)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.emitted_date.cmp(&a.emitted_date));
        Ok(rows)
    }
}

#[async_trait]
impl NotificationStore for MemoryTx {
    async fn insert_notification(&mut self, notification: &NewNotification) -> AppResult<Notification> {
        let row = Notification {
            id: next_id(&mut self.work.notification_seq),
            title: notification.title.clone(),
            description: notification.description.clone(),
            emitted_date: notification.emitted_date,
            end_date: notification.end_date,
            for_all: notification.for_all,
            user_id: notification.user_id,
            request_id: notification.request_id,
            library_id: notification.library_id,
        };
        self.work.notifications.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete_notification(&mut self, id: i32) -> AppResult<bool> {
        Ok(self.work.notifications.remove(&id).is_some())
    }

    async fn delete_notifications_by_request(&mut self, request_id: i32) -> AppResult<u64> {
        let before = self.work.notifications.len();
        self.work
            .notifications
            .retain(|_, n| n.request_id != Some(request_id));
        Ok((before - self.work.notifications.len()) as u64)
    }

    async fn list_active_for_user(
        &mut self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Notification>> {
        let mut rows: Vec<Notification> = self
            .work
            .notifications
            .values()
            .filter(|n| (n.user_id == Some(user_id) || n.for_all) && n.is_active_at(now))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.emitted_date.cmp(&a.emitted_date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn list_active_for_library(
        &mut self,
        library_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Notification>> {
        let mut rows: Vec<Notification> = self
            .work
            .notifications
            .values()
            .filter(|n| n.library_id == Some(library_id) && n.is_active_at(now))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.emitted_date.cmp(&a.emitted_date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}
